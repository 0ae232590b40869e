//! Infrastructure implementations for Parley: SQLite-backed history
//! storage, the streaming HTTP agent client, and configuration loading.

pub mod agent;
pub mod config;
pub mod sqlite;
