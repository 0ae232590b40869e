//! Shared domain types for Parley.
//!
//! This crate holds the data shapes exchanged between the core logic,
//! the infrastructure adapters, and the CLI. It depends only on serde
//! and thiserror.

pub mod chat;
pub mod config;
pub mod error;
