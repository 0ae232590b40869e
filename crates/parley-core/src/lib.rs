//! Core conversation logic for Parley.
//!
//! This crate defines the "ports" (the history storage and agent client
//! traits) that the infrastructure layer implements. It depends only on
//! `parley-types` -- never on a database or HTTP crate.

pub mod agent;
pub mod chat;
pub mod storage;
