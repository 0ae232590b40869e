//! Durable transcript cache trait.
//!
//! Defines the interface for the key-value mirror of the conversation
//! transcript. Implementations live in parley-infra.

use parley_types::chat::Message;
use parley_types::error::HistoryError;

/// Trait for the durable transcript cache.
///
/// The cache holds a single value (the JSON array of recent messages)
/// under a fixed key owned by the implementation. Uses RPITIT (native
/// async fn in traits, Rust 2024 edition).
pub trait HistoryStore: Send + Sync {
    /// Read the cached transcript. Returns `None` when no value is stored.
    fn load(
        &self,
    ) -> impl std::future::Future<Output = Result<Option<Vec<Message>>, HistoryError>> + Send;

    /// Replace the cached transcript with the given messages (upsert).
    fn save(
        &self,
        messages: &[Message],
    ) -> impl std::future::Future<Output = Result<(), HistoryError>> + Send;

    /// Remove the cached transcript entirely. No-op if nothing is stored.
    fn clear(&self) -> impl std::future::Future<Output = Result<(), HistoryError>> + Send;
}
