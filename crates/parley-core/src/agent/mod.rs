//! Agent service client port.
//!
//! Defines the interface the orchestrator uses to reach the remote
//! conversational service. The HTTP implementation lives in parley-infra.

use std::pin::Pin;

use futures_util::Stream;

use parley_types::chat::{AgentError, StreamEvent};

/// A lazy, finite, non-restartable stream of reply events.
pub type ReplyStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, AgentError>> + Send + 'static>>;

/// Trait for the remote agent service.
///
/// `stream_reply` submits one user message and returns the streamed
/// reply: `Connected` once the body is readable, `Fragment`s in arrival
/// order, then `Done`. Errors surface as stream items, one attempt per
/// request.
pub trait AgentClient: Send + Sync {
    fn stream_reply(&self, message: &str) -> ReplyStream;
}
