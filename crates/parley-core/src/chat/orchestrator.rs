//! Single-flight request orchestration.
//!
//! Drives one send/stream cycle at a time: the user message is appended
//! and persisted, the agent's reply is streamed into the transcript, and
//! any failure degrades to a canned apology so the conversation can
//! continue.

use std::sync::atomic::{AtomicU8, Ordering};

use futures_util::StreamExt;
use tokio::sync::Mutex;
use tracing::warn;

use parley_types::chat::{Message, StreamEvent};

use crate::agent::AgentClient;
use crate::chat::transcript::TranscriptStore;
use crate::storage::HistoryStore;

/// Assistant message appended when a cycle fails at any point.
pub const FALLBACK_REPLY: &str = "Sorry, something went wrong. Please try again.";

const STATE_IDLE: u8 = 0;
const STATE_SENDING: u8 = 1;
const STATE_STREAMING: u8 = 2;

/// Where the orchestrator is in the current cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Idle,
    Sending,
    Streaming,
}

impl CycleState {
    fn from_raw(raw: u8) -> Self {
        match raw {
            STATE_SENDING => Self::Sending,
            STATE_STREAMING => Self::Streaming,
            _ => Self::Idle,
        }
    }
}

/// Result of a [`ChatOrchestrator::submit`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Input was blank after trimming; nothing happened.
    Ignored,
    /// A cycle was already in flight; the input was rejected.
    Busy,
    /// The agent's reply was streamed into the transcript.
    Replied,
    /// The cycle failed and the fallback reply was recorded instead.
    Failed,
}

/// Coordinates transcript updates with the remote agent.
///
/// All methods take `&self` so the orchestrator can be shared behind an
/// `Arc`. The atomic state gate guarantees only one cycle runs at a
/// time; the transcript mutex serializes access between a running cycle
/// and readers.
pub struct ChatOrchestrator<C, H> {
    client: C,
    transcript: Mutex<TranscriptStore<H>>,
    state: AtomicU8,
}

impl<C: AgentClient, H: HistoryStore> ChatOrchestrator<C, H> {
    pub fn new(client: C, transcript: TranscriptStore<H>) -> Self {
        Self {
            client,
            transcript: Mutex::new(transcript),
            state: AtomicU8::new(STATE_IDLE),
        }
    }

    pub fn state(&self) -> CycleState {
        CycleState::from_raw(self.state.load(Ordering::Acquire))
    }

    /// Snapshot of the current transcript.
    pub async fn messages(&self) -> Vec<Message> {
        self.transcript.lock().await.messages().to_vec()
    }

    /// Drop the transcript and its cached copy.
    pub async fn clear(&self) -> Result<(), parley_types::error::HistoryError> {
        self.transcript.lock().await.clear().await
    }

    /// Run one full send/stream cycle.
    ///
    /// `on_event` is invoked for `Connected` and each `Fragment` as they
    /// arrive, so callers can render the reply incrementally. Failures
    /// never surface as errors: the transcript gets [`FALLBACK_REPLY`]
    /// and the outcome is [`SubmitOutcome::Failed`].
    pub async fn submit(
        &self,
        input: &str,
        mut on_event: impl FnMut(&StreamEvent),
    ) -> SubmitOutcome {
        let text = input.trim();
        if text.is_empty() {
            return SubmitOutcome::Ignored;
        }

        if self
            .state
            .compare_exchange(
                STATE_IDLE,
                STATE_SENDING,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_err()
        {
            return SubmitOutcome::Busy;
        }

        {
            let mut transcript = self.transcript.lock().await;
            transcript.push_user(text);
            if let Err(err) = transcript.persist().await {
                warn!("failed to persist chat history: {err}");
            }
        }

        let mut stream = self.client.stream_reply(text);
        let mut failed = false;

        while let Some(event) = stream.next().await {
            match event {
                Ok(StreamEvent::Connected) => {
                    self.state.store(STATE_STREAMING, Ordering::Release);
                    self.transcript.lock().await.begin_assistant_turn();
                    on_event(&StreamEvent::Connected);
                }
                Ok(StreamEvent::Fragment { text }) => {
                    self.transcript.lock().await.append_to_active(&text);
                    on_event(&StreamEvent::Fragment { text });
                }
                Ok(StreamEvent::Done) => break,
                Err(err) => {
                    warn!("agent request failed: {err}");
                    failed = true;
                    break;
                }
            }
        }

        {
            let mut transcript = self.transcript.lock().await;
            transcript.end_assistant_turn();
            if failed {
                transcript.push_assistant(FALLBACK_REPLY);
            }
            if let Err(err) = transcript.persist().await {
                warn!("failed to persist chat history: {err}");
            }
        }

        self.state.store(STATE_IDLE, Ordering::Release);
        if failed {
            SubmitOutcome::Failed
        } else {
            SubmitOutcome::Replied
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex as StdMutex};

    use parley_types::chat::{AgentError, MessageRole};
    use parley_types::error::HistoryError;
    use tokio::sync::oneshot;

    use crate::agent::ReplyStream;
    use crate::storage::HistoryStore;

    use super::*;

    #[derive(Clone, Default)]
    struct MemoryHistory {
        cell: Arc<StdMutex<Option<Vec<Message>>>>,
    }

    impl HistoryStore for MemoryHistory {
        async fn load(&self) -> Result<Option<Vec<Message>>, HistoryError> {
            Ok(self.cell.lock().unwrap().clone())
        }

        async fn save(&self, messages: &[Message]) -> Result<(), HistoryError> {
            *self.cell.lock().unwrap() = Some(messages.to_vec());
            Ok(())
        }

        async fn clear(&self) -> Result<(), HistoryError> {
            *self.cell.lock().unwrap() = None;
            Ok(())
        }
    }

    /// Plays back a scripted event sequence, once.
    struct ScriptClient {
        events: StdMutex<Option<Vec<Result<StreamEvent, AgentError>>>>,
    }

    impl ScriptClient {
        fn new(events: Vec<Result<StreamEvent, AgentError>>) -> Self {
            Self {
                events: StdMutex::new(Some(events)),
            }
        }
    }

    impl AgentClient for ScriptClient {
        fn stream_reply(&self, _message: &str) -> ReplyStream {
            let events = self
                .events
                .lock()
                .unwrap()
                .take()
                .expect("stream_reply called twice");
            Box::pin(futures_util::stream::iter(events))
        }
    }

    fn fragment(text: &str) -> Result<StreamEvent, AgentError> {
        Ok(StreamEvent::Fragment { text: text.into() })
    }

    fn orchestrator_with(
        events: Vec<Result<StreamEvent, AgentError>>,
    ) -> ChatOrchestrator<ScriptClient, MemoryHistory> {
        let transcript = TranscriptStore::new(MemoryHistory::default());
        ChatOrchestrator::new(ScriptClient::new(events), transcript)
    }

    #[tokio::test]
    async fn blank_input_is_ignored() {
        let orchestrator = orchestrator_with(vec![]);

        let outcome = orchestrator.submit("   \t  ", |_| {}).await;

        assert_eq!(outcome, SubmitOutcome::Ignored);
        assert!(orchestrator.messages().await.is_empty());
        assert_eq!(orchestrator.state(), CycleState::Idle);
    }

    #[tokio::test]
    async fn successful_cycle_records_user_and_streamed_reply() {
        let orchestrator = orchestrator_with(vec![
            Ok(StreamEvent::Connected),
            fragment("Your refund "),
            fragment("is on its way."),
            Ok(StreamEvent::Done),
        ]);
        let mut fragments = Vec::new();

        let outcome = orchestrator
            .submit("  where is my refund?  ", |event| {
                if let StreamEvent::Fragment { text } = event {
                    fragments.push(text.clone());
                }
            })
            .await;

        assert_eq!(outcome, SubmitOutcome::Replied);
        assert_eq!(fragments, vec!["Your refund ", "is on its way."]);

        let messages = orchestrator.messages().await;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, MessageRole::User);
        assert_eq!(messages[0].content, "where is my refund?");
        assert_eq!(messages[1].role, MessageRole::Assistant);
        assert_eq!(messages[1].content, "Your refund is on its way.");
        assert_eq!(orchestrator.state(), CycleState::Idle);
    }

    #[tokio::test]
    async fn empty_reply_leaves_empty_assistant_message() {
        let orchestrator =
            orchestrator_with(vec![Ok(StreamEvent::Connected), Ok(StreamEvent::Done)]);

        let outcome = orchestrator.submit("hello", |_| {}).await;

        assert_eq!(outcome, SubmitOutcome::Replied);
        let messages = orchestrator.messages().await;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].content, "");
    }

    #[tokio::test]
    async fn immediate_failure_records_fallback_reply() {
        let orchestrator = orchestrator_with(vec![Err(AgentError::Request(
            "connection refused".into(),
        ))]);

        let outcome = orchestrator.submit("hello", |_| {}).await;

        assert_eq!(outcome, SubmitOutcome::Failed);
        let messages = orchestrator.messages().await;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "hello");
        assert_eq!(messages[1].role, MessageRole::Assistant);
        assert_eq!(messages[1].content, FALLBACK_REPLY);
        assert_eq!(orchestrator.state(), CycleState::Idle);
    }

    #[tokio::test]
    async fn mid_stream_failure_keeps_partial_reply_and_appends_fallback() {
        let orchestrator = orchestrator_with(vec![
            Ok(StreamEvent::Connected),
            fragment("We have revi"),
            Err(AgentError::Stream("connection reset".into())),
        ]);

        let outcome = orchestrator.submit("refund status?", |_| {}).await;

        assert_eq!(outcome, SubmitOutcome::Failed);
        let messages = orchestrator.messages().await;
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].content, "We have revi");
        assert_eq!(messages[2].content, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn failed_cycle_is_persisted() {
        let history = MemoryHistory::default();
        let transcript = TranscriptStore::new(history.clone());
        let orchestrator = ChatOrchestrator::new(
            ScriptClient::new(vec![Err(AgentError::Request("boom".into()))]),
            transcript,
        );

        orchestrator.submit("hello", |_| {}).await;

        let saved = history.cell.lock().unwrap().clone().unwrap();
        assert_eq!(saved.len(), 2);
        assert_eq!(saved[1].content, FALLBACK_REPLY);
    }

    /// Blocks mid-stream until the test releases it, so a second submit
    /// can be attempted while the first is in flight.
    struct GatedClient {
        gate: StdMutex<Option<oneshot::Receiver<()>>>,
    }

    impl AgentClient for GatedClient {
        fn stream_reply(&self, _message: &str) -> ReplyStream {
            let gate = self
                .gate
                .lock()
                .unwrap()
                .take()
                .expect("stream_reply called twice");
            Box::pin(async_stream::stream! {
                yield Ok(StreamEvent::Connected);
                yield Ok(StreamEvent::Fragment { text: "partial".into() });
                let _ = gate.await;
                yield Ok(StreamEvent::Done);
            })
        }
    }

    #[tokio::test]
    async fn second_submit_is_rejected_while_a_cycle_is_in_flight() {
        let (release, gate) = oneshot::channel();
        let client = GatedClient {
            gate: StdMutex::new(Some(gate)),
        };
        let transcript = TranscriptStore::new(MemoryHistory::default());
        let orchestrator = Arc::new(ChatOrchestrator::new(client, transcript));

        let first = {
            let orchestrator = Arc::clone(&orchestrator);
            tokio::spawn(async move { orchestrator.submit("first", |_| {}).await })
        };

        // Wait for the first cycle to reach the streaming phase.
        for _ in 0..1000 {
            if orchestrator.state() == CycleState::Streaming {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(orchestrator.state(), CycleState::Streaming);

        let second = orchestrator.submit("second", |_| {}).await;
        assert_eq!(second, SubmitOutcome::Busy);

        release.send(()).unwrap();
        assert_eq!(first.await.unwrap(), SubmitOutcome::Replied);
        assert_eq!(orchestrator.state(), CycleState::Idle);

        // Only the first cycle's messages made it in.
        let messages = orchestrator.messages().await;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "first");
        assert_eq!(messages[1].content, "partial");
    }
}
