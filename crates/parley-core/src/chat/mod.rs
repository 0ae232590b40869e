pub mod orchestrator;
pub mod transcript;

pub use orchestrator::{ChatOrchestrator, CycleState, SubmitOutcome, FALLBACK_REPLY};
pub use transcript::{TranscriptStore, HISTORY_CAP};
