//! Debate Session Orchestration Library
//!
//! This library coordinates turn-based conversations among a fixed roster of
//! automated participants (debaters, a judge, an optional moderator) and
//! produces structured, resumable transcripts with per-round outcomes.
//!
//! # Components
//!
//! - [`roster`]: typed participant roles and session-start validation
//! - [`schedule`]: deterministic round-robin turn scheduling with a budget
//! - [`session`]: the append-only message log and the in-memory store
//! - [`transcript`]: pure round segmentation over the log
//! - [`tally`]: strict verdict extraction and overall winner computation
//! - [`stream`]: per-turn event frames with cooperative cancellation
//! - [`engine`]: the round driver over an injected generation service
//! - [`archive`]: one-shot archival of finished sessions to JSON
//! - [`service`]: the lifecycle facade (start / continue / stream / save)
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use orchestration::{DebateService, Participant, Role};
//! # use orchestration::{Generator, GenerationError, HistoryEntry};
//! # struct MyGenerator;
//! # #[async_trait::async_trait]
//! # impl Generator for MyGenerator {
//! #     async fn generate(&self, _: &str, _: &[HistoryEntry]) -> Result<String, GenerationError> {
//! #         Ok(String::new())
//! #     }
//! # }
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let service = DebateService::new(Arc::new(MyGenerator));
//! let update = service
//!     .start(
//!         "AI will benefit society more than it will harm it.",
//!         vec![
//!             Participant::new("Moderator", Role::Moderator, ""),
//!             Participant::new("Debater_A", Role::Debater, "Argue for the proposition."),
//!             Participant::new("Debater_B", Role::Debater, "Argue against the proposition."),
//!             Participant::new("Judge", Role::Judge, "Declare each round's winner."),
//!         ],
//!     )
//!     .await?;
//!
//! let next = service.resume(&update.session_id).await?;
//! service.save(&update.session_id, serde_json::Value::Null).await?;
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod engine;
pub mod generate;
pub mod roster;
pub mod schedule;
pub mod session;
pub mod stream;
pub mod tally;
pub mod transcript;

pub mod service;

// Re-export the lifecycle surface
pub use service::{DebateService, OrchestratorError, SavedDebate, SessionUpdate};

// Re-export key roster types
pub use roster::{Participant, Role, Roster, RosterError};

// Re-export session types
pub use session::{Session, SessionId, SessionStatus, SessionStore, Utterance};

// Re-export collaborator seams
pub use generate::{AnalysisEngine, AnalysisError, GenerationError, Generator, HistoryEntry};

// Re-export transcript and tally types
pub use tally::{OverallResult, TallyWarning, VerdictTally};
pub use transcript::ChatMessage;

// Re-export streaming types
pub use stream::{CancellationToken, DebateEvent, StreamHandle};

// Re-export archival types
pub use archive::{ArchiveError, ArchiveMetadata, ArchiveRecord, Archiver, ParticipantSnapshot};
