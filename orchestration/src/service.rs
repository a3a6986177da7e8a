//! Session lifecycle facade — the surface exposed to the transport layer.
//!
//! One `DebateService` owns the session store, the injected generation and
//! analysis collaborators, and the archiver. Every operation resolves its
//! session through the store (never a cached copy), takes the session's
//! lock for the duration of the round, and leaves the store as the single
//! source of truth for session existence.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::archive::{ArchiveError, ArchiveRecord, Archiver};
use crate::engine::{self, EngineError};
use crate::generate::{AnalysisEngine, AnalysisError, GenerationError, Generator};
use crate::roster::{Participant, Roster, RosterError};
use crate::session::{SessionId, SessionStatus, SessionStore, StoreError};
use crate::stream::{DebateEvent, StreamHandle, FRAME_CAPACITY};
use crate::tally::{self, VerdictTally};
use crate::transcript::{self, ChatMessage};

/// Error taxonomy for orchestrator operations.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Unknown session id on continue/stream/save. No state was mutated.
    #[error("session not found")]
    NotFound,

    /// Malformed participant configuration at start. No state was mutated.
    #[error("invalid roster: {0}")]
    InvalidRoster(#[from] RosterError),

    /// A generation call failed mid-turn; committed messages are preserved
    /// and another continue/stream resumes where the log left off.
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// The archive file could not be written; the session stays live so
    /// save can be retried.
    #[error(transparent)]
    ArchiveWrite(#[from] ArchiveError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<EngineError> for OrchestratorError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::Generation(g) => Self::Generation(g),
        }
    }
}

impl From<StoreError> for OrchestratorError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(_) => Self::NotFound,
            StoreError::LockPoisoned => Self::Internal("session store lock poisoned".into()),
        }
    }
}

/// Reply to start/continue: the session id and the newly segmented
/// messages since the caller's last delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionUpdate {
    pub session_id: SessionId,
    pub messages: Vec<ChatMessage>,
}

/// Result of a successful save.
#[derive(Debug)]
pub struct SavedDebate {
    pub path: PathBuf,
    pub record: ArchiveRecord,
}

/// The debate session orchestrator.
pub struct DebateService {
    store: Arc<SessionStore>,
    generator: Arc<dyn Generator>,
    analysis: Option<Arc<dyn AnalysisEngine>>,
    archiver: Archiver,
}

impl DebateService {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self {
            store: Arc::new(SessionStore::new()),
            generator,
            analysis: None,
            archiver: Archiver::default(),
        }
    }

    /// Attach the downstream analysis collaborator.
    pub fn with_analysis(mut self, analysis: Arc<dyn AnalysisEngine>) -> Self {
        self.analysis = Some(analysis);
        self
    }

    /// Override the archive location (tests, deployments).
    pub fn with_archiver(mut self, archiver: Archiver) -> Self {
        self.archiver = archiver;
        self
    }

    /// The session store (exposed for transport-layer introspection).
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Start a new session and run its first round, blocking until the
    /// round completes. Returns the id and the round's segmented messages.
    pub async fn start(
        &self,
        topic: &str,
        participants: Vec<Participant>,
    ) -> Result<SessionUpdate, OrchestratorError> {
        let roster = Roster::new(participants)?;
        let id = self.store.create(topic, roster)?;
        info!(session_id = %id, topic, "session started");

        self.resume(&id).await
    }

    /// Create a session without generating anything. The first `stream`
    /// call produces round 1.
    pub fn start_streaming(
        &self,
        topic: &str,
        participants: Vec<Participant>,
    ) -> Result<SessionId, OrchestratorError> {
        let roster = Roster::new(participants)?;
        let id = self.store.create(topic, roster)?;
        info!(session_id = %id, topic, "streaming session created");
        Ok(id)
    }

    /// Run one more round on an existing session, blocking until it
    /// completes, and return only the messages the caller has not seen.
    pub async fn resume(&self, id: &str) -> Result<SessionUpdate, OrchestratorError> {
        let shared = self.store.get(id)?;
        let mut session = shared.lock().await;

        engine::extend_for_round(&mut session);
        engine::run_round(&mut session, self.generator.as_ref()).await?;

        let messages = transcript::segment(&session.log, session.delivered);
        session.delivered = session.log.len();

        Ok(SessionUpdate {
            session_id: session.id.clone(),
            messages,
        })
    }

    /// Run one more round, delivering each message as an event frame the
    /// moment it is produced. The returned handle carries the frames and
    /// the cooperative cancellation token.
    pub fn stream(&self, id: &str) -> Result<StreamHandle, OrchestratorError> {
        let shared = self.store.get(id)?;
        let (tx, rx) = mpsc::channel::<DebateEvent>(FRAME_CAPACITY);
        let cancel = CancellationToken::new();

        let generator = Arc::clone(&self.generator);
        let token = cancel.clone();
        let session_id = id.to_string();
        tokio::spawn(async move {
            let mut session = shared.lock().await;
            session.status = SessionStatus::Streaming;

            engine::extend_for_round(&mut session);
            let result =
                engine::stream_round(&mut session, generator.as_ref(), tx, token).await;
            session.status = SessionStatus::Active;

            match result {
                Ok(outcome) => {
                    info!(session_id = %session.id, ?outcome, "stream finished")
                }
                Err(e) => warn!(session_id = %session.id, error = %e, "stream failed"),
            }
        });

        Ok(StreamHandle::new(session_id, rx, cancel))
    }

    /// The full segmented transcript of a live session.
    pub async fn transcript(&self, id: &str) -> Result<Vec<ChatMessage>, OrchestratorError> {
        let shared = self.store.get(id)?;
        let session = shared.lock().await;
        Ok(transcript::segment_all(&session.log))
    }

    /// Recompute the verdict tally for a live session.
    pub async fn tally(&self, id: &str) -> Result<VerdictTally, OrchestratorError> {
        let shared = self.store.get(id)?;
        let session = shared.lock().await;
        let messages = transcript::segment_all(&session.log);
        Ok(tally::tally(&messages, &session.roster))
    }

    /// Pass a flat message list through to the analysis engine.
    pub async fn analyze(
        &self,
        messages: &[ChatMessage],
    ) -> Result<serde_json::Value, OrchestratorError> {
        let engine = self.analysis.as_ref().ok_or(AnalysisError::Unavailable)?;
        Ok(engine.analyze(messages).await?)
    }

    /// Finalize a session: archive it with the supplied analysis payload
    /// and evict it from the store. Strictly one-shot — a second save on
    /// the same id fails with `NotFound`.
    pub async fn save(
        &self,
        id: &str,
        analysis: serde_json::Value,
    ) -> Result<SavedDebate, OrchestratorError> {
        let shared = self.store.get(id)?;
        let mut session = shared.lock().await;

        let record = ArchiveRecord::build(&session, analysis);
        let path = self.archiver.write(&record)?;

        session.status = SessionStatus::Finalized;
        drop(session);
        self.store.remove(id)?;
        info!(session_id = %id, path = %path.display(), "session finalized");

        Ok(SavedDebate { path, record })
    }
}
