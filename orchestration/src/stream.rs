//! Streaming delivery — per-turn event frames over a channel.
//!
//! Wraps one round of scheduler-driven generation as a stream of discrete
//! frames instead of a buffered batch. Frames are emitted the instant each
//! turn completes; the consumer cancels cooperatively via the handle's
//! token, which is checked between generations — an in-flight call is
//! allowed to finish and commit, but no further turns are taken.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
pub use tokio_util::sync::CancellationToken;

use crate::session::SessionId;

/// Channel capacity for one streamed round.
pub(crate) const FRAME_CAPACITY: usize = 64;

/// Event frames emitted during a streamed round.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DebateEvent {
    /// The round began.
    Started {
        round: u32,
        timestamp: DateTime<Utc>,
    },

    /// One participant finished a turn.
    Message {
        agent: String,
        text: String,
        round: u32,
        timestamp: DateTime<Utc>,
    },

    /// The round finished with every scheduled turn taken.
    Completed {
        round: u32,
        timestamp: DateTime<Utc>,
    },

    /// The round aborted; committed messages are preserved.
    Error {
        reason: String,
        timestamp: DateTime<Utc>,
    },
}

impl DebateEvent {
    pub fn started(round: u32) -> Self {
        Self::Started {
            round,
            timestamp: Utc::now(),
        }
    }

    pub fn message(agent: &str, text: &str, round: u32, timestamp: DateTime<Utc>) -> Self {
        Self::Message {
            agent: agent.to_string(),
            text: text.to_string(),
            round,
            timestamp,
        }
    }

    pub fn completed(round: u32) -> Self {
        Self::Completed {
            round,
            timestamp: Utc::now(),
        }
    }

    pub fn error(reason: &str) -> Self {
        Self::Error {
            reason: reason.to_string(),
            timestamp: Utc::now(),
        }
    }

    /// Frame kind as its wire tag.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Started { .. } => "started",
            Self::Message { .. } => "message",
            Self::Completed { .. } => "completed",
            Self::Error { .. } => "error",
        }
    }

    /// Encode as one Server-Sent-Events frame: `data: <json>\n\n`.
    pub fn sse_frame(&self) -> String {
        let json = serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string());
        format!("data: {}\n\n", json)
    }
}

/// Consumer side of one streamed round.
pub struct StreamHandle {
    pub session_id: SessionId,
    receiver: mpsc::Receiver<DebateEvent>,
    cancel: CancellationToken,
}

impl StreamHandle {
    pub(crate) fn new(
        session_id: SessionId,
        receiver: mpsc::Receiver<DebateEvent>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            session_id,
            receiver,
            cancel,
        }
    }

    /// Receive the next frame; `None` when the round's producer is done.
    pub async fn next_event(&mut self) -> Option<DebateEvent> {
        self.receiver.recv().await
    }

    /// Request cooperative cancellation. Advisory: the turn in flight still
    /// commits, later turns do not run.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// A clone of the cancellation token, for consumers that select on it.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Adapt the handle into a `futures::Stream` of frames, for transport
    /// layers that pipe frames straight into an SSE response body.
    pub fn into_stream(self) -> impl futures::Stream<Item = DebateEvent> {
        futures::stream::unfold(self.receiver, |mut rx| async move {
            rx.recv().await.map(|event| (event, rx))
        })
    }
}
