//! Round segmenter — derives round numbers from the raw log.
//!
//! Segmentation is a pure function of the log prefix: it always walks the
//! full history from index 0 to track round progression, then emits only the
//! entries at or past the caller's start offset. That is what keeps round
//! numbers globally consistent when a session is resumed by a caller who
//! only wants the delta.
//!
//! Moderator utterances are sentinels: turn-management cues that consumed a
//! scheduler turn but never appear in the transcript and never advance the
//! intra-round position.

use serde::{Deserialize, Serialize};

use crate::roster::Role;
use crate::session::Utterance;

/// A caller-facing transcript entry with derived round bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// 1-based round number.
    pub round: u32,
    /// Speaker name.
    pub agent: String,
    /// Speaker role.
    pub role: Role,
    pub text: String,
    /// 0-based position among the round's non-sentinel messages.
    pub position: u32,
}

/// Segment the full log, emitting entries with `index >= start_index`.
///
/// The round counter starts at 1 and increments immediately after each
/// judge entry, so the judge's verdict closes its own round and the next
/// message opens a new one.
pub fn segment(log: &[Utterance], start_index: usize) -> Vec<ChatMessage> {
    let mut out = Vec::new();
    let mut current_round: u32 = 1;
    let mut position: u32 = 0;

    for entry in log {
        if entry.role == Role::Moderator {
            continue;
        }

        if entry.index >= start_index {
            out.push(ChatMessage {
                round: current_round,
                agent: entry.speaker.clone(),
                role: entry.role,
                text: entry.text.clone(),
                position,
            });
        }

        position += 1;
        if entry.role == Role::Judge {
            current_round += 1;
            position = 0;
        }
    }

    out
}

/// Segment the entire log.
pub fn segment_all(log: &[Utterance]) -> Vec<ChatMessage> {
    segment(log, 0)
}
