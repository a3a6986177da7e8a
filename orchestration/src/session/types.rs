//! Session and message-log types.
//!
//! The log is append-only; round numbers and intra-round positions are
//! never stored on entries — they are derived by the segmenter from the
//! full log prefix so that re-segmentation across resumptions always
//! agrees with earlier results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::generate::HistoryEntry;
use crate::roster::{Role, Roster};
use crate::schedule::TurnScheduler;

/// Opaque session identifier (uuid v4).
pub type SessionId = String;

/// Lifecycle status of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Resumable; no operation in flight.
    Active,
    /// A streaming round is in progress.
    Streaming,
    /// Archived; the id is no longer valid.
    Finalized,
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Streaming => write!(f, "streaming"),
            Self::Finalized => write!(f, "finalized"),
        }
    }
}

/// One committed log entry. Immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Utterance {
    /// 0-based log-order index; strictly increasing and gapless.
    pub index: usize,
    /// Speaker name as it appears in the roster.
    pub speaker: String,
    /// Speaker role at append time.
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// One stateful, resumable debate.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    pub topic: String,
    pub roster: Roster,
    pub log: Vec<Utterance>,
    pub scheduler: TurnScheduler,
    /// Log length at the last batch delivery; resumes return the delta.
    pub delivered: usize,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(topic: &str, roster: Roster) -> Self {
        let scheduler = TurnScheduler::new(roster.len());
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            topic: topic.to_string(),
            roster,
            log: Vec::new(),
            scheduler,
            delivered: 0,
            status: SessionStatus::Active,
            created_at: Utc::now(),
        }
    }

    /// Append a fully produced utterance to the log.
    pub fn append(&mut self, speaker: &str, role: Role, text: String) -> &Utterance {
        let entry = Utterance {
            index: self.log.len(),
            speaker: speaker.to_string(),
            role,
            text,
            timestamp: Utc::now(),
        };
        self.log.push(entry);
        self.log.last().expect("just pushed")
    }

    /// Conversation history handed to the generation service. Includes
    /// moderator cues — they are context for the participants even though
    /// the transcript excludes them.
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.log
            .iter()
            .map(|u| HistoryEntry {
                speaker: u.speaker.clone(),
                role: u.role,
                text: u.text.clone(),
            })
            .collect()
    }

    /// Rounds fully completed so far (a round closes with the judge).
    pub fn rounds_completed(&self) -> u32 {
        self.log.iter().filter(|u| u.role == Role::Judge).count() as u32
    }

    /// Round number the next utterance will belong to.
    pub fn current_round(&self) -> u32 {
        self.rounds_completed() + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::Participant;

    fn roster() -> Roster {
        Roster::new(vec![
            Participant::new("Moderator", Role::Moderator, ""),
            Participant::new("Debater_A", Role::Debater, "for"),
            Participant::new("Debater_B", Role::Debater, "against"),
            Participant::new("Judge", Role::Judge, "judge"),
        ])
        .unwrap()
    }

    #[test]
    fn test_new_session() {
        let session = Session::new("AI is good", roster());
        assert_eq!(session.status, SessionStatus::Active);
        assert!(session.log.is_empty());
        assert_eq!(session.delivered, 0);
        assert_eq!(session.current_round(), 1);
        // uuid v4 string form
        assert_eq!(session.id.len(), 36);
    }

    #[test]
    fn test_append_assigns_gapless_indices() {
        let mut session = Session::new("topic", roster());
        session.append("Debater_A", Role::Debater, "first".into());
        session.append("Debater_B", Role::Debater, "second".into());

        assert_eq!(session.log[0].index, 0);
        assert_eq!(session.log[1].index, 1);
    }

    #[test]
    fn test_round_advances_after_judge() {
        let mut session = Session::new("topic", roster());
        assert_eq!(session.current_round(), 1);

        session.append("Debater_A", Role::Debater, "arg".into());
        assert_eq!(session.current_round(), 1);

        session.append("Judge", Role::Judge, "Round Winner: Debater_A".into());
        assert_eq!(session.rounds_completed(), 1);
        assert_eq!(session.current_round(), 2);
    }

    #[test]
    fn test_history_includes_moderator_cues() {
        let mut session = Session::new("topic", roster());
        session.append("Moderator", Role::Moderator, "Debate Topic: topic".into());
        session.append("Debater_A", Role::Debater, "arg".into());

        let history = session.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, Role::Moderator);
    }

    #[test]
    fn test_session_ids_unique() {
        let a = Session::new("t", roster());
        let b = Session::new("t", roster());
        assert_ne!(a.id, b.id);
    }
}
