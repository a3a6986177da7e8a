//! Session archiver — compiles a finished debate into one immutable record.
//!
//! The record is written once, as pretty JSON, to a filesystem-safe slug
//! derived from the topic. A write failure leaves the session in the store
//! so the save can be retried; eviction happens only after the file is on
//! disk (the service owns that ordering).

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::roster::Roster;
use crate::session::Session;
use crate::tally::{self, VerdictTally};
use crate::transcript::{self, ChatMessage};

/// Topic prefix length used for archive slugs.
const SLUG_TOPIC_CHARS: usize = 30;

/// Default directory for archive files.
pub const DEFAULT_ARCHIVE_DIR: &str = "saved_debates";

/// Error during archival.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("archive write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("archive serialization failed: {0}")]
    Serialize(String),
}

/// Summary metadata for an archived debate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveMetadata {
    pub topic: String,
    pub total_rounds: u32,
    /// Overall winner name, or `"Tie"`.
    pub winner: String,
    pub final_scores: BTreeMap<String, u32>,
}

/// Roster snapshot entry: who spoke and under which instructions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantSnapshot {
    pub name: String,
    pub persona: String,
}

/// The write-once archive document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveRecord {
    pub metadata: ArchiveMetadata,
    pub configuration: Vec<ParticipantSnapshot>,
    pub transcript: Vec<ChatMessage>,
    /// Externally supplied analysis payload, merged verbatim.
    pub analysis: serde_json::Value,
}

impl ArchiveRecord {
    /// Build a record from a session: recompute the transcript and tally,
    /// snapshot the roster, and attach the caller's analysis untouched.
    pub fn build(session: &Session, analysis: serde_json::Value) -> Self {
        let transcript = transcript::segment_all(&session.log);
        let tally = tally::tally(&transcript, &session.roster);

        Self {
            metadata: ArchiveMetadata {
                topic: session.topic.clone(),
                total_rounds: session.rounds_completed(),
                winner: tally.overall().to_string(),
                final_scores: tally.scores.clone(),
            },
            configuration: snapshot_roster(&session.roster),
            transcript,
            analysis,
        }
    }

    /// The recomputed tally for this record's transcript.
    pub fn tally(&self, roster: &Roster) -> VerdictTally {
        tally::tally(&self.transcript, roster)
    }
}

fn snapshot_roster(roster: &Roster) -> Vec<ParticipantSnapshot> {
    roster
        .iter()
        .map(|p| ParticipantSnapshot {
            name: p.name.clone(),
            persona: p.persona.clone(),
        })
        .collect()
}

/// Map a topic to its filesystem-safe slug: the first 30 characters with
/// every non-alphanumeric character replaced by `_`.
pub fn topic_slug(topic: &str) -> String {
    topic
        .chars()
        .take(SLUG_TOPIC_CHARS)
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Writes archive records under a base directory.
pub struct Archiver {
    base_dir: PathBuf,
}

impl Archiver {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Path a record for this topic would be written to.
    pub fn path_for(&self, topic: &str) -> PathBuf {
        self.base_dir.join(format!("{}.json", topic_slug(topic)))
    }

    /// Write the record, returning the file path.
    pub fn write(&self, record: &ArchiveRecord) -> Result<PathBuf, ArchiveError> {
        let path = self.path_for(&record.metadata.topic);
        let json = serde_json::to_string_pretty(record)
            .map_err(|e| ArchiveError::Serialize(e.to_string()))?;

        fs::create_dir_all(&self.base_dir)?;
        fs::write(&path, json)?;

        info!(
            path = %path.display(),
            rounds = record.metadata.total_rounds,
            winner = %record.metadata.winner,
            "debate archived"
        );
        Ok(path)
    }
}

impl Default for Archiver {
    fn default() -> Self {
        Self::new(DEFAULT_ARCHIVE_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::{Participant, Role};
    use serde_json::json;

    fn session_with_two_rounds() -> Session {
        let roster = Roster::new(vec![
            Participant::new("Moderator", Role::Moderator, ""),
            Participant::new("Debater_A", Role::Debater, "for"),
            Participant::new("Debater_B", Role::Debater, "against"),
            Participant::new("Judge", Role::Judge, "judge"),
        ])
        .unwrap();

        let mut session = Session::new("AI will benefit society", roster);
        session.append("Moderator", Role::Moderator, "Debate Topic: AI will benefit society".into());
        session.append("Debater_A", Role::Debater, "a1".into());
        session.append("Debater_B", Role::Debater, "b1".into());
        session.append("Judge", Role::Judge, "Round Winner: Debater_A".into());
        session.append("Moderator", Role::Moderator, "Proceed to the next round of arguments.".into());
        session.append("Debater_A", Role::Debater, "a2".into());
        session.append("Debater_B", Role::Debater, "b2".into());
        session.append("Judge", Role::Judge, "Round Winner: Debater_A".into());
        session
    }

    #[test]
    fn test_topic_slug_sanitization() {
        assert_eq!(topic_slug("Is AI good? Yes/no!"), "Is_AI_good__Yes_no_");
    }

    #[test]
    fn test_topic_slug_truncation() {
        let long = "a".repeat(40);
        assert_eq!(topic_slug(&long).len(), 30);
    }

    #[test]
    fn test_build_record() {
        let session = session_with_two_rounds();
        let record = ArchiveRecord::build(&session, json!({"keywords": ["ai"]}));

        assert_eq!(record.metadata.topic, "AI will benefit society");
        assert_eq!(record.metadata.total_rounds, 2);
        assert_eq!(record.metadata.winner, "Debater_A");
        assert_eq!(record.metadata.final_scores["Debater_A"], 2);
        assert_eq!(record.metadata.final_scores["Debater_B"], 0);
        assert_eq!(record.transcript.len(), 6);
        assert_eq!(record.configuration.len(), 4);
        assert_eq!(record.analysis["keywords"][0], "ai");
    }

    #[test]
    fn test_write_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let archiver = Archiver::new(dir.path());

        let session = session_with_two_rounds();
        let record = ArchiveRecord::build(&session, serde_json::Value::Null);
        let path = archiver.write(&record).unwrap();

        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "AI_will_benefit_society.json"
        );

        let raw = std::fs::read_to_string(&path).unwrap();
        let reloaded: ArchiveRecord = serde_json::from_str(&raw).unwrap();
        assert_eq!(reloaded.metadata.winner, "Debater_A");
        assert_eq!(reloaded.transcript.len(), 6);
    }

    #[test]
    fn test_write_failure_surfaces_io_error() {
        // Base dir path collides with an existing file.
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        std::fs::write(&blocker, "x").unwrap();

        let archiver = Archiver::new(&blocker);
        let session = session_with_two_rounds();
        let record = ArchiveRecord::build(&session, serde_json::Value::Null);

        let err = archiver.write(&record).unwrap_err();
        assert!(matches!(err, ArchiveError::Io(_)));
    }

    #[test]
    fn test_archive_json_shape() {
        let session = session_with_two_rounds();
        let record = ArchiveRecord::build(&session, json!({"overallKeywords": []}));
        let value = serde_json::to_value(&record).unwrap();

        assert!(value["metadata"]["topic"].is_string());
        assert!(value["metadata"]["final_scores"].is_object());
        assert!(value["configuration"].is_array());
        assert!(value["transcript"].is_array());
        assert!(value["analysis"]["overallKeywords"].is_array());
    }
}
