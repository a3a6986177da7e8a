//! Participant roster — typed roles and session-start validation.
//!
//! Roster order is authoritative: it defines the round-robin speaking order
//! for the lifetime of the session. Roles are a tagged enum validated up
//! front, never inferred from participant name prefixes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role of a debate participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Argues a side of the topic.
    Debater,
    /// Closes each round with a verdict.
    Judge,
    /// Issues turn-management cues; excluded from the transcript.
    Moderator,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Debater => write!(f, "debater"),
            Self::Judge => write!(f, "judge"),
            Self::Moderator => write!(f, "moderator"),
        }
    }
}

/// One scheduled speaker. Immutable once a session starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    /// Unique name within the roster (case-insensitive).
    pub name: String,
    /// Speaking role.
    pub role: Role,
    /// Persona / system instructions handed to the generation service.
    pub persona: String,
}

impl Participant {
    pub fn new(name: &str, role: Role, persona: &str) -> Self {
        Self {
            name: name.to_string(),
            role,
            persona: persona.to_string(),
        }
    }
}

/// Error raised when a roster configuration is rejected at session start.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterError {
    #[error("roster is empty")]
    Empty,

    #[error("roster has no debaters")]
    NoDebaters,

    #[error("roster needs exactly one judge, found {0}")]
    JudgeCount(usize),

    #[error("roster allows at most one moderator, found {0}")]
    ModeratorCount(usize),

    #[error("duplicate participant name: {0}")]
    DuplicateName(String),

    #[error("participant name is blank")]
    BlankName,
}

/// A validated, ordered participant list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Roster {
    participants: Vec<Participant>,
}

impl Roster {
    /// Validate and construct a roster.
    ///
    /// Requires at least one debater, exactly one judge, at most one
    /// moderator, and unique non-blank names (compared case-insensitively).
    pub fn new(participants: Vec<Participant>) -> Result<Self, RosterError> {
        if participants.is_empty() {
            return Err(RosterError::Empty);
        }

        let mut seen: Vec<String> = Vec::with_capacity(participants.len());
        for p in &participants {
            if p.name.trim().is_empty() {
                return Err(RosterError::BlankName);
            }
            let lowered = p.name.to_lowercase();
            if seen.contains(&lowered) {
                return Err(RosterError::DuplicateName(p.name.clone()));
            }
            seen.push(lowered);
        }

        let debaters = participants
            .iter()
            .filter(|p| p.role == Role::Debater)
            .count();
        if debaters == 0 {
            return Err(RosterError::NoDebaters);
        }

        let judges = participants.iter().filter(|p| p.role == Role::Judge).count();
        if judges != 1 {
            return Err(RosterError::JudgeCount(judges));
        }

        let moderators = participants
            .iter()
            .filter(|p| p.role == Role::Moderator)
            .count();
        if moderators > 1 {
            return Err(RosterError::ModeratorCount(moderators));
        }

        Ok(Self { participants })
    }

    /// Number of participants (= turns per full round).
    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Participant at a roster offset.
    pub fn get(&self, offset: usize) -> Option<&Participant> {
        self.participants.get(offset)
    }

    /// Look up a participant by name, ignoring case.
    pub fn find(&self, name: &str) -> Option<&Participant> {
        self.participants
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Participant> {
        self.participants.iter()
    }

    /// Names of all debaters, in roster order.
    pub fn debater_names(&self) -> Vec<&str> {
        self.participants
            .iter()
            .filter(|p| p.role == Role::Debater)
            .map(|p| p.name.as_str())
            .collect()
    }

    /// The judge (validation guarantees exactly one).
    pub fn judge(&self) -> &Participant {
        self.participants
            .iter()
            .find(|p| p.role == Role::Judge)
            .expect("validated roster has a judge")
    }

    /// Whether the roster carries a moderator.
    pub fn has_moderator(&self) -> bool {
        self.participants.iter().any(|p| p.role == Role::Moderator)
    }
}
