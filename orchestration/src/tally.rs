//! Verdict tally — per-round winners extracted from judge messages.
//!
//! The verdict grammar is strict and fixed: the literal prefix
//! `Round Winner:` (case-insensitive) followed by a participant identifier
//! made of `[A-Za-z0-9_-]` characters, which must equal a roster participant
//! name ignoring case. A judge message with zero or multiple well-formed
//! verdicts excludes its round from the tally — a warning, never an error.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::roster::{Role, Roster};
use crate::transcript::ChatMessage;

fn verdict_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)round winner:\s*([A-Za-z0-9_\-]+)").expect("verdict pattern is valid")
    })
}

/// A round excluded from the tally, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallyWarning {
    pub round: u32,
    pub reason: String,
}

/// Overall outcome across all valid rounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverallResult {
    /// Strictly highest round-win count.
    Winner(String),
    /// No strictly highest count, or no valid rounds at all.
    Tie,
}

impl std::fmt::Display for OverallResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Winner(name) => write!(f, "{}", name),
            Self::Tie => write!(f, "Tie"),
        }
    }
}

/// Accumulated per-round verdicts. Never persisted — recomputed from the
/// segmented transcript whenever it is needed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerdictTally {
    /// Round number → winning participant (canonical roster name).
    pub round_winners: BTreeMap<u32, String>,
    /// Participant → total round wins. Debaters always present, at 0 if
    /// they never won.
    pub scores: BTreeMap<String, u32>,
    /// Rounds excluded from the tally.
    pub warnings: Vec<TallyWarning>,
}

impl VerdictTally {
    /// Overall winner: the participant with the strictly highest count.
    pub fn overall(&self) -> OverallResult {
        if self.round_winners.is_empty() {
            return OverallResult::Tie;
        }

        let max = self.scores.values().copied().max().unwrap_or(0);
        let mut at_max = self.scores.iter().filter(|(_, count)| **count == max);

        match (at_max.next(), at_max.next()) {
            (Some((name, _)), None) => OverallResult::Winner(name.clone()),
            _ => OverallResult::Tie,
        }
    }

    /// Number of rounds that produced a valid verdict.
    pub fn valid_rounds(&self) -> usize {
        self.round_winners.len()
    }
}

/// Scan the segmented transcript for judge verdicts and build the tally.
pub fn tally(messages: &[ChatMessage], roster: &Roster) -> VerdictTally {
    let mut round_winners = BTreeMap::new();
    let mut scores: BTreeMap<String, u32> = roster
        .debater_names()
        .into_iter()
        .map(|name| (name.to_string(), 0))
        .collect();
    let mut warnings = Vec::new();

    for message in messages.iter().filter(|m| m.role == Role::Judge) {
        let mut valid: Vec<&str> = Vec::new();
        let mut unknown: Vec<String> = Vec::new();

        for cap in verdict_re().captures_iter(&message.text) {
            let token = cap.get(1).map(|m| m.as_str()).unwrap_or_default();
            match roster.find(token) {
                Some(p) => valid.push(p.name.as_str()),
                None => unknown.push(token.to_string()),
            }
        }

        match valid.as_slice() {
            [winner] => {
                let winner = winner.to_string();
                *scores.entry(winner.clone()).or_insert(0) += 1;
                round_winners.insert(message.round, winner);
            }
            [] => {
                let reason = if unknown.is_empty() {
                    "no verdict token in judge message".to_string()
                } else {
                    format!("verdict names unknown participant: {}", unknown.join(", "))
                };
                warn!(round = message.round, %reason, "round excluded from tally");
                warnings.push(TallyWarning {
                    round: message.round,
                    reason,
                });
            }
            many => {
                let reason = format!("multiple verdict tokens: {}", many.join(", "));
                warn!(round = message.round, %reason, "round excluded from tally");
                warnings.push(TallyWarning {
                    round: message.round,
                    reason,
                });
            }
        }
    }

    VerdictTally {
        round_winners,
        scores,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::Participant;

    fn roster() -> Roster {
        Roster::new(vec![
            Participant::new("Debater_A", Role::Debater, "for"),
            Participant::new("Debater_B", Role::Debater, "against"),
            Participant::new("Judge", Role::Judge, "judge"),
        ])
        .unwrap()
    }

    fn judge_msg(round: u32, text: &str) -> ChatMessage {
        ChatMessage {
            round,
            agent: "Judge".to_string(),
            role: Role::Judge,
            text: text.to_string(),
            position: 2,
        }
    }

    fn debater_msg(round: u32, text: &str) -> ChatMessage {
        ChatMessage {
            round,
            agent: "Debater_A".to_string(),
            role: Role::Debater,
            text: text.to_string(),
            position: 0,
        }
    }

    #[test]
    fn test_basic_tally() {
        let messages = vec![
            judge_msg(1, "Strong opening. Round Winner: Debater_A"),
            judge_msg(2, "Round Winner: Debater_A"),
            judge_msg(3, "Better rebuttal this time. Round Winner: Debater_B"),
        ];
        let tally = tally(&messages, &roster());

        assert_eq!(tally.scores["Debater_A"], 2);
        assert_eq!(tally.scores["Debater_B"], 1);
        assert_eq!(tally.overall(), OverallResult::Winner("Debater_A".to_string()));
        assert_eq!(tally.valid_rounds(), 3);
        assert!(tally.warnings.is_empty());
    }

    #[test]
    fn test_equal_top_counts_is_tie() {
        let messages = vec![
            judge_msg(1, "Round Winner: Debater_A"),
            judge_msg(2, "Round Winner: Debater_B"),
            judge_msg(3, "Round Winner: Debater_A"),
            judge_msg(4, "Round Winner: Debater_B"),
        ];
        let tally = tally(&messages, &roster());
        assert_eq!(tally.overall(), OverallResult::Tie);
    }

    #[test]
    fn test_no_valid_rounds_is_tie() {
        let messages = vec![judge_msg(1, "both sides made fair points")];
        let tally = tally(&messages, &roster());
        assert_eq!(tally.overall(), OverallResult::Tie);
        assert_eq!(tally.warnings.len(), 1);
        assert_eq!(tally.scores["Debater_A"], 0);
    }

    #[test]
    fn test_case_insensitive_match() {
        let messages = vec![judge_msg(1, "ROUND WINNER: debater_a")];
        let tally = tally(&messages, &roster());
        // Canonical roster spelling in the output.
        assert_eq!(tally.round_winners[&1], "Debater_A");
        assert_eq!(tally.scores["Debater_A"], 1);
    }

    #[test]
    fn test_unknown_participant_excluded() {
        let messages = vec![judge_msg(1, "Round Winner: Debater_C")];
        let tally = tally(&messages, &roster());
        assert!(tally.round_winners.is_empty());
        assert!(tally.warnings[0].reason.contains("Debater_C"));
    }

    #[test]
    fn test_multiple_verdicts_excluded() {
        let messages = vec![judge_msg(
            1,
            "Round Winner: Debater_A... no wait, Round Winner: Debater_B",
        )];
        let tally = tally(&messages, &roster());
        assert!(tally.round_winners.is_empty());
        assert_eq!(tally.warnings.len(), 1);
        assert!(tally.warnings[0].reason.contains("multiple"));
    }

    #[test]
    fn test_malformed_round_does_not_block_later_rounds() {
        let messages = vec![
            judge_msg(1, "too close to call"),
            judge_msg(2, "Round Winner: Debater_B"),
        ];
        let tally = tally(&messages, &roster());
        assert_eq!(tally.round_winners.len(), 1);
        assert_eq!(tally.round_winners[&2], "Debater_B");
        assert_eq!(tally.overall(), OverallResult::Winner("Debater_B".to_string()));
    }

    #[test]
    fn test_non_judge_messages_ignored() {
        // A debater quoting the verdict format must not score a round.
        let messages = vec![
            debater_msg(1, "I predict the judge will say Round Winner: Debater_A"),
            judge_msg(1, "Round Winner: Debater_B"),
        ];
        let tally = tally(&messages, &roster());
        assert_eq!(tally.scores["Debater_A"], 0);
        assert_eq!(tally.scores["Debater_B"], 1);
    }

    #[test]
    fn test_overall_display() {
        assert_eq!(
            OverallResult::Winner("Debater_A".to_string()).to_string(),
            "Debater_A"
        );
        assert_eq!(OverallResult::Tie.to_string(), "Tie");
    }
}
