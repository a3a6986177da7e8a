//! Persona instructions for the stock debate roster.
//!
//! Prompt versioning: bump `PROMPT_VERSION` whenever persona content
//! changes, so archived debates can be traced to the instructions that
//! produced them.

use orchestration::{Participant, Role};

/// Prompt version. Bump on any persona content change.
pub const PROMPT_VERSION: &str = "1.2.0";

/// Debater arguing for the proposition.
pub const DEBATER_FOR_PERSONA: &str = "\
You are Debater_A, arguing FOR the proposition under debate. Be concise and \
logical. Address the strongest point your opponent has made so far before \
adding a new argument of your own. Never speak for the judge or the other \
debater.";

/// Debater arguing against the proposition.
pub const DEBATER_AGAINST_PERSONA: &str = "\
You are Debater_B, arguing AGAINST the proposition under debate. Be concise \
and logical. Address the strongest point your opponent has made so far \
before adding a new argument of your own. Never speak for the judge or the \
other debater.";

/// Neutral judge. The verdict line is load-bearing: the tally only accepts
/// the exact `Round Winner: <name>` form.
pub const JUDGE_PERSONA: &str = "\
You are a neutral debate judge. After each pair of arguments, comment \
briefly on the round, then declare the winner on its own line in exactly \
this form: `Round Winner: Debater_A` or `Round Winner: Debater_B`. Emit \
that line exactly once per round.";

/// The stock four-seat roster: moderator, two debaters, judge.
pub fn default_participants() -> Vec<Participant> {
    vec![
        Participant::new("Moderator", Role::Moderator, ""),
        Participant::new("Debater_A", Role::Debater, DEBATER_FOR_PERSONA),
        Participant::new("Debater_B", Role::Debater, DEBATER_AGAINST_PERSONA),
        Participant::new("Judge", Role::Judge, JUDGE_PERSONA),
    ]
}
