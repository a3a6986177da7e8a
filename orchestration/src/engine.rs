//! Round engine — drives scheduler turns through the generation service.
//!
//! Within a round, participants speak strictly in roster order; each
//! generation call's output becomes context for the next. The moderator's
//! turn is synthesized here (a round-opening cue) and never reaches the
//! generation service. Only fully produced utterances are committed: a
//! generation failure or a cancellation leaves the log at the last success
//! and the cursor pointing at the speaker who never finished, so the next
//! continue/stream call resumes exactly there.

use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::generate::{GenerationError, Generator};
use crate::roster::Role;
use crate::session::Session;
use crate::stream::DebateEvent;

/// Round-opening cue for the very first round.
fn topic_cue(topic: &str) -> String {
    format!("Debate Topic: {}", topic)
}

/// Round-opening cue for every later round.
const NEXT_ROUND_CUE: &str = "Proceed to the next round of arguments.";

/// Error from driving a round.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Generation(#[from] GenerationError),
}

/// How a streamed round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamOutcome {
    /// Every scheduled turn was taken.
    Completed,
    /// Cancelled between turns; the round is left incomplete.
    Cancelled,
    /// The consumer dropped its receiver; treated like cancellation.
    Disconnected,
}

/// Extend the session's turn budget to the end of the current roster cycle.
///
/// At a cycle boundary this schedules one fresh full round; mid-cycle (after
/// a cancelled stream or an aborted turn) it schedules only the turns needed
/// to finish the round in progress, so rounds never bleed into each other.
pub fn extend_for_round(session: &mut Session) {
    let len = session.roster.len();
    let taken = session.scheduler.turns_taken();
    let partial = taken % len;
    let needed = if partial == 0 { len } else { len - partial };
    let target = taken + needed;
    let shortfall = target.saturating_sub(session.scheduler.budget());
    session.scheduler.advance(shortfall);
}

/// Take one scheduled turn. Returns the committed log index, or an error
/// with the cursor unmoved.
async fn take_turn(
    session: &mut Session,
    generator: &dyn Generator,
) -> Result<usize, EngineError> {
    let offset = session.scheduler.peek();
    let participant = session
        .roster
        .get(offset)
        .cloned()
        .expect("cursor mod roster length is a valid offset");

    let text = if participant.role == Role::Moderator {
        if session.log.is_empty() {
            topic_cue(&session.topic)
        } else {
            NEXT_ROUND_CUE.to_string()
        }
    } else {
        let history = session.history();
        generator.generate(&participant.persona, &history).await?
    };

    let entry = session.append(&participant.name, participant.role, text);
    let index = entry.index;
    debug!(
        session_id = %session.id,
        speaker = %participant.name,
        role = %participant.role,
        index,
        "turn committed"
    );
    session.scheduler.next_speaker();
    Ok(index)
}

/// Run the scheduled turns to completion, blocking the caller for the
/// whole round.
pub async fn run_round(
    session: &mut Session,
    generator: &dyn Generator,
) -> Result<(), EngineError> {
    let round = session.current_round();
    info!(session_id = %session.id, round, "running round");

    while !session.scheduler.exhausted() {
        if let Err(e) = take_turn(session, generator).await {
            warn!(session_id = %session.id, round, error = %e, "round aborted");
            return Err(e);
        }
    }

    Ok(())
}

/// Run the scheduled turns, emitting one frame per committed message.
///
/// The cancellation token is checked between turns only — cooperative
/// cancellation never retracts a committed message. The delivery cursor is
/// advanced per commit so batch resumes never replay streamed messages.
pub async fn stream_round(
    session: &mut Session,
    generator: &dyn Generator,
    frames: mpsc::Sender<DebateEvent>,
    cancel: CancellationToken,
) -> Result<StreamOutcome, EngineError> {
    let round = session.current_round();
    let _ = frames.send(DebateEvent::started(round)).await;
    info!(session_id = %session.id, round, "streaming round");

    while !session.scheduler.exhausted() {
        if cancel.is_cancelled() {
            info!(session_id = %session.id, round, "stream cancelled between turns");
            return Ok(StreamOutcome::Cancelled);
        }

        let index = match take_turn(session, generator).await {
            Ok(index) => index,
            Err(e) => {
                let _ = frames.send(DebateEvent::error(&e.to_string())).await;
                warn!(session_id = %session.id, round, error = %e, "stream aborted");
                return Err(e);
            }
        };

        session.delivered = session.log.len();

        let entry = &session.log[index];
        if entry.role != Role::Moderator {
            let frame = DebateEvent::message(&entry.speaker, &entry.text, round, entry.timestamp);
            if frames.send(frame).await.is_err() {
                info!(session_id = %session.id, round, "stream consumer disconnected");
                return Ok(StreamOutcome::Disconnected);
            }
        }
    }

    let _ = frames.send(DebateEvent::completed(round)).await;
    Ok(StreamOutcome::Completed)
}
