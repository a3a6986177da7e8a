//! External collaborator seams — generation and analysis.
//!
//! The orchestrator never produces natural language and never inspects
//! analysis payloads; both capabilities are injected behind these traits.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::roster::Role;
use crate::transcript::ChatMessage;

/// One prior utterance handed to the generation service as context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub speaker: String,
    pub role: Role,
    pub text: String,
}

/// Error from a generation call.
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    #[error("generation request failed: {0}")]
    RequestFailed(String),

    #[error("generation timed out after {0}s")]
    Timeout(u64),

    #[error("response parse error: {0}")]
    ParseError(String),
}

/// The opaque natural-language generation capability.
///
/// A failure aborts the current turn; the orchestrator commits nothing past
/// the last successful generation.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(
        &self,
        persona: &str,
        history: &[HistoryEntry],
    ) -> Result<String, GenerationError>;
}

/// Error from the analysis collaborator.
#[derive(Debug, Clone, Error)]
pub enum AnalysisError {
    #[error("analysis failed: {0}")]
    Failed(String),

    #[error("no analysis engine configured")]
    Unavailable,
}

/// Downstream text/topic analysis. The payload is opaque to the
/// orchestrator and is merged into archives verbatim.
#[async_trait]
pub trait AnalysisEngine: Send + Sync {
    async fn analyze(&self, messages: &[ChatMessage]) -> Result<serde_json::Value, AnalysisError>;
}
