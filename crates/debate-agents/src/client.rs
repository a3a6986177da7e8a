//! Generation and analysis collaborators backed by real services.
//!
//! `OpenAiGenerator` speaks the OpenAI-compatible chat completions protocol:
//! the participant's persona becomes the system message and the shared
//! conversation history becomes named user turns, so each participant sees
//! everything said so far regardless of who said it.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use orchestration::{
    AnalysisEngine, AnalysisError, ChatMessage, GenerationError, Generator, HistoryEntry, Role,
};

use crate::config::GenerationConfig;

/// OpenAI-compatible chat completion client.
pub struct OpenAiGenerator {
    client: reqwest::Client,
    config: GenerationConfig,
}

impl OpenAiGenerator {
    pub fn new(config: GenerationConfig) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .expect("Failed to create HTTP client"),
            config,
        }
    }

    /// Chat messages for one turn: persona as system, history as named
    /// user turns.
    pub fn build_messages(persona: &str, history: &[HistoryEntry]) -> Vec<serde_json::Value> {
        let mut messages = vec![json!({ "role": "system", "content": persona })];
        for entry in history {
            messages.push(json!({
                "role": "user",
                "content": format!("{}: {}", entry.speaker, entry.text),
            }));
        }
        messages
    }
}

#[async_trait]
impl Generator for OpenAiGenerator {
    async fn generate(
        &self,
        persona: &str,
        history: &[HistoryEntry],
    ) -> Result<String, GenerationError> {
        let request_body = json!({
            "model": self.config.model,
            "messages": Self::build_messages(persona, history),
            "max_tokens": self.config.max_tokens,
            "temperature": 0.7,
        });

        let url = format!("{}/chat/completions", self.config.base_url);
        let mut request = self.client.post(&url).json(&request_body);
        if let Some(key) = &self.config.api_key {
            request = request.header("Authorization", format!("Bearer {}", key));
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                GenerationError::Timeout(self.config.timeout_secs)
            } else {
                GenerationError::RequestFailed(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::RequestFailed(format!(
                "completion API error ({}): {}",
                status, body
            )));
        }

        let resp_json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| GenerationError::ParseError(e.to_string()))?;

        let content = resp_json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| {
                GenerationError::ParseError("missing choices[0].message.content".into())
            })?
            .trim()
            .to_string();

        debug!(model = %self.config.model, chars = content.len(), "turn generated");
        Ok(content)
    }
}

const STOPWORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "of", "to", "in", "on", "for", "with", "is", "are",
    "was", "were", "be", "been", "it", "its", "this", "that", "as", "at", "by", "from", "not",
    "will", "would", "can", "could", "has", "have", "had", "we", "our", "you", "your", "they",
    "their", "i", "my", "more", "most", "than", "so", "if", "no", "yes", "do", "does",
];

/// Keyword-frequency analysis over debater messages. Stands in for a
/// heavier topic-modeling engine behind the same `AnalysisEngine` seam.
pub struct KeywordAnalyzer {
    /// Keywords reported per debater.
    pub top_n: usize,
}

impl Default for KeywordAnalyzer {
    fn default() -> Self {
        Self { top_n: 10 }
    }
}

impl KeywordAnalyzer {
    fn keywords(texts: &[&str], top_n: usize) -> Vec<serde_json::Value> {
        let mut counts: std::collections::HashMap<String, u32> = std::collections::HashMap::new();
        for text in texts {
            for word in text
                .split(|c: char| !c.is_alphanumeric())
                .filter(|w| w.len() > 2)
            {
                let lowered = word.to_lowercase();
                if !STOPWORDS.contains(&lowered.as_str()) {
                    *counts.entry(lowered).or_insert(0) += 1;
                }
            }
        }

        let mut ranked: Vec<(String, u32)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked
            .into_iter()
            .take(top_n)
            .map(|(term, score)| json!({ "term": term, "score": score }))
            .collect()
    }
}

#[async_trait]
impl AnalysisEngine for KeywordAnalyzer {
    async fn analyze(&self, messages: &[ChatMessage]) -> Result<serde_json::Value, AnalysisError> {
        let debater_messages: Vec<&ChatMessage> =
            messages.iter().filter(|m| m.role == Role::Debater).collect();
        if debater_messages.is_empty() {
            return Err(AnalysisError::Failed(
                "no debater messages to analyze".into(),
            ));
        }

        let all_texts: Vec<&str> = debater_messages.iter().map(|m| m.text.as_str()).collect();
        let overall = Self::keywords(&all_texts, self.top_n);

        let mut by_debater = serde_json::Map::new();
        let mut agents: Vec<&str> = debater_messages.iter().map(|m| m.agent.as_str()).collect();
        agents.sort_unstable();
        agents.dedup();
        for agent in agents {
            let texts: Vec<&str> = debater_messages
                .iter()
                .filter(|m| m.agent == agent)
                .map(|m| m.text.as_str())
                .collect();
            by_debater.insert(
                agent.to_string(),
                serde_json::Value::Array(Self::keywords(&texts, self.top_n)),
            );
        }

        Ok(json!({
            "overallKeywords": overall,
            "keywordsByDebater": by_debater,
        }))
    }
}
