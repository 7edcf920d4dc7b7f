//! LLM-backed judgment oracle.
//!
//! Implements the contract between LLM JSON responses and tournament outcomes.

use serde::Deserialize;
use tracing::debug;

use crate::gateway::{ChatGateway, ChatRequest, ProviderError};
use crate::prompts::{PromptTemplate, COMPARISON_PROMPT};

use super::collector::JudgmentOracle;
use super::types::{ComparisonTask, Outcome};

// =============================================================================
// Constants
// =============================================================================

/// Hard cap on generation for a single judgment.
pub const JUDGE_MAX_OUTPUT_TOKENS: u32 = 256;
/// Sampling temperature for judgments. Non-zero so the two presentation
/// orders of a pair are independent draws.
pub const JUDGE_TEMPERATURE: f32 = 0.9;

// =============================================================================
// JSON parsing
// =============================================================================

/// Raw JSON structure from LLM response. Extra keys are ignored.
#[derive(Debug, Deserialize)]
struct JudgmentJson {
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    preferred: Option<serde_json::Value>,
}

/// Which of the two presented items the model preferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preferred {
    First,
    Second,
}

/// Error type for judge operations.
#[derive(Debug, thiserror::Error)]
pub enum JudgeError {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Parse an LLM response into `(preferred, reason)`.
pub fn parse_judgment_response(raw: &str) -> Result<(Preferred, String), JudgeError> {
    let json_str = extract_json(raw);

    let parsed: JudgmentJson =
        serde_json::from_str(json_str).map_err(|e| JudgeError::Parse(e.to_string()))?;

    let preferred = parsed
        .preferred
        .ok_or_else(|| JudgeError::Parse("missing 'preferred'".into()))?;
    // Some models quote the number.
    let preferred = match preferred.as_u64().or_else(|| preferred.as_str()?.trim().parse().ok()) {
        Some(1) => Preferred::First,
        Some(2) => Preferred::Second,
        _ => {
            return Err(JudgeError::Parse(format!(
                "'preferred' must be 1 or 2, got {preferred}"
            )))
        }
    };
    let reason = parsed
        .reason
        .ok_or_else(|| JudgeError::Parse("missing 'reason'".into()))?;

    Ok((preferred, reason))
}

/// Extract JSON object from response (handles models that add surrounding text).
fn extract_json(raw: &str) -> &str {
    let trimmed = raw.trim();

    if let Some(start) = trimmed.find('{') {
        let remainder = &trimmed[start..];
        let mut depth = 0;
        let mut in_string = false;
        let mut escaped = false;
        for (i, c) in remainder.char_indices() {
            if in_string {
                match c {
                    _ if escaped => escaped = false,
                    '\\' => escaped = true,
                    '"' => in_string = false,
                    _ => {}
                }
                continue;
            }
            match c {
                '"' => in_string = true,
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return &remainder[..=i];
                    }
                }
                _ => {}
            }
        }
    }

    trimmed
}

// =============================================================================
// LLM judge
// =============================================================================

/// Judges a [`ComparisonTask`] by asking a chat model which item is better.
pub struct LlmJudge<G: ChatGateway> {
    gateway: G,
    label: String,
    template: PromptTemplate,
}

impl<G: ChatGateway> LlmJudge<G> {
    /// `label` names the kind of thing being compared ("companies", "novels").
    pub fn new(gateway: G, label: impl Into<String>) -> Self {
        Self {
            gateway,
            label: label.into(),
            template: COMPARISON_PROMPT,
        }
    }

    pub fn with_template(mut self, template: PromptTemplate) -> Self {
        self.template = template;
        self
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    fn request_for(&self, task: &ComparisonTask) -> ChatRequest {
        let prompt = self
            .template
            .render(&self.label, &task.item_a, &task.item_b, &task.attribute);
        ChatRequest::new(task.model.clone(), prompt.to_messages())
            .max_tokens(JUDGE_MAX_OUTPUT_TOKENS)
            .temperature(JUDGE_TEMPERATURE)
            .json()
    }
}

#[async_trait::async_trait]
impl<G: ChatGateway> JudgmentOracle for LlmJudge<G> {
    type Error = JudgeError;

    async fn judge(&self, task: &ComparisonTask) -> Result<Outcome, JudgeError> {
        let response = self.gateway.chat(self.request_for(task)).await?;
        let (preferred, reason) = parse_judgment_response(&response.content)?;

        debug!(
            item_a = %task.item_a,
            item_b = %task.item_b,
            attribute = %task.attribute,
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            latency_ms = response.latency.as_millis() as u64,
            "Judge responded"
        );

        let (winner, loser) = match preferred {
            Preferred::First => (&task.item_a, &task.item_b),
            Preferred::Second => (&task.item_b, &task.item_a),
        };
        Ok(Outcome::new(
            winner.clone(),
            loser.clone(),
            task.attribute.clone(),
            reason,
        ))
    }
}
