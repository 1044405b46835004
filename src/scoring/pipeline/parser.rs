use serde::Deserialize;
use tracing::warn;

use crate::scoring::domain::Intent;

const FALLBACK_REASONING: &str = "Not classified.";

/// Where a verdict came from, so callers can tell a genuine classification
/// apart from the malformed-response fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerdictProvenance {
    Parsed,
    Defaulted,
}

/// Structured classification result handed to the score combiner.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub intent: Intent,
    pub reasoning: String,
    pub provenance: VerdictProvenance,
}

impl Verdict {
    /// The safe default used whenever the model response cannot be decoded.
    pub fn fallback() -> Self {
        Self {
            intent: Intent::Medium,
            reasoning: FALLBACK_REASONING.to_string(),
            provenance: VerdictProvenance::Defaulted,
        }
    }

    pub fn ai_points(&self) -> u16 {
        self.intent.points()
    }
}

#[derive(Debug, Deserialize)]
struct RawVerdict {
    #[serde(default)]
    intent: Option<String>,
    #[serde(default)]
    reasoning: Option<String>,
}

/// Decode the raw model output into a verdict.
///
/// Markdown code fences are stripped before strict JSON decoding. A missing
/// `intent` defaults to Medium, an unrecognized label maps to Medium, and a
/// missing `reasoning` defaults to a sentinel string. Decode failures never
/// propagate; a malformed response for one lead must not abort the batch.
pub fn parse_verdict(raw: &str) -> Verdict {
    let cleaned = strip_code_fences(raw);

    match serde_json::from_str::<RawVerdict>(&cleaned) {
        Ok(parsed) => {
            let intent = parsed
                .intent
                .as_deref()
                .and_then(Intent::parse)
                .unwrap_or(Intent::Medium);
            let reasoning = parsed
                .reasoning
                .filter(|r| !r.trim().is_empty())
                .unwrap_or_else(|| FALLBACK_REASONING.to_string());
            Verdict {
                intent,
                reasoning,
                provenance: VerdictProvenance::Parsed,
            }
        }
        Err(err) => {
            warn!(%err, raw = %raw, "could not decode classifier response, using fallback verdict");
            Verdict::fallback()
        }
    }
}

fn strip_code_fences(raw: &str) -> String {
    raw.replace("```json", "").replace("```", "").trim().to_string()
}
