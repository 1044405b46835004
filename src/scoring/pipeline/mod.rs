//! The scoring pipeline: deterministic rule heuristics, the classification
//! prompt, and the verdict parser that turns raw model output into a
//! structured result with a well-defined fallback.

pub(crate) mod parser;
pub(crate) mod prompt;
pub(crate) mod rules;

pub use parser::{parse_verdict, Verdict, VerdictProvenance};
pub use prompt::build_classification_prompt;
pub use rules::rule_points;

/// Per-lead score decomposition, useful for logs and the demo output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreBreakdown {
    pub rule_points: u16,
    pub ai_points: u16,
}

impl ScoreBreakdown {
    pub fn total(self) -> u16 {
        combine(self.rule_points, self.ai_points)
    }
}

/// Final score is the plain sum of the two contributions.
pub fn combine(rule_points: u16, ai_points: u16) -> u16 {
    rule_points + ai_points
}
