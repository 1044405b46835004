use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque identifier assigned to an offer at creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OfferId(pub String);

/// Opaque identifier assigned to a lead at ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LeadId(pub String);

impl fmt::Display for OfferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for LeadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Categorical buying-readiness classification of a lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    High,
    Medium,
    Low,
}

impl Intent {
    /// Score contribution of the classified intent.
    pub fn points(self) -> u16 {
        match self {
            Intent::High => 50,
            Intent::Medium => 30,
            Intent::Low => 10,
        }
    }

    /// Case-insensitive parse used by the results filter and the verdict
    /// parser. Unknown labels are rejected here; the verdict parser maps
    /// them to `Medium` itself.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "high" => Some(Intent::High),
            "medium" => Some(Intent::Medium),
            "low" => Some(Intent::Low),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Intent::High => "High",
            Intent::Medium => "Medium",
            Intent::Low => "Low",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Seller product profile used as scoring context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    pub id: OfferId,
    pub name: String,
    pub value_props: Vec<String>,
    pub ideal_use_cases: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Incoming offer payload, validated before it reaches the repository.
#[derive(Debug, Clone, Deserialize)]
pub struct OfferDraft {
    pub name: String,
    #[serde(default)]
    pub value_props: Vec<String>,
    #[serde(default)]
    pub ideal_use_cases: Vec<String>,
}

impl OfferDraft {
    pub fn validate(&self) -> Result<(), OfferValidationError> {
        if self.name.trim().is_empty() {
            return Err(OfferValidationError::MissingName);
        }
        if self.value_props.is_empty() {
            return Err(OfferValidationError::EmptyValueProps);
        }
        if self.ideal_use_cases.is_empty() {
            return Err(OfferValidationError::EmptyIdealUseCases);
        }
        if self.value_props.iter().any(|v| v.trim().is_empty()) {
            return Err(OfferValidationError::BlankEntry {
                field: "value_props",
            });
        }
        if self.ideal_use_cases.iter().any(|v| v.trim().is_empty()) {
            return Err(OfferValidationError::BlankEntry {
                field: "ideal_use_cases",
            });
        }
        Ok(())
    }
}

/// Validation failures for offer creation.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum OfferValidationError {
    #[error("missing required field: name")]
    MissingName,
    #[error("value_props must contain at least one entry")]
    EmptyValueProps,
    #[error("ideal_use_cases must contain at least one entry")]
    EmptyIdealUseCases,
    #[error("{field} must not contain blank entries")]
    BlankEntry { field: &'static str },
}

/// Prospective contact awaiting or carrying a score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: LeadId,
    pub name: String,
    pub role: String,
    pub company: String,
    pub industry: String,
    pub location: String,
    pub linkedin_bio: String,
    pub intent: Option<Intent>,
    pub score: Option<u16>,
    pub reasoning: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Lead {
    pub fn is_scored(&self) -> bool {
        self.intent.is_some()
    }

    /// The six profile fields in canonical column order.
    pub fn profile_fields(&self) -> [&str; 6] {
        [
            &self.name,
            &self.role,
            &self.company,
            &self.industry,
            &self.location,
            &self.linkedin_bio,
        ]
    }
}

/// Normalized row accepted from CSV ingestion; all fields are trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLead {
    pub name: String,
    pub role: String,
    pub company: String,
    pub industry: String,
    pub location: String,
    pub linkedin_bio: String,
}

impl NewLead {
    pub fn new(
        name: &str,
        role: &str,
        company: &str,
        industry: &str,
        location: &str,
        linkedin_bio: &str,
    ) -> Self {
        Self {
            name: name.trim().to_string(),
            role: role.trim().to_string(),
            company: company.trim().to_string(),
            industry: industry.trim().to_string(),
            location: location.trim().to_string(),
            linkedin_bio: linkedin_bio.trim().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intent_parse_is_case_insensitive() {
        assert_eq!(Intent::parse("HIGH"), Some(Intent::High));
        assert_eq!(Intent::parse(" medium "), Some(Intent::Medium));
        assert_eq!(Intent::parse("Low"), Some(Intent::Low));
        assert_eq!(Intent::parse("hot"), None);
    }

    #[test]
    fn intent_points_follow_the_band_table() {
        assert_eq!(Intent::High.points(), 50);
        assert_eq!(Intent::Medium.points(), 30);
        assert_eq!(Intent::Low.points(), 10);
    }

    #[test]
    fn offer_draft_rejects_blank_value_prop() {
        let draft = OfferDraft {
            name: "AI Outreach Automation".to_string(),
            value_props: vec!["24/7 outreach".to_string(), "  ".to_string()],
            ideal_use_cases: vec!["B2B SaaS mid-market".to_string()],
        };
        assert_eq!(
            draft.validate(),
            Err(OfferValidationError::BlankEntry {
                field: "value_props"
            })
        );
    }

    #[test]
    fn offer_draft_requires_all_fields() {
        let draft = OfferDraft {
            name: String::new(),
            value_props: vec!["x".to_string()],
            ideal_use_cases: vec!["y".to_string()],
        };
        assert_eq!(draft.validate(), Err(OfferValidationError::MissingName));

        let draft = OfferDraft {
            name: "X".to_string(),
            value_props: Vec::new(),
            ideal_use_cases: vec!["y".to_string()],
        };
        assert_eq!(draft.validate(), Err(OfferValidationError::EmptyValueProps));
    }

    #[test]
    fn new_lead_trims_every_field() {
        let row = NewLead::new(
            " Ava Patel ",
            "Head of Growth",
            " FlowMetrics",
            "B2B SaaS ",
            "New York",
            " Growth leader. ",
        );
        assert_eq!(row.name, "Ava Patel");
        assert_eq!(row.company, "FlowMetrics");
        assert_eq!(row.industry, "B2B SaaS");
        assert_eq!(row.linkedin_bio, "Growth leader.");
    }
}
