//! Lead ingestion, offer management, and the intent-scoring pipeline.
//!
//! The pipeline combines a deterministic rule score (role, industry fit,
//! profile completeness) with an LLM intent classification. Leads are scored
//! one at a time against the most recently created offer; a malformed or
//! failed classification falls back to a safe default instead of aborting
//! the run.

pub mod classifier;
pub mod domain;
pub mod export;
pub mod ingest;
pub mod pipeline;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use classifier::{ClassificationError, IntentClassifier, LlmBackend, LlmClassifier};
pub use domain::{Intent, Lead, LeadId, NewLead, Offer, OfferDraft, OfferId};
pub use pipeline::{combine, parse_verdict, rule_points, ScoreBreakdown, Verdict};
pub use repository::{
    InMemoryLeadRepository, InMemoryOfferRepository, LeadRepository, OfferRepository,
    RepositoryError, ResultsFilter,
};
pub use router::scoring_router;
pub use service::{CreateOfferError, ExportServiceError, LeadScoringService, ScoringError};
