use std::sync::Arc;

use tracing::{info, warn};

use super::classifier::{IntentClassifier, LlmBackend};
use super::domain::{Lead, Offer, OfferDraft, OfferValidationError};
use super::export;
use super::ingest::{self, IngestError};
use super::pipeline::{parse_verdict, rule_points, ScoreBreakdown, Verdict, VerdictProvenance};
use super::repository::{LeadRepository, OfferRepository, RepositoryError, ResultsFilter};

/// Service composing the repositories and the intent classifier. The scoring
/// run is the interesting path; offer creation, ingestion, and result
/// listing are thin delegations.
pub struct LeadScoringService<O, L, C> {
    offers: Arc<O>,
    leads: Arc<L>,
    classifier: Arc<C>,
}

impl<O, L, C> LeadScoringService<O, L, C>
where
    O: OfferRepository + 'static,
    L: LeadRepository + 'static,
    C: IntentClassifier + 'static,
{
    pub fn new(offers: Arc<O>, leads: Arc<L>, classifier: Arc<C>) -> Self {
        Self {
            offers,
            leads,
            classifier,
        }
    }

    /// Validate and store a new offer. Offers are immutable once created;
    /// the newest one becomes the active scoring context.
    pub fn create_offer(&self, draft: OfferDraft) -> Result<Offer, CreateOfferError> {
        draft.validate()?;
        let offer = self.offers.create(draft)?;
        info!(offer = %offer.id, name = %offer.name, "offer created");
        Ok(offer)
    }

    /// Parse uploaded CSV text and bulk-insert the rows, skipping duplicates.
    /// Returns (rows parsed, rows inserted).
    pub fn upload_leads(&self, csv_text: &str) -> Result<(usize, usize), UploadError> {
        let rows = ingest::parse_leads(csv_text.as_bytes())?;
        let parsed = rows.len();
        let inserted = self.leads.bulk_insert(rows)?;
        info!(parsed, inserted, "lead upload complete");
        Ok((parsed, inserted))
    }

    /// Score every unscored lead against the most recent offer. A `Some`
    /// backend routes every classification call in this run to that backend;
    /// `None` leaves the classifier on its configured default.
    ///
    /// Leads are processed strictly sequentially; each lead's classify,
    /// parse, and persist steps complete before the next lead starts. A
    /// failed classification call is converted into the same fallback
    /// verdict as a malformed response, so one bad lead never aborts the
    /// batch. Repository failures do abort the run.
    pub async fn run_scoring(
        &self,
        backend: Option<LlmBackend>,
    ) -> Result<Vec<Lead>, ScoringError> {
        let offer = self
            .offers
            .latest()?
            .ok_or(ScoringError::NoOfferConfigured)?;

        let pending = self.leads.unscored()?;
        if pending.is_empty() {
            return Err(ScoringError::NoUnscoredLeads);
        }

        info!(offer = %offer.id, count = pending.len(), "scoring run started");

        let mut results = Vec::with_capacity(pending.len());
        for lead in pending {
            let verdict = self.classify_lead(&offer, &lead, backend).await;
            let breakdown = ScoreBreakdown {
                rule_points: rule_points(&lead, &offer),
                ai_points: verdict.ai_points(),
            };

            let updated = self.leads.update_scoring(
                &lead.id,
                verdict.intent,
                breakdown.total(),
                verdict.reasoning,
            )?;

            info!(
                lead = %updated.id,
                rule_points = breakdown.rule_points,
                ai_points = breakdown.ai_points,
                score = breakdown.total(),
                intent = %verdict.intent,
                "lead scored"
            );
            results.push(updated);
        }

        info!(scored = results.len(), "scoring run complete");
        Ok(results)
    }

    async fn classify_lead(
        &self,
        offer: &Offer,
        lead: &Lead,
        backend: Option<LlmBackend>,
    ) -> Verdict {
        match self.classifier.classify(offer, lead, backend).await {
            Ok(raw) => {
                let verdict = parse_verdict(&raw);
                if verdict.provenance == VerdictProvenance::Defaulted {
                    warn!(lead = %lead.id, "classifier response defaulted to fallback verdict");
                }
                verdict
            }
            Err(err) => {
                warn!(lead = %lead.id, %err, "classification call failed, using fallback verdict");
                Verdict::fallback()
            }
        }
    }

    /// Filtered results listing, newest first.
    pub fn results(&self, filter: &ResultsFilter) -> Result<Vec<Lead>, RepositoryError> {
        self.leads.filter(filter)
    }

    /// Every lead serialized as CSV, or `ExportServiceError::NoLeads` when
    /// the store is empty.
    pub fn export_results(&self) -> Result<String, ExportServiceError> {
        let leads = self.leads.all()?;
        if leads.is_empty() {
            return Err(ExportServiceError::NoLeads);
        }
        Ok(export::to_csv(&leads)?)
    }
}

/// Failures surfaced when creating an offer.
#[derive(Debug, thiserror::Error)]
pub enum CreateOfferError {
    #[error(transparent)]
    Validation(#[from] OfferValidationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Failures surfaced when uploading a lead CSV.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error(transparent)]
    Ingest(#[from] IngestError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Failures surfaced by a scoring run.
#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error("No offer found.")]
    NoOfferConfigured,
    #[error("No unscored leads found.")]
    NoUnscoredLeads,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Failures surfaced when exporting results.
#[derive(Debug, thiserror::Error)]
pub enum ExportServiceError {
    #[error("No leads found to export")]
    NoLeads,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Export(#[from] export::ExportError),
}
