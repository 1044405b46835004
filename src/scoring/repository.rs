use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use chrono::Utc;

use super::domain::{Intent, Lead, LeadId, NewLead, Offer, OfferDraft, OfferId};

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Storage abstraction for offers so the service can be exercised with
/// test doubles.
pub trait OfferRepository: Send + Sync {
    fn create(&self, draft: OfferDraft) -> Result<Offer, RepositoryError>;
    /// The most recently created offer, if any. Scoring always runs against
    /// this one.
    fn latest(&self) -> Result<Option<Offer>, RepositoryError>;
}

/// Query parameters accepted by the results listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultsFilter {
    pub intent: Option<Intent>,
    pub min_score: Option<u16>,
    pub limit: Option<usize>,
}

/// Storage abstraction for leads.
pub trait LeadRepository: Send + Sync {
    /// Insert rows, skipping any row whose six profile fields exactly match
    /// an already-stored lead. Returns the number actually inserted.
    fn bulk_insert(&self, rows: Vec<NewLead>) -> Result<usize, RepositoryError>;
    /// Leads with no intent yet, in store order.
    fn unscored(&self) -> Result<Vec<Lead>, RepositoryError>;
    /// Filtered listing, newest first.
    fn filter(&self, filter: &ResultsFilter) -> Result<Vec<Lead>, RepositoryError>;
    /// Every lead, newest first.
    fn all(&self) -> Result<Vec<Lead>, RepositoryError>;
    /// Persist the scoring triple onto a lead and return the updated record.
    fn update_scoring(
        &self,
        id: &LeadId,
        intent: Intent,
        score: u16,
        reasoning: String,
    ) -> Result<Lead, RepositoryError>;
}

/// Mutex-guarded offer store backing the default deployment.
#[derive(Default)]
pub struct InMemoryOfferRepository {
    offers: Mutex<Vec<Offer>>,
    sequence: AtomicU64,
}

impl InMemoryOfferRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> OfferId {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        OfferId(format!("offer-{id:06}"))
    }
}

impl OfferRepository for InMemoryOfferRepository {
    fn create(&self, draft: OfferDraft) -> Result<Offer, RepositoryError> {
        let offer = Offer {
            id: self.next_id(),
            name: draft.name,
            value_props: draft.value_props,
            ideal_use_cases: draft.ideal_use_cases,
            created_at: Utc::now(),
        };

        let mut offers = self
            .offers
            .lock()
            .map_err(|err| RepositoryError::Unavailable(err.to_string()))?;
        offers.push(offer.clone());
        Ok(offer)
    }

    fn latest(&self) -> Result<Option<Offer>, RepositoryError> {
        let offers = self
            .offers
            .lock()
            .map_err(|err| RepositoryError::Unavailable(err.to_string()))?;
        Ok(offers.last().cloned())
    }
}

/// Mutex-guarded lead store backing the default deployment.
#[derive(Default)]
pub struct InMemoryLeadRepository {
    leads: Mutex<Vec<Lead>>,
    sequence: AtomicU64,
}

impl InMemoryLeadRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> LeadId {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        LeadId(format!("lead-{id:06}"))
    }
}

impl LeadRepository for InMemoryLeadRepository {
    fn bulk_insert(&self, rows: Vec<NewLead>) -> Result<usize, RepositoryError> {
        let mut leads = self
            .leads
            .lock()
            .map_err(|err| RepositoryError::Unavailable(err.to_string()))?;

        let mut inserted = 0;
        for row in rows {
            let duplicate = leads.iter().any(|lead| {
                lead.name == row.name
                    && lead.role == row.role
                    && lead.company == row.company
                    && lead.industry == row.industry
                    && lead.location == row.location
                    && lead.linkedin_bio == row.linkedin_bio
            });
            if duplicate {
                continue;
            }

            leads.push(Lead {
                id: self.next_id(),
                name: row.name,
                role: row.role,
                company: row.company,
                industry: row.industry,
                location: row.location,
                linkedin_bio: row.linkedin_bio,
                intent: None,
                score: None,
                reasoning: None,
                created_at: Utc::now(),
            });
            inserted += 1;
        }

        Ok(inserted)
    }

    fn unscored(&self) -> Result<Vec<Lead>, RepositoryError> {
        let leads = self
            .leads
            .lock()
            .map_err(|err| RepositoryError::Unavailable(err.to_string()))?;
        Ok(leads
            .iter()
            .filter(|lead| !lead.is_scored())
            .cloned()
            .collect())
    }

    fn filter(&self, filter: &ResultsFilter) -> Result<Vec<Lead>, RepositoryError> {
        let leads = self
            .leads
            .lock()
            .map_err(|err| RepositoryError::Unavailable(err.to_string()))?;

        let mut selected: Vec<Lead> = leads
            .iter()
            .filter(|lead| match filter.intent {
                Some(intent) => lead.intent == Some(intent),
                None => true,
            })
            .filter(|lead| match filter.min_score {
                Some(min) => lead.score.is_some_and(|score| score >= min),
                None => true,
            })
            .cloned()
            .collect();

        selected.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(limit) = filter.limit {
            selected.truncate(limit);
        }
        Ok(selected)
    }

    fn all(&self) -> Result<Vec<Lead>, RepositoryError> {
        self.filter(&ResultsFilter::default())
    }

    fn update_scoring(
        &self,
        id: &LeadId,
        intent: Intent,
        score: u16,
        reasoning: String,
    ) -> Result<Lead, RepositoryError> {
        let mut leads = self
            .leads
            .lock()
            .map_err(|err| RepositoryError::Unavailable(err.to_string()))?;

        let lead = leads
            .iter_mut()
            .find(|lead| &lead.id == id)
            .ok_or(RepositoryError::NotFound)?;

        lead.intent = Some(intent);
        lead.score = Some(score);
        lead.reasoning = Some(reasoning);
        Ok(lead.clone())
    }
}
