use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use crate::scoring::classifier::{ClassificationError, IntentClassifier, LlmBackend};
use crate::scoring::domain::{Lead, LeadId, Offer, OfferDraft, OfferId};
use crate::scoring::repository::{InMemoryLeadRepository, InMemoryOfferRepository};
use crate::scoring::service::LeadScoringService;

pub(super) type StubService =
    LeadScoringService<InMemoryOfferRepository, InMemoryLeadRepository, StubClassifier>;
pub(super) type FailingService =
    LeadScoringService<InMemoryOfferRepository, InMemoryLeadRepository, FailingClassifier>;
pub(super) type RecordingService =
    LeadScoringService<InMemoryOfferRepository, InMemoryLeadRepository, RecordingClassifier>;

pub(super) fn offer() -> Offer {
    Offer {
        id: OfferId("offer-000001".to_string()),
        name: "AI Outreach Automation".to_string(),
        value_props: vec!["24/7 outreach".to_string(), "6x more meetings".to_string()],
        ideal_use_cases: vec!["B2B SaaS mid-market".to_string()],
        created_at: Utc::now(),
    }
}

pub(super) fn offer_draft() -> OfferDraft {
    OfferDraft {
        name: "AI Outreach Automation".to_string(),
        value_props: vec!["24/7 outreach".to_string(), "6x more meetings".to_string()],
        ideal_use_cases: vec!["B2B SaaS mid-market".to_string()],
    }
}

pub(super) fn lead(role: &str, industry: &str) -> Lead {
    Lead {
        id: LeadId("lead-000001".to_string()),
        name: "Ava Patel".to_string(),
        role: role.to_string(),
        company: "FlowMetrics".to_string(),
        industry: industry.to_string(),
        location: "New York".to_string(),
        linkedin_bio: "Experienced growth leader.".to_string(),
        intent: None,
        score: None,
        reasoning: None,
        created_at: Utc::now(),
    }
}

pub(super) const LEADS_CSV: &str = "\
name,role,company,industry,location,linkedin_bio
Ava Patel,Head of Growth,FlowMetrics,B2B SaaS,New York,Experienced growth leader.
Rahul Mehta,Marketing Executive,AdSpark,Advertising,Delhi,Runs digital campaigns.
";

/// Classifier double returning a fixed raw response.
pub(super) struct StubClassifier {
    pub(super) response: String,
}

impl StubClassifier {
    pub(super) fn returning(response: &str) -> Self {
        Self {
            response: response.to_string(),
        }
    }
}

#[async_trait]
impl IntentClassifier for StubClassifier {
    async fn classify(
        &self,
        _offer: &Offer,
        _lead: &Lead,
        _backend: Option<LlmBackend>,
    ) -> Result<String, ClassificationError> {
        Ok(self.response.clone())
    }
}

/// Classifier double whose backend is always down.
pub(super) struct FailingClassifier;

#[async_trait]
impl IntentClassifier for FailingClassifier {
    async fn classify(
        &self,
        _offer: &Offer,
        _lead: &Lead,
        _backend: Option<LlmBackend>,
    ) -> Result<String, ClassificationError> {
        Err(ClassificationError::Backend {
            status: 503,
            body: "backend unavailable".to_string(),
        })
    }
}

/// Classifier double remembering which backend each call asked for.
#[derive(Default)]
pub(super) struct RecordingClassifier {
    pub(super) requested: Mutex<Vec<Option<LlmBackend>>>,
}

#[async_trait]
impl IntentClassifier for RecordingClassifier {
    async fn classify(
        &self,
        _offer: &Offer,
        _lead: &Lead,
        backend: Option<LlmBackend>,
    ) -> Result<String, ClassificationError> {
        self.requested
            .lock()
            .expect("recording mutex poisoned")
            .push(backend);
        Ok("{\"intent\":\"High\",\"reasoning\":\"r\"}".to_string())
    }
}

pub(super) fn stub_service(response: &str) -> Arc<StubService> {
    Arc::new(LeadScoringService::new(
        Arc::new(InMemoryOfferRepository::new()),
        Arc::new(InMemoryLeadRepository::new()),
        Arc::new(StubClassifier::returning(response)),
    ))
}

pub(super) fn failing_service() -> Arc<FailingService> {
    Arc::new(LeadScoringService::new(
        Arc::new(InMemoryOfferRepository::new()),
        Arc::new(InMemoryLeadRepository::new()),
        Arc::new(FailingClassifier),
    ))
}

pub(super) fn recording_service() -> (Arc<RecordingService>, Arc<RecordingClassifier>) {
    let classifier = Arc::new(RecordingClassifier::default());
    let service = Arc::new(LeadScoringService::new(
        Arc::new(InMemoryOfferRepository::new()),
        Arc::new(InMemoryLeadRepository::new()),
        classifier.clone(),
    ));
    (service, classifier)
}
