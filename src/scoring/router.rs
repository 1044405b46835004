use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use super::classifier::{IntentClassifier, LlmBackend};
use super::domain::{Intent, OfferDraft};
use super::repository::{LeadRepository, OfferRepository, ResultsFilter};
use super::service::{
    CreateOfferError, ExportServiceError, LeadScoringService, ScoringError, UploadError,
};

/// Router builder exposing the lead-scoring HTTP API.
pub fn scoring_router<O, L, C>(service: Arc<LeadScoringService<O, L, C>>) -> Router
where
    O: OfferRepository + 'static,
    L: LeadRepository + 'static,
    C: IntentClassifier + 'static,
{
    Router::new()
        .route("/api/v1/offer", post(create_offer_handler::<O, L, C>))
        .route("/api/v1/leads/upload", post(upload_leads_handler::<O, L, C>))
        .route("/api/v1/score", post(score_handler::<O, L, C>))
        .route("/api/v1/results", get(results_handler::<O, L, C>))
        .route("/api/v1/results/export", get(export_handler::<O, L, C>))
        .with_state(service)
}

pub(crate) async fn create_offer_handler<O, L, C>(
    State(service): State<Arc<LeadScoringService<O, L, C>>>,
    axum::Json(draft): axum::Json<OfferDraft>,
) -> Response
where
    O: OfferRepository + 'static,
    L: LeadRepository + 'static,
    C: IntentClassifier + 'static,
{
    match service.create_offer(draft) {
        Ok(offer) => {
            let payload = json!({
                "message": "Offer created successfully",
                "offer": offer,
            });
            (StatusCode::CREATED, axum::Json(payload)).into_response()
        }
        Err(CreateOfferError::Validation(error)) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn upload_leads_handler<O, L, C>(
    State(service): State<Arc<LeadScoringService<O, L, C>>>,
    body: String,
) -> Response
where
    O: OfferRepository + 'static,
    L: LeadRepository + 'static,
    C: IntentClassifier + 'static,
{
    match service.upload_leads(&body) {
        Ok((parsed, inserted)) => {
            let payload = json!({
                "message": format!("Uploaded {parsed} rows"),
                "inserted": inserted,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(UploadError::Ingest(error)) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
        Err(other) => internal_error(other),
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ScoreRequest {
    #[serde(default)]
    llm_client: Option<String>,
}

pub(crate) async fn score_handler<O, L, C>(
    State(service): State<Arc<LeadScoringService<O, L, C>>>,
    payload: Option<axum::Json<ScoreRequest>>,
) -> Response
where
    O: OfferRepository + 'static,
    L: LeadRepository + 'static,
    C: IntentClassifier + 'static,
{
    // An absent choice leaves the classifier on its configured backend; any
    // supplied label resolves per request, with Gemini as the default.
    let requested = payload.and_then(|axum::Json(req)| req.llm_client);
    let backend = requested
        .as_deref()
        .map(|value| LlmBackend::resolve(Some(value)));
    info!(
        backend = backend.map(LlmBackend::label).unwrap_or("configured"),
        "scoring run requested"
    );

    match service.run_scoring(backend).await {
        Ok(results) => {
            let payload = json!({
                "message": "Leads scored successfully",
                "results": results,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error @ (ScoringError::NoOfferConfigured | ScoringError::NoUnscoredLeads)) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
        Err(other) => internal_error(other),
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ResultsQuery {
    intent: Option<String>,
    min_score: Option<String>,
    limit: Option<String>,
}

impl ResultsQuery {
    /// Lenient translation into a filter: unparseable values are ignored
    /// rather than rejected, matching the permissive listing behavior.
    fn into_filter(self) -> ResultsFilter {
        let intent = self.intent.as_deref().and_then(Intent::parse);
        let min_score = self.min_score.as_deref().and_then(|v| v.trim().parse().ok());
        let limit = self.limit.as_deref().and_then(|v| v.trim().parse().ok());
        ResultsFilter {
            intent,
            min_score,
            limit,
        }
    }
}

pub(crate) async fn results_handler<O, L, C>(
    State(service): State<Arc<LeadScoringService<O, L, C>>>,
    Query(query): Query<ResultsQuery>,
) -> Response
where
    O: OfferRepository + 'static,
    L: LeadRepository + 'static,
    C: IntentClassifier + 'static,
{
    let filter = query.into_filter();
    match service.results(&filter) {
        Ok(results) => {
            let payload = json!({
                "message": "Results fetched successfully.",
                "filters": {
                    "intent": filter.intent.map(Intent::label),
                    "min_score": filter.min_score,
                    "limit": filter.limit,
                },
                "count": results.len(),
                "results": results,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => internal_error(error),
    }
}

pub(crate) async fn export_handler<O, L, C>(
    State(service): State<Arc<LeadScoringService<O, L, C>>>,
) -> Response
where
    O: OfferRepository + 'static,
    L: LeadRepository + 'static,
    C: IntentClassifier + 'static,
{
    match service.export_results() {
        Ok(csv) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"scored_leads.csv\"",
                ),
            ],
            csv,
        )
            .into_response(),
        Err(ExportServiceError::NoLeads) => {
            let payload = json!({ "message": "No leads found to export" });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(other) => internal_error(other),
    }
}

fn internal_error(error: impl std::fmt::Display) -> Response {
    warn!(%error, "request failed");
    let payload = json!({ "error": error.to_string() });
    (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
}
