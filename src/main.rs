use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use clap::{Args, Parser, Subcommand};
use lead_scoring::config::AppConfig;
use lead_scoring::error::AppError;
use lead_scoring::scoring::classifier::{ClassificationError, IntentClassifier, LlmBackend};
use lead_scoring::scoring::domain::{Lead, NewLead, Offer, OfferDraft};
use lead_scoring::scoring::pipeline::rule_points;
use lead_scoring::scoring::repository::{InMemoryLeadRepository, InMemoryOfferRepository};
use lead_scoring::scoring::{scoring_router, LeadScoringService, LlmClassifier};
use lead_scoring::telemetry;
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use tracing::info;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "Lead Scoring Service",
    about = "Score sales leads by combining rule heuristics with LLM intent classification",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Seed sample data and run the pipeline offline with a canned classifier
    Demo,
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Demo => run_demo().await,
    }
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let offers = Arc::new(InMemoryOfferRepository::new());
    let leads = Arc::new(InMemoryLeadRepository::new());
    let classifier = Arc::new(LlmClassifier::new(config.llm.clone()));
    let service = Arc::new(LeadScoringService::new(offers, leads, classifier));

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
        .merge(scoring_router(service))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        backend = config.llm.backend.label(),
        "lead scoring service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

/// Offline stand-in for the LLM backends so the demo runs without network
/// access or API keys. The verdict is derived from the rule bands.
struct CannedClassifier;

#[async_trait]
impl IntentClassifier for CannedClassifier {
    async fn classify(
        &self,
        offer: &Offer,
        lead: &Lead,
        _backend: Option<LlmBackend>,
    ) -> Result<String, ClassificationError> {
        let points = rule_points(lead, offer);
        let (intent, reasoning) = if points >= 40 {
            (
                "High",
                "Senior decision-maker in an industry matching the offer's ideal use cases.",
            )
        } else if points >= 20 {
            (
                "Medium",
                "Partial fit between the lead profile and the offer.",
            )
        } else {
            ("Low", "Little overlap between the lead profile and the offer.")
        };

        Ok(json!({ "intent": intent, "reasoning": reasoning }).to_string())
    }
}

fn sample_offer() -> OfferDraft {
    OfferDraft {
        name: "AI Outreach Automation".to_string(),
        value_props: vec!["24/7 outreach".to_string(), "6x more meetings".to_string()],
        ideal_use_cases: vec!["B2B SaaS mid-market".to_string()],
    }
}

fn sample_leads() -> Vec<NewLead> {
    vec![
        NewLead::new(
            "Ava Patel",
            "Head of Growth",
            "FlowMetrics",
            "B2B SaaS",
            "New York",
            "Experienced growth leader scaling mid-market SaaS products.",
        ),
        NewLead::new(
            "Rahul Mehta",
            "Marketing Executive",
            "AdSpark",
            "Advertising",
            "Delhi",
            "Focused on digital campaigns for consumer brands.",
        ),
        NewLead::new(
            "Sophia Zhang",
            "CTO",
            "DataLytix",
            "B2B SaaS",
            "San Francisco",
            "Driving AI adoption for SaaS automation tools.",
        ),
        NewLead::new(
            "Lucas Silva",
            "Sales Associate",
            "CloudEdge",
            "Cloud Computing",
            "São Paulo",
            "Helping enterprises adopt cloud infrastructure.",
        ),
    ]
}

async fn run_demo() -> Result<(), AppError> {
    let offers = Arc::new(InMemoryOfferRepository::new());
    let leads = Arc::new(InMemoryLeadRepository::new());
    let service = Arc::new(LeadScoringService::new(
        offers,
        leads,
        Arc::new(CannedClassifier),
    ));

    let offer = service
        .create_offer(sample_offer())
        .map_err(demo_error)?;
    service.upload_leads(&demo_csv()).map_err(demo_error)?;

    let scored = service.run_scoring(None).await.map_err(demo_error)?;

    println!("Lead scoring demo");
    println!(
        "Offer: {} (ideal use cases: {})",
        offer.name,
        offer.ideal_use_cases.join(", ")
    );
    println!();
    for lead in &scored {
        let intent = lead.intent.map(|i| i.label()).unwrap_or("-");
        let score = lead.score.unwrap_or(0);
        println!(
            "- {:<14} {:<20} {:>3}  {:<6} {}",
            lead.name,
            lead.role,
            score,
            intent,
            lead.reasoning.as_deref().unwrap_or("")
        );
    }

    Ok(())
}

fn demo_error(err: impl std::fmt::Display) -> AppError {
    AppError::Io(std::io::Error::other(err.to_string()))
}

fn demo_csv() -> String {
    let mut csv = String::from("name,role,company,industry,location,linkedin_bio\n");
    for lead in sample_leads() {
        csv.push_str(&format!(
            "{},{},{},{},{},{}\n",
            lead.name, lead.role, lead.company, lead.industry, lead.location, lead.linkedin_bio
        ));
    }
    csv
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "success": true, "message": "Health check done!" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
