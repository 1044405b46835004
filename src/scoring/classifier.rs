use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::LlmConfig;

use super::domain::{Lead, Offer};
use super::pipeline::build_classification_prompt;

const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";
const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const RETRY_DELAY_MS: u64 = 500;

/// Closed set of supported classification backends, resolved once at the
/// configuration boundary instead of string-matching per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmBackend {
    OpenAi,
    Gemini,
}

impl LlmBackend {
    /// `"openai"` in any casing selects OpenAI; anything else, including an
    /// absent choice, selects the Gemini default.
    pub fn resolve(choice: Option<&str>) -> Self {
        match choice {
            Some(value) if value.trim().eq_ignore_ascii_case("openai") => Self::OpenAi,
            _ => Self::Gemini,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Gemini => "gemini",
        }
    }
}

/// Failures surfaced by the classification round trip.
#[derive(Debug, thiserror::Error)]
pub enum ClassificationError {
    #[error("no API key configured for the {0} backend")]
    MissingApiKey(&'static str),
    #[error("backend request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("backend rejected the request with status {status}: {body}")]
    Backend { status: u16, body: String },
    #[error("backend response had an unexpected shape: {0}")]
    MalformedResponse(#[source] serde_json::Error),
    #[error("backend returned an empty response")]
    EmptyResponse,
}

/// Seam between the orchestrator and the external model, substitutable with
/// a stub in tests.
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    /// One outbound call per lead; returns the backend's raw text. A `Some`
    /// backend overrides the configured default for this call only.
    async fn classify(
        &self,
        offer: &Offer,
        lead: &Lead,
        backend: Option<LlmBackend>,
    ) -> Result<String, ClassificationError>;
}

/// The payload shapes backends hand back for message content.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
    Other(Value),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ContentBlock {
    Tagged { text: String },
    Other(Value),
}

impl MessageContent {
    /// Collapse the heterogeneous payload into one plain string before it
    /// reaches the verdict parser: plain text as-is, blocks joined with
    /// single spaces, anything else via its JSON representation.
    pub fn into_text(self) -> String {
        match self {
            MessageContent::Text(text) => text,
            MessageContent::Blocks(blocks) => blocks
                .into_iter()
                .map(ContentBlock::into_text)
                .collect::<Vec<_>>()
                .join(" "),
            MessageContent::Other(value) => value.to_string(),
        }
    }
}

impl ContentBlock {
    fn into_text(self) -> String {
        match self {
            ContentBlock::Tagged { text } => text,
            ContentBlock::Other(value) => value.to_string(),
        }
    }
}

/// Classifier backed by a real LLM provider over HTTP.
pub struct LlmClassifier {
    http: reqwest::Client,
    config: LlmConfig,
}

impl LlmClassifier {
    pub fn new(config: LlmConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    async fn classify_openai(&self, prompt: &str) -> Result<String, ClassificationError> {
        let api_key = self
            .config
            .openai_api_key
            .as_deref()
            .ok_or(ClassificationError::MissingApiKey("openai"))?;

        let body = ChatCompletionRequest {
            model: &self.config.openai_model,
            messages: vec![ChatMessageRequest {
                role: "user",
                content: prompt,
            }],
            temperature: 0.0,
        };

        let payload = self
            .send_with_retry(|| {
                self.http
                    .post(OPENAI_CHAT_URL)
                    .bearer_auth(api_key)
                    .json(&body)
            })
            .await?;
        let response: ChatCompletionResponse = decode_payload(payload)?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or(ClassificationError::EmptyResponse)?;
        Ok(choice.message.content.into_text())
    }

    async fn classify_gemini(&self, prompt: &str) -> Result<String, ClassificationError> {
        let api_key = self
            .config
            .gemini_api_key
            .as_deref()
            .ok_or(ClassificationError::MissingApiKey("gemini"))?;

        let url = format!(
            "{GEMINI_BASE_URL}/{model}:generateContent",
            model = self.config.gemini_model
        );

        let body = GenerateContentRequest {
            contents: vec![GeminiContentRequest {
                parts: vec![GeminiPartRequest { text: prompt }],
            }],
            generation_config: GenerationConfig { temperature: 0.6 },
        };

        let payload = self
            .send_with_retry(|| self.http.post(&url).query(&[("key", api_key)]).json(&body))
            .await?;
        let response: GenerateContentResponse = decode_payload(payload)?;

        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or(ClassificationError::EmptyResponse)?;
        Ok(MessageContent::Blocks(candidate.content.parts).into_text())
    }

    /// Issue the request with a small bounded retry budget. Transport errors
    /// and retryable statuses (429 and 5xx) are retried after a short delay;
    /// other rejections surface immediately.
    async fn send_with_retry<F>(&self, build_request: F) -> Result<Value, ClassificationError>
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        let attempts = self.config.max_retries + 1;
        let mut last_error = ClassificationError::EmptyResponse;

        for attempt in 1..=attempts {
            match build_request().send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response.json::<Value>().await?);
                    }

                    let body = response.text().await.unwrap_or_default();
                    let error = ClassificationError::Backend {
                        status: status.as_u16(),
                        body,
                    };
                    let retryable =
                        status.as_u16() == 429 || status.is_server_error();
                    if !retryable {
                        return Err(error);
                    }
                    warn!(status = status.as_u16(), attempt, "backend rejected request, retrying");
                    last_error = error;
                }
                Err(err) => {
                    warn!(%err, attempt, "backend request failed, retrying");
                    last_error = ClassificationError::Transport(err);
                }
            }

            if attempt < attempts {
                tokio::time::sleep(Duration::from_millis(RETRY_DELAY_MS)).await;
            }
        }

        Err(last_error)
    }
}

/// Decode a successful HTTP payload into the backend's envelope type.
fn decode_payload<T: serde::de::DeserializeOwned>(
    payload: Value,
) -> Result<T, ClassificationError> {
    serde_json::from_value(payload).map_err(ClassificationError::MalformedResponse)
}

#[async_trait]
impl IntentClassifier for LlmClassifier {
    async fn classify(
        &self,
        offer: &Offer,
        lead: &Lead,
        backend: Option<LlmBackend>,
    ) -> Result<String, ClassificationError> {
        let backend = backend.unwrap_or(self.config.backend);
        let prompt = build_classification_prompt(offer, lead);
        debug!(
            backend = backend.label(),
            lead = %lead.id,
            prompt_length = prompt.len(),
            "requesting intent classification"
        );

        match backend {
            LlmBackend::OpenAi => self.classify_openai(&prompt).await,
            LlmBackend::Gemini => self.classify_gemini(&prompt).await,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessageRequest<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessageRequest<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: MessageContent,
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<GeminiContentRequest<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContentRequest<'a> {
    parts: Vec<GeminiPartRequest<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiPartRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiCandidateContent,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<ContentBlock>,
}
