// completion backends for the external copywriting model

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use rig::prelude::*;
use rig::{agent::Agent, completion::Prompt, providers::openai};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{AppConfig, ProviderKind};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

const STRATEGIST_PREAMBLE: &str = "\
    You are a campaign strategist and creative marketer for a fashion retailer. \
    You always answer with a single JSON object and nothing else.";

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("No API key configured for {0}")]
    MissingCredentials(&'static str),
    #[error("Failed to create HTTP client: {0}")]
    Client(String),
    #[error("HTTP request failed: {0}")]
    Transport(String),
    #[error("API returned error status: {0}")]
    Status(StatusCode),
    #[error("Failed to parse JSON response: {0}")]
    Decode(String),
    #[error("Model returned an empty completion")]
    EmptyCompletion,
    #[error("Agent prompt failed: {0}")]
    Agent(String),
    #[error("Model call timed out after {0:?}")]
    Timeout(Duration),
}

// one call per prompt, no retries
pub trait CompletionBackend: Send + Sync {
    fn name(&self) -> &'static str;

    fn complete(&self, prompt: &str) -> impl Future<Output = Result<String, BackendError>> + Send;
}

// gemini generateContent over plain http

#[derive(Serialize)]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
}

#[derive(Serialize)]
struct GeminiContent<'a> {
    role: &'static str,
    parts: Vec<GeminiTextPart<'a>>,
}

#[derive(Serialize)]
struct GeminiTextPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiCandidateContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Debug, Deserialize)]
struct GeminiPartResponse {
    text: Option<String>,
}

pub struct GeminiBackend {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiBackend {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        Ok(Self {
            client: create_http_client(timeout)?,
            api_key: api_key.into(),
            base_url: base_url.into(),
            model: model.into(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

impl CompletionBackend for GeminiBackend {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn complete(&self, prompt: &str) -> Result<String, BackendError> {
        let body = GeminiRequest {
            contents: vec![GeminiContent {
                role: "user",
                parts: vec![GeminiTextPart { text: prompt }],
            }],
        };

        let response = make_api_request(&self.client, &self.endpoint(), &self.api_key, &body).await?;
        let envelope = parse_api_response::<GeminiResponse>(response).await?;

        let text: String = envelope
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(BackendError::EmptyCompletion);
        }
        Ok(text)
    }
}

// openai through a rig agent

pub struct OpenAiBackend {
    agent: Agent<openai::CompletionModel>,
}

impl OpenAiBackend {
    pub fn new(api_key: &str, model: &str) -> Self {
        let client = openai::Client::new(api_key);
        let agent = client
            .agent(model)
            .preamble(STRATEGIST_PREAMBLE)
            .max_tokens(2048)
            .temperature(0.7)
            .build();
        Self { agent }
    }
}

impl CompletionBackend for OpenAiBackend {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn complete(&self, prompt: &str) -> Result<String, BackendError> {
        let reply = self
            .agent
            .prompt(prompt)
            .await
            .map_err(|e| BackendError::Agent(e.to_string()))?;

        if reply.trim().is_empty() {
            return Err(BackendError::EmptyCompletion);
        }
        Ok(reply)
    }
}

pub enum Provider {
    Gemini(GeminiBackend),
    OpenAi(OpenAiBackend),
}

impl Provider {
    pub fn from_config(config: &AppConfig) -> Result<Self, BackendError> {
        let api_key = config
            .api_key
            .as_deref()
            .ok_or(BackendError::MissingCredentials(config.provider.api_key_name()))?;

        let provider = match config.provider {
            ProviderKind::Gemini => {
                let model = config.model.as_deref().unwrap_or(DEFAULT_GEMINI_MODEL);
                Provider::Gemini(GeminiBackend::new(
                    api_key,
                    config.gemini_api_url.as_str(),
                    model,
                    config.timeout,
                )?)
            }
            ProviderKind::OpenAi => {
                let model = config.model.as_deref().unwrap_or(openai::GPT_4O);
                Provider::OpenAi(OpenAiBackend::new(api_key, model))
            }
        };

        info!("Configured {} completion backend", provider.name());
        Ok(provider)
    }
}

impl CompletionBackend for Provider {
    fn name(&self) -> &'static str {
        match self {
            Provider::Gemini(backend) => backend.name(),
            Provider::OpenAi(backend) => backend.name(),
        }
    }

    async fn complete(&self, prompt: &str) -> Result<String, BackendError> {
        match self {
            Provider::Gemini(backend) => backend.complete(prompt).await,
            Provider::OpenAi(backend) => backend.complete(prompt).await,
        }
    }
}

// helper functions
fn create_http_client(timeout: Duration) -> Result<Client, BackendError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| BackendError::Client(e.to_string()))
}

async fn make_api_request<B: Serialize + ?Sized>(
    client: &Client,
    url: &str,
    api_key: &str,
    body: &B,
) -> Result<reqwest::Response, BackendError> {
    let response = client
        .post(url)
        .header("x-goog-api-key", api_key)
        .json(body)
        .send()
        .await
        .map_err(|e| BackendError::Transport(e.to_string()))?;

    if !response.status().is_success() {
        return Err(BackendError::Status(response.status()));
    }

    Ok(response)
}

async fn parse_api_response<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T, BackendError> {
    response
        .json()
        .await
        .map_err(|e| BackendError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    const PATH: &str = "/v1beta/models/gemini-2.0-flash:generateContent";

    fn backend(url: &str) -> GeminiBackend {
        GeminiBackend::new("test-key", url, DEFAULT_GEMINI_MODEL, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn gemini_returns_joined_candidate_text() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", PATH)
            .match_header("x-goog-api-key", "test-key")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "contents": [{"role": "user", "parts": [{"text": "write copy"}]}]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"candidates":[{"content":{"parts":[{"text":"{\"variants\":"},{"text":"[]}"}]}}]}"#)
            .create_async()
            .await;

        let text = backend(&server.url()).complete("write copy").await.unwrap();

        assert_eq!(text, "{\"variants\":[]}");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn gemini_surfaces_error_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", PATH)
            .with_status(503)
            .with_body("overloaded")
            .create_async()
            .await;

        let err = backend(&server.url()).complete("write copy").await.unwrap_err();

        assert!(matches!(err, BackendError::Status(status) if status == StatusCode::SERVICE_UNAVAILABLE));
    }

    #[tokio::test]
    async fn gemini_rejects_malformed_envelope() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", PATH)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("not json at all")
            .create_async()
            .await;

        let err = backend(&server.url()).complete("write copy").await.unwrap_err();

        assert!(matches!(err, BackendError::Decode(_)));
    }

    #[tokio::test]
    async fn gemini_treats_missing_candidates_as_empty() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", PATH)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"candidates": []}"#)
            .create_async()
            .await;

        let err = backend(&server.url()).complete("write copy").await.unwrap_err();

        assert!(matches!(err, BackendError::EmptyCompletion));
    }

    #[test]
    fn endpoint_tolerates_trailing_slash() {
        let backend = backend("http://localhost:9999/");
        assert_eq!(
            backend.endpoint(),
            "http://localhost:9999/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn provider_requires_credentials() {
        let config = AppConfig::from_lookup(|_| None);
        let err = Provider::from_config(&config).err().unwrap();

        assert!(matches!(err, BackendError::MissingCredentials("GEMINI_API_KEY")));
    }

    #[test]
    fn provider_builds_gemini_backend() {
        let config = AppConfig::from_lookup(|key| match key {
            "GEMINI_API_KEY" => Some("abc".to_string()),
            "CAMPAIGN_AI_MODEL" => Some("gemini-1.5-pro".to_string()),
            _ => None,
        });

        let provider = Provider::from_config(&config).unwrap();
        assert_eq!(provider.name(), "gemini");
        match provider {
            Provider::Gemini(backend) => assert!(backend.endpoint().ends_with("gemini-1.5-pro:generateContent")),
            Provider::OpenAi(_) => panic!("expected gemini backend"),
        }
    }
}
