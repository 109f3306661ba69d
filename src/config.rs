// runtime configuration from secrets with env fallback

use std::time::Duration;

use shuttle_runtime::SecretStore;
use tracing::warn;

pub const DEFAULT_GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Gemini,
    OpenAi,
}

impl ProviderKind {
    fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "gemini" => Some(ProviderKind::Gemini),
            "openai" => Some(ProviderKind::OpenAi),
            _ => None,
        }
    }

    pub fn api_key_name(self) -> &'static str {
        match self {
            ProviderKind::Gemini => "GEMINI_API_KEY",
            ProviderKind::OpenAi => "OPENAI_API_KEY",
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub provider: ProviderKind,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub gemini_api_url: String,
    pub timeout: Duration,
}

impl AppConfig {
    // secret store first, process env second
    pub fn from_secrets(secret_store: &SecretStore) -> Self {
        Self::from_lookup(|key| secret_store.get(key).or_else(|| std::env::var(key).ok()))
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let provider = match value("CAMPAIGN_AI_PROVIDER") {
            None => ProviderKind::Gemini,
            Some(name) => ProviderKind::parse(&name).unwrap_or_else(|| {
                warn!("Unknown CAMPAIGN_AI_PROVIDER '{}', using gemini", name);
                ProviderKind::Gemini
            }),
        };

        let timeout_seconds = value("API_TIMEOUT_SECONDS")
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|&secs| secs > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECONDS);

        Self {
            provider,
            api_key: value(provider.api_key_name()),
            model: value("CAMPAIGN_AI_MODEL"),
            gemini_api_url: value("GEMINI_API_URL")
                .unwrap_or_else(|| DEFAULT_GEMINI_API_URL.to_string()),
            timeout: Duration::from_secs(timeout_seconds),
        }
    }
}
