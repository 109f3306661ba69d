// external model generation with deterministic fallback

use std::time::Duration;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};

use crate::generator::VariantGenerator;
use crate::models::{GenerationRequest, GenerationResponse};
use crate::parsing::{interpret_reply, ReplyOutcome};
use crate::prompt::build_prompt;
use crate::providers::{BackendError, CompletionBackend, Provider};

// why a request ended on the deterministic path
#[derive(Debug, thiserror::Error)]
pub enum FallbackReason {
    #[error("no completion backend configured")]
    Unconfigured,
    #[error("failed to build prompt: {0}")]
    Prompt(#[from] serde_json::Error),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("model reply had no usable variants")]
    Unusable,
}

// external model first, deterministic generator on any failure
pub struct CampaignAssistant<B = Provider> {
    generator: VariantGenerator,
    backend: Option<B>,
    timeout: Duration,
}

impl<B: CompletionBackend> CampaignAssistant<B> {
    pub fn new(generator: VariantGenerator, backend: Option<B>, timeout: Duration) -> Self {
        // a missing backend is reported by whoever failed to build it
        if let Some(backend) = &backend {
            info!("Campaign generation will use the {} model", backend.name());
        }

        Self {
            generator,
            backend,
            timeout,
        }
    }

    pub fn generator(&self) -> &VariantGenerator {
        &self.generator
    }

    pub async fn generate_campaigns(&self, request: &GenerationRequest) -> GenerationResponse {
        let today = Utc::now().date_naive();
        let fallback = self.generator.generate_with(request, today, &mut rand::rng());

        match self.try_external(request, today, &fallback).await {
            Ok(response) => response,
            Err(FallbackReason::Unconfigured) => {
                debug!("Using template campaigns: no completion backend");
                fallback
            }
            Err(reason) => {
                warn!("Using template campaigns: {}", reason);
                fallback
            }
        }
    }

    async fn try_external(
        &self,
        request: &GenerationRequest,
        today: NaiveDate,
        fallback: &GenerationResponse,
    ) -> Result<GenerationResponse, FallbackReason> {
        let backend = self.backend.as_ref().ok_or(FallbackReason::Unconfigured)?;

        let similar = self.generator.store().find_similar(request);
        let prompt = build_prompt(request, &similar)?;

        info!("Sending campaign prompt to {}", backend.name());
        let raw = tokio::time::timeout(self.timeout, backend.complete(&prompt))
            .await
            .map_err(|_| BackendError::Timeout(self.timeout))??;
        debug!("Model reply: {}", raw);

        let reply = match interpret_reply(&raw) {
            ReplyOutcome::Parsed(reply) => {
                info!("Model reply parsed with {} variants", reply.variants.len());
                reply
            }
            ReplyOutcome::Salvaged(reply) => {
                info!("Model reply salvaged from labeled lines");
                reply
            }
            ReplyOutcome::Unusable => return Err(FallbackReason::Unusable),
        };

        reply
            .into_response(fallback, today)
            .ok_or(FallbackReason::Unusable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::CampaignStore;
    use crate::models::{BrandTone, CampaignType, VARIANT_COUNT};
    use std::sync::Arc;

    enum Script {
        Reply(String),
        Fail,
        Stall,
    }

    struct ScriptedBackend(Script);

    impl CompletionBackend for ScriptedBackend {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn complete(&self, _prompt: &str) -> Result<String, BackendError> {
            match &self.0 {
                Script::Reply(text) => Ok(text.clone()),
                Script::Fail => Err(BackendError::Transport("connection refused".to_string())),
                Script::Stall => {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    Ok("{}".to_string())
                }
            }
        }
    }

    fn request() -> GenerationRequest {
        GenerationRequest::new(CampaignType::Sale, "25% off", "Skincare", BrandTone::Bold)
    }

    fn generator() -> VariantGenerator {
        VariantGenerator::new(Arc::new(CampaignStore::builtin().unwrap()))
    }

    fn assistant(script: Script) -> CampaignAssistant<ScriptedBackend> {
        CampaignAssistant::new(generator(), Some(ScriptedBackend(script)), Duration::from_millis(200))
    }

    // shape of a pure template response: names, codes and shared metrics
    fn assert_template_response(response: &GenerationResponse) {
        let expected = generator().generate(&request());

        assert_eq!(response.variants.len(), VARIANT_COUNT);
        for (actual, wanted) in response.variants.iter().zip(&expected.variants) {
            assert_eq!(actual.campaign_name, wanted.campaign_name);
            assert_eq!(actual.promo_code, wanted.promo_code);
            assert_eq!(actual.predicted_engagement, wanted.predicted_engagement);
            assert_eq!(actual.launch_window, wanted.launch_window);
            assert!(!actual.push_notification.title.is_empty());
            assert!(!actual.offer_copy.is_empty());
        }
        assert_eq!(response.overall_insights, expected.overall_insights);
        assert_eq!(response.originating_request, request());
    }

    #[test]
    fn unconfigured_backend_uses_templates() {
        let assistant: CampaignAssistant<ScriptedBackend> =
            CampaignAssistant::new(generator(), None, Duration::from_secs(1));

        let response = tokio_test::block_on(assistant.generate_campaigns(&request()));

        assert_template_response(&response);
    }

    #[tokio::test]
    async fn network_error_uses_templates() {
        let response = assistant(Script::Fail).generate_campaigns(&request()).await;
        assert_template_response(&response);
    }

    #[tokio::test]
    async fn malformed_json_uses_templates() {
        let raw = "{\"variants\": [ {\"campaignName\": \"Glow\", ".to_string();
        let response = assistant(Script::Reply(raw)).generate_campaigns(&request()).await;
        assert_template_response(&response);
    }

    #[tokio::test]
    async fn empty_variants_use_templates() {
        let raw = "{\"variants\": [], \"overallInsights\": {}}".to_string();
        let response = assistant(Script::Reply(raw)).generate_campaigns(&request()).await;
        assert_template_response(&response);
    }

    #[tokio::test]
    async fn slow_backend_times_out_to_templates() {
        let response = assistant(Script::Stall).generate_campaigns(&request()).await;
        assert_template_response(&response);
    }

    #[tokio::test]
    async fn parsed_reply_is_used() {
        let raw = serde_json::json!({
            "variants": [
                {"campaignName": "Glow Week", "promoCode": "GLOW25"},
                {"campaignName": "Radiant Days", "promoCode": "RAD25"},
                {"campaignName": "Skin Fest", "promoCode": "FEST25"},
                {"campaignName": "Extra", "promoCode": "EXTRA"}
            ],
            "overallInsights": {
                "recommendedChannels": ["push", "email"],
                "bestPractices": ["Lead with glow"],
                "seasonalTrends": ["Summer peaks"]
            }
        })
        .to_string();

        let response = assistant(Script::Reply(format!("Here you go!\n{}", raw)))
            .generate_campaigns(&request())
            .await;

        let names: Vec<_> = response.variants.iter().map(|v| v.campaign_name.as_str()).collect();
        assert_eq!(names, vec!["Glow Week", "Radiant Days", "Skin Fest"]);
        assert_eq!(response.overall_insights.best_practices, vec!["Lead with glow"]);
        assert_eq!(response.originating_request, request());
    }

    #[tokio::test]
    async fn salvaged_reply_is_padded() {
        let raw = "Campaign Name: Glow Week\nPromo Code: GLOW25\nPush Message: Glow up - 25% off skincare".to_string();

        let response = assistant(Script::Reply(raw)).generate_campaigns(&request()).await;

        assert_eq!(response.variants.len(), VARIANT_COUNT);
        assert_eq!(response.variants[0].campaign_name, "Glow Week");
        assert_eq!(response.variants[0].push_notification.title, "Glow up");
        assert_eq!(response.variants[0].predicted_engagement.estimated_orders, 150);
        assert_eq!(response.variants[1].promo_code, "SAVE25SK");
        assert_eq!(response.overall_insights.recommended_channels, vec!["push", "email", "social"]);
    }
}
