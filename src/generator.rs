// deterministic campaign variant generation

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rand::Rng;

use crate::engagement;
use crate::history::CampaignStore;
use crate::models::{
    CampaignVariant, GenerationRequest, GenerationResponse, LaunchWindow, OverallInsights,
    PushNotification, VARIANT_COUNT,
};
use crate::templates;

// templates plus history, no network
#[derive(Debug, Clone)]
pub struct VariantGenerator {
    store: Arc<CampaignStore>,
}

impl VariantGenerator {
    pub fn new(store: Arc<CampaignStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &CampaignStore {
        &self.store
    }

    pub fn generate(&self, request: &GenerationRequest) -> GenerationResponse {
        let today = Utc::now().date_naive();
        self.generate_with(request, today, &mut rand::rng())
    }

    // clock and randomness injected so callers can pin both
    pub fn generate_with<R: Rng>(
        &self,
        request: &GenerationRequest,
        today: NaiveDate,
        rng: &mut R,
    ) -> GenerationResponse {
        let similar = self.store.find_similar(request);
        let top_match = similar.first().map(|c| c.campaign_name.as_str());

        // shared by all variants of one response
        let launch_window = LaunchWindow::following(today);
        let predicted_engagement = engagement::predict(&similar, request.brand_tone);

        let variants = (0..VARIANT_COUNT)
            .map(|index| {
                let campaign_name = templates::campaign_name(request, index);
                let promo_code = templates::promo_code(request, index);
                let (title, body) =
                    templates::push_notification(request, &campaign_name, &promo_code, rng);

                CampaignVariant {
                    push_notification: PushNotification { title, body },
                    offer_copy: templates::offer_copy(request, rng),
                    launch_window,
                    predicted_engagement,
                    ai_insight: templates::insight(request, top_match, index),
                    campaign_name,
                    promo_code,
                }
            })
            .collect();

        GenerationResponse {
            variants,
            overall_insights: OverallInsights {
                recommended_channels: templates::RECOMMENDED_CHANNELS
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
                best_practices: templates::best_practices(request),
                seasonal_trends: templates::seasonal_trends(request),
            },
            originating_request: request.clone(),
        }
    }
}
