// prompt for the external copywriting model

use serde::Serialize;

use crate::models::{CampaignPerformance, ChannelCopy, GenerationRequest, HistoricalCampaign};

const RESPONSE_SHAPE: &str = r#"{
  "variants": [
    {
      "campaignName": "...",
      "promoCode": "...",
      "pushNotification": {
        "title": "...",
        "body": "..."
      },
      "offerCopy": "...",
      "launchWindow": {
        "startDate": "YYYY-MM-DD",
        "endDate": "YYYY-MM-DD"
      },
      "predictedEngagement": {
        "openRate": "XX%",
        "clickThroughRate": "X.X%",
        "estimatedOrders": 150
      },
      "aiInsight": "..."
    }
  ],
  "overallInsights": {
    "recommendedChannels": ["push", "email", "social"],
    "bestPractices": ["..."],
    "seasonalTrends": ["..."]
  }
}"#;

// the slice of a historical record worth spending tokens on
#[derive(Serialize)]
struct HistoricalReference<'a> {
    name: &'a str,
    offers: &'a [String],
    performance: &'a CampaignPerformance,
    channels: &'a ChannelCopy,
}

pub fn build_prompt(
    request: &GenerationRequest,
    similar: &[&HistoricalCampaign],
) -> Result<String, serde_json::Error> {
    let historical_data = if similar.is_empty() {
        "No similar campaigns found".to_string()
    } else {
        let references: Vec<HistoricalReference> = similar
            .iter()
            .map(|campaign| HistoricalReference {
                name: &campaign.campaign_name,
                offers: &campaign.offers,
                performance: &campaign.performance,
                channels: &campaign.channel_copy,
            })
            .collect();
        serde_json::to_string_pretty(&references)?
    };

    let tone = request.brand_tone;
    let suggestion = request
        .campaign_suggestion
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("Not specified");

    Ok(format!(
        "You're a campaign strategist and creative marketer with access to historical campaign data.\n\n\
         **Campaign Input:**\n\
         - Campaign Type: {campaign_type}\n\
         - Campaign Suggestion: {suggestion}\n\
         - Discount: {discount}\n\
         - Product: {product}\n\
         - Brand Tone: {tone}\n\n\
         **Historical Campaign Data for Reference:**\n\
         {historical_data}\n\n\
         **Instructions:**\n\
         1. Use the historical campaign data to find the 2-3 most relevant campaigns based on:\n   \
            - Matching type\n   \
            - Similar tone\n   \
            - Similar offer structure or category theme\n\n\
         2. Based on insights from those campaigns, generate 3 distinct campaign variants with:\n   \
            - Campaign name (max 5 words, {tone} tone)\n   \
            - Promo code (memorable, related to product/offer)\n   \
            - Push notification (title + body, engaging and {tone})\n   \
            - Offer copy (emotional/visual hook, {tone} tone)\n   \
            - Launch window suggestions (start & end date)\n   \
            - Predicted engagement based on historical similarity\n   \
            - AI insight (1-2 sentences on naming, emotional appeal, or success factors)\n\n\
         **Output Format (JSON):**\n\
         {shape}\n\n\
         Generate exactly 3 variants. Respond with a single JSON object only. \
         Focus on data-driven insights from the historical campaigns.",
        campaign_type = request.campaign_type,
        suggestion = suggestion,
        discount = request.discount.trim(),
        product = request.product.trim(),
        tone = tone,
        historical_data = historical_data,
        shape = RESPONSE_SHAPE,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::CampaignStore;
    use crate::models::{BrandTone, CampaignType};

    #[test]
    fn embeds_request_fields_and_matches() {
        let store = CampaignStore::builtin().unwrap();
        let mut request = GenerationRequest::new(CampaignType::Sale, "25% off", "Skincare", BrandTone::Bold);
        request.campaign_suggestion = Some("Summer glow".to_string());
        let similar = store.find_similar(&request);

        let prompt = build_prompt(&request, &similar).unwrap();

        assert!(prompt.contains("- Campaign Type: sale"));
        assert!(prompt.contains("- Campaign Suggestion: Summer glow"));
        assert!(prompt.contains("- Discount: 25% off"));
        assert!(prompt.contains("- Brand Tone: bold"));
        assert!(prompt.contains("\"name\": \"Purple Days Sale 2024\""));
        assert!(prompt.contains("\"openRatePercent\": 41.0"));
        assert!(prompt.contains("Generate exactly 3 variants."));
        assert!(prompt.contains("\"recommendedChannels\""));
    }

    #[test]
    fn notes_missing_history_and_suggestion() {
        let request = GenerationRequest::new(CampaignType::Loyalty, "BOGO deal", "Sneakers", BrandTone::Quirky);

        let prompt = build_prompt(&request, &[]).unwrap();

        assert!(prompt.contains("No similar campaigns found"));
        assert!(prompt.contains("- Campaign Suggestion: Not specified"));
        assert!(prompt.contains("(max 5 words, quirky tone)"));
    }
}
