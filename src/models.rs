// data models for campaign generation

use std::fmt;

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// every response carries exactly this many variants
pub const VARIANT_COUNT: usize = 3;

// launch windows start tomorrow and run for a week
const LAUNCH_DELAY_DAYS: u64 = 1;
const LAUNCH_LENGTH_DAYS: u64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CampaignType {
    Sale,
    NewLaunch,
    Festive,
    Clearance,
    Loyalty,
}

impl CampaignType {
    pub fn as_str(self) -> &'static str {
        match self {
            CampaignType::Sale => "sale",
            CampaignType::NewLaunch => "newLaunch",
            CampaignType::Festive => "festive",
            CampaignType::Clearance => "clearance",
            CampaignType::Loyalty => "loyalty",
        }
    }
}

impl fmt::Display for CampaignType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrandTone {
    #[default]
    Fun,
    Elegant,
    Quirky,
    Bold,
    Premium,
}

impl BrandTone {
    pub fn as_str(self) -> &'static str {
        match self {
            BrandTone::Fun => "fun",
            BrandTone::Elegant => "elegant",
            BrandTone::Quirky => "quirky",
            BrandTone::Bold => "bold",
            BrandTone::Premium => "premium",
        }
    }
}

impl fmt::Display for BrandTone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub campaign_type: CampaignType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campaign_suggestion: Option<String>,
    #[serde(default)]
    pub discount: String,
    #[serde(default)]
    pub product: String,
    #[serde(default)]
    pub brand_tone: BrandTone,
}

impl GenerationRequest {
    // reject incomplete input before any generation work
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.product.trim().is_empty() {
            return Err(RequestError::MissingField("product"));
        }
        if self.discount.trim().is_empty() {
            return Err(RequestError::MissingField("discount"));
        }
        Ok(())
    }
}

#[cfg(test)]
impl GenerationRequest {
    pub fn new(
        campaign_type: CampaignType,
        discount: impl Into<String>,
        product: impl Into<String>,
        brand_tone: BrandTone,
    ) -> Self {
        Self {
            campaign_type,
            campaign_suggestion: None,
            discount: discount.into(),
            product: product.into(),
            brand_tone,
        }
    }
}

// historical dataset records

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalCampaign {
    pub campaign_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub description: String,
    pub offers: Vec<String>,
    pub creative_assets: CreativeAssets,
    pub channel_copy: ChannelCopy,
    pub performance: CampaignPerformance,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreativeAssets {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
    pub banner_image: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelCopy {
    pub push: PushCopy,
    pub email: EmailCopy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushCopy {
    pub title: String,
    pub body: String,
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailCopy {
    pub subject: String,
    pub preheader: String,
    pub body_snippet: String,
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignPerformance {
    pub open_rate_percent: f64,
    pub click_through_rate_percent: f64,
    pub order_count: u64,
    pub revenue: u64,
}

// generated output

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PushNotification {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchWindow {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl LaunchWindow {
    // tomorrow through a week after tomorrow
    pub fn following(today: NaiveDate) -> Self {
        let start_date = today + Days::new(LAUNCH_DELAY_DAYS);
        Self {
            start_date,
            end_date: start_date + Days::new(LAUNCH_LENGTH_DAYS),
        }
    }

    pub fn is_valid_after(&self, today: NaiveDate) -> bool {
        self.start_date > today && self.end_date > self.start_date
    }
}

// rates carry the % suffix only on the wire
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictedEngagement {
    #[serde(
        rename = "openRate",
        serialize_with = "percent::serialize_whole",
        deserialize_with = "percent::deserialize"
    )]
    pub open_rate_percent: f64,
    #[serde(
        rename = "clickThroughRate",
        serialize_with = "percent::serialize_tenths",
        deserialize_with = "percent::deserialize"
    )]
    pub click_through_rate_percent: f64,
    pub estimated_orders: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignVariant {
    pub campaign_name: String,
    pub promo_code: String,
    pub push_notification: PushNotification,
    pub offer_copy: String,
    pub launch_window: LaunchWindow,
    pub predicted_engagement: PredictedEngagement,
    pub ai_insight: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallInsights {
    #[serde(default)]
    pub recommended_channels: Vec<String>,
    #[serde(default)]
    pub best_practices: Vec<String>,
    #[serde(default)]
    pub seasonal_trends: Vec<String>,
}

impl OverallInsights {
    pub fn from_static(channels: &[&str], best_practices: &[&str], seasonal_trends: &[&str]) -> Self {
        let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Self {
            recommended_channels: owned(channels),
            best_practices: owned(best_practices),
            seasonal_trends: owned(seasonal_trends),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResponse {
    pub variants: Vec<CampaignVariant>,
    pub overall_insights: OverallInsights,
    pub originating_request: GenerationRequest,
}

// "41%" on the wire, 41.0 in memory
pub mod percent {
    use serde::{de, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum PercentRepr {
        Number(f64),
        Text(String),
    }

    pub fn parse(text: &str) -> Option<f64> {
        text.trim()
            .trim_end_matches('%')
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
    }

    pub fn serialize_whole<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{:.0}%", value.max(0.0)))
    }

    pub fn serialize_tenths<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{:.1}%", value.max(0.0)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match PercentRepr::deserialize(deserializer)? {
            PercentRepr::Number(value) => Ok(value),
            PercentRepr::Text(text) => parse(&text)
                .ok_or_else(|| de::Error::custom(format!("invalid percentage: {}", text))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_defaults_to_fun_tone() {
        let request: GenerationRequest = serde_json::from_value(json!({
            "campaignType": "newLaunch",
            "discount": "30% off",
            "product": "Kurtas"
        }))
        .unwrap();

        assert_eq!(request.campaign_type, CampaignType::NewLaunch);
        assert_eq!(request.brand_tone, BrandTone::Fun);
        assert!(request.campaign_suggestion.is_none());
    }

    #[test]
    fn blank_fields_fail_validation() {
        let mut request = GenerationRequest::new(CampaignType::Sale, "25% off", "  ", BrandTone::Bold);
        assert_eq!(request.validate(), Err(RequestError::MissingField("product")));

        request.product = "Skincare".to_string();
        request.discount = String::new();
        assert_eq!(request.validate(), Err(RequestError::MissingField("discount")));

        request.discount = "25% off".to_string();
        assert!(request.validate().is_ok());
    }

    #[test]
    fn missing_discount_deserializes_then_fails_validation() {
        let request: GenerationRequest = serde_json::from_value(json!({
            "campaignType": "sale",
            "product": "Skincare"
        }))
        .unwrap();

        assert!(request.validate().is_err());
    }

    #[test]
    fn launch_window_starts_tomorrow_and_spans_a_week() {
        let today = NaiveDate::from_ymd_opt(2024, 12, 28).unwrap();
        let window = LaunchWindow::following(today);

        assert_eq!(window.start_date, NaiveDate::from_ymd_opt(2024, 12, 29).unwrap());
        assert_eq!(window.end_date, NaiveDate::from_ymd_opt(2025, 1, 5).unwrap());
        assert!(window.is_valid_after(today));
        assert!(!window.is_valid_after(window.start_date));
    }

    #[test]
    fn engagement_serializes_with_percent_suffix() {
        let engagement = PredictedEngagement {
            open_rate_percent: 49.0,
            click_through_rate_percent: 8.6,
            estimated_orders: 1722,
        };

        let value = serde_json::to_value(engagement).unwrap();
        assert_eq!(
            value,
            json!({"openRate": "49%", "clickThroughRate": "8.6%", "estimatedOrders": 1722})
        );
    }

    #[test]
    fn engagement_accepts_strings_or_numbers() {
        let engagement: PredictedEngagement = serde_json::from_value(json!({
            "openRate": "38%",
            "clickThroughRate": 6.5,
            "estimatedOrders": 200
        }))
        .unwrap();

        assert_eq!(engagement.open_rate_percent, 38.0);
        assert_eq!(engagement.click_through_rate_percent, 6.5);

        let bad: Result<PredictedEngagement, _> = serde_json::from_value(json!({
            "openRate": "high",
            "clickThroughRate": "5%",
            "estimatedOrders": 1
        }));
        assert!(bad.is_err());
    }

    #[test]
    fn percent_parse_trims_suffix() {
        assert_eq!(percent::parse(" 7.2 % "), Some(7.2));
        assert_eq!(percent::parse("12"), Some(12.0));
        assert_eq!(percent::parse("n/a"), None);
    }
}
