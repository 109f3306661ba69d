// parsing of free-form model replies into campaign variants

use chrono::NaiveDate;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::engagement::DEFAULT_ENGAGEMENT;
use crate::models::{
    percent, CampaignVariant, GenerationRequest, GenerationResponse, LaunchWindow,
    OverallInsights, PredictedEngagement, PushNotification, VARIANT_COUNT,
};

const DATE_FORMAT: &str = "%Y-%m-%d";

// salvaged variant defaults
const SALVAGE_PUSH_TITLE: &str = "Alert!";
const SALVAGE_PUSH_BODY: &str = "Check out our offer";
const SPLIT_PUSH_TITLE: &str = "Special Offer!";
const SPLIT_PUSH_BODY: &str = "Don't miss out on great savings!";
const SALVAGE_INSIGHT: &str = "AI-generated campaign optimized for engagement.";

// outcome of reading one model reply
#[derive(Debug)]
pub enum ReplyOutcome {
    Parsed(ExternalReply),
    Salvaged(ExternalReply),
    Unusable,
}

#[derive(Debug, thiserror::Error)]
pub enum StrictParseError {
    #[error("no JSON object found")]
    NoObject,
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExternalReply {
    pub variants: Vec<ExternalVariant>,
    pub overall_insights: Option<OverallInsights>,
}

// every field optional: models drop keys freely
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExternalVariant {
    pub campaign_name: Option<String>,
    pub promo_code: Option<String>,
    pub push_notification: Option<ExternalPush>,
    pub offer_copy: Option<String>,
    pub launch_window: Option<ExternalWindow>,
    pub predicted_engagement: Option<ExternalEngagement>,
    pub ai_insight: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ExternalPush {
    pub title: Option<String>,
    pub body: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExternalWindow {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExternalEngagement {
    pub open_rate: Option<Value>,
    pub click_through_rate: Option<Value>,
    pub estimated_orders: Option<Value>,
}

impl From<PredictedEngagement> for ExternalEngagement {
    fn from(engagement: PredictedEngagement) -> Self {
        Self {
            open_rate: Some(Value::from(engagement.open_rate_percent)),
            click_through_rate: Some(Value::from(engagement.click_through_rate_percent)),
            estimated_orders: Some(Value::from(engagement.estimated_orders)),
        }
    }
}

// strict json first, labeled lines second
pub fn interpret_reply(raw: &str) -> ReplyOutcome {
    match parse_strict(raw) {
        Ok(mut reply) if reply.has_usable_variant() => {
            reply.overall_insights.get_or_insert_with(parsed_default_insights);
            return ReplyOutcome::Parsed(reply);
        }
        Ok(_) => warn!("Model reply contained no usable variants, trying salvage parsing"),
        Err(e) => warn!("Could not parse JSON from model reply ({}), trying salvage parsing", e),
    }

    match salvage(raw) {
        Some(reply) => ReplyOutcome::Salvaged(reply),
        None => ReplyOutcome::Unusable,
    }
}

pub fn parse_strict(raw: &str) -> Result<ExternalReply, StrictParseError> {
    let object = extract_json_object(raw).ok_or(StrictParseError::NoObject)?;
    Ok(serde_json::from_str(object)?)
}

// first balanced object, braces inside strings ignored
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }

    None
}

// needs at least a name and a promo code line
pub fn salvage(raw: &str) -> Option<ExternalReply> {
    let campaign_name = capture_labeled(raw, "Campaign Name")?;
    let promo_code = capture_labeled(raw, "Promo Code")?;
    debug!("Salvaged campaign '{}' from unstructured reply", campaign_name);

    let push_notification = match capture_labeled(raw, "Push Message") {
        Some(line) => {
            let mut parts = line.split(" - ").map(str::trim);
            ExternalPush {
                title: Some(non_empty(parts.next()).unwrap_or(SPLIT_PUSH_TITLE).to_string()),
                body: Some(non_empty(parts.next()).unwrap_or(SPLIT_PUSH_BODY).to_string()),
            }
        }
        None => ExternalPush {
            title: Some(SALVAGE_PUSH_TITLE.to_string()),
            body: Some(SALVAGE_PUSH_BODY.to_string()),
        },
    };

    let offer_copy = if raw.contains("discount") {
        "Get amazing discounts on premium products!"
    } else {
        "Get special offers on premium products!"
    };

    let variant = ExternalVariant {
        campaign_name: Some(campaign_name),
        promo_code: Some(promo_code),
        push_notification: Some(push_notification),
        offer_copy: Some(offer_copy.to_string()),
        launch_window: None,
        predicted_engagement: Some(DEFAULT_ENGAGEMENT.into()),
        ai_insight: Some(
            capture_labeled(raw, "Insight").unwrap_or_else(|| SALVAGE_INSIGHT.to_string()),
        ),
    };

    Some(ExternalReply {
        variants: vec![variant],
        overall_insights: Some(salvaged_default_insights()),
    })
}

fn capture_labeled(text: &str, label: &str) -> Option<String> {
    let pattern = format!(r"(?i){}:\s*(.+)", regex::escape(label));
    let regex = Regex::new(&pattern).ok()?;
    let captures = regex.captures(text)?;
    let value = captures.get(1)?.as_str().trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn non_empty(part: Option<&str>) -> Option<&str> {
    part.filter(|s| !s.is_empty())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn parsed_default_insights() -> OverallInsights {
    OverallInsights::from_static(
        &["push", "email", "social"],
        &["Use data-driven insights", "Personalize messaging"],
        &["Peak engagement during weekends"],
    )
}

fn salvaged_default_insights() -> OverallInsights {
    OverallInsights::from_static(
        &["push", "email", "social"],
        &["Use urgency in messaging", "Include clear call-to-action"],
        &[
            "Weekend launches perform better",
            "Festival seasons show higher engagement",
        ],
    )
}

impl ExternalReply {
    pub fn has_usable_variant(&self) -> bool {
        self.variants.iter().any(ExternalVariant::is_usable)
    }

    // usable variants lead, fallback pads and fills gaps
    pub fn into_response(
        self,
        fallback: &GenerationResponse,
        today: NaiveDate,
    ) -> Option<GenerationResponse> {
        let usable: Vec<ExternalVariant> = self
            .variants
            .into_iter()
            .filter(ExternalVariant::is_usable)
            .take(VARIANT_COUNT)
            .collect();
        if usable.is_empty() {
            return None;
        }

        let request = &fallback.originating_request;
        let mut variants: Vec<CampaignVariant> = usable
            .into_iter()
            .zip(&fallback.variants)
            .map(|(external, base)| external.complete(base, request, today))
            .collect();
        let merged = variants.len();
        variants.extend(fallback.variants.iter().skip(merged).cloned());

        let mut overall_insights = self
            .overall_insights
            .unwrap_or_else(|| fallback.overall_insights.clone());
        dedup_in_order(&mut overall_insights.recommended_channels);

        Some(GenerationResponse {
            variants,
            overall_insights,
            originating_request: request.clone(),
        })
    }
}

impl ExternalVariant {
    fn is_usable(&self) -> bool {
        let present = |value: &Option<String>| value.as_deref().is_some_and(|s| !s.trim().is_empty());
        present(&self.campaign_name) && present(&self.promo_code)
    }

    fn complete(
        self,
        base: &CampaignVariant,
        request: &GenerationRequest,
        today: NaiveDate,
    ) -> CampaignVariant {
        let campaign_name = non_blank(self.campaign_name).unwrap_or_else(|| base.campaign_name.clone());
        let promo_code = non_blank(self.promo_code).unwrap_or_else(|| base.promo_code.clone());

        let push = self.push_notification.unwrap_or_default();
        let push_notification = PushNotification {
            title: non_blank(push.title).unwrap_or_else(|| format!("🎉 {}!", campaign_name)),
            body: non_blank(push.body).unwrap_or_else(|| {
                format!(
                    "Get {} on {}. Use code {}!",
                    request.discount.trim(),
                    request.product.trim(),
                    promo_code
                )
            }),
        };

        let launch_window = self
            .launch_window
            .and_then(|window| window.resolve(today))
            .unwrap_or(base.launch_window);

        let predicted_engagement = self
            .predicted_engagement
            .map(|engagement| engagement.resolve(&base.predicted_engagement))
            .unwrap_or(base.predicted_engagement);

        CampaignVariant {
            push_notification,
            offer_copy: non_blank(self.offer_copy).unwrap_or_else(|| base.offer_copy.clone()),
            launch_window,
            predicted_engagement,
            ai_insight: non_blank(self.ai_insight).unwrap_or_else(|| base.ai_insight.clone()),
            campaign_name,
            promo_code,
        }
    }
}

impl ExternalWindow {
    // only future, ordered windows survive
    fn resolve(self, today: NaiveDate) -> Option<LaunchWindow> {
        let parse = |value: Option<String>| {
            NaiveDate::parse_from_str(value?.trim(), DATE_FORMAT).ok()
        };
        let window = LaunchWindow {
            start_date: parse(self.start_date)?,
            end_date: parse(self.end_date)?,
        };
        window.is_valid_after(today).then_some(window)
    }
}

impl ExternalEngagement {
    fn resolve(self, base: &PredictedEngagement) -> PredictedEngagement {
        let open = numeric(self.open_rate).unwrap_or(base.open_rate_percent);
        let ctr = numeric(self.click_through_rate).unwrap_or(base.click_through_rate_percent);
        let orders = numeric(self.estimated_orders)
            .map(|value| value.round().max(0.0) as u64)
            .unwrap_or(base.estimated_orders);

        PredictedEngagement {
            open_rate_percent: open.max(0.0),
            click_through_rate_percent: ctr.max(0.0),
            estimated_orders: orders,
        }
    }
}

fn numeric(value: Option<Value>) -> Option<f64> {
    match value? {
        Value::Number(number) => number.as_f64().filter(|v| v.is_finite()),
        Value::String(text) => percent::parse(&text.replace(',', "")),
        _ => None,
    }
}

fn dedup_in_order(items: &mut Vec<String>) {
    let mut seen = Vec::with_capacity(items.len());
    items.retain(|item| {
        let key = item.trim().to_lowercase();
        if key.is_empty() || seen.contains(&key) {
            false
        } else {
            seen.push(key);
            true
        }
    });
}
