// historical campaign store and similarity matching

use serde::Deserialize;

use crate::models::{GenerationRequest, HistoricalCampaign};

// upper bound on matches handed to estimation and prompting
pub const MAX_SIMILAR_CAMPAIGNS: usize = 3;

const BUILTIN_DATASET: &str = include_str!("../data/campaigns.json");

#[derive(Debug, thiserror::Error)]
#[error("Failed to load campaign dataset: {0}")]
pub struct DatasetError(#[from] serde_json::Error);

#[derive(Debug, Deserialize)]
struct Dataset {
    version: String,
    campaigns: Vec<HistoricalCampaign>,
}

#[derive(Debug, Clone)]
pub struct CampaignStore {
    version: String,
    campaigns: Vec<HistoricalCampaign>,
}

impl CampaignStore {
    pub fn new(version: impl Into<String>, campaigns: Vec<HistoricalCampaign>) -> Self {
        Self {
            version: version.into(),
            campaigns,
        }
    }

    // dataset shipped inside the binary
    pub fn builtin() -> Result<Self, DatasetError> {
        Self::from_json(BUILTIN_DATASET)
    }

    pub fn from_json(raw: &str) -> Result<Self, DatasetError> {
        let dataset: Dataset = serde_json::from_str(raw)?;
        Ok(Self::new(dataset.version, dataset.campaigns))
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn campaigns(&self) -> &[HistoricalCampaign] {
        &self.campaigns
    }

    pub fn find_similar(&self, request: &GenerationRequest) -> Vec<&HistoricalCampaign> {
        find_similar(request, &self.campaigns)
    }
}

// case-insensitive, store order, capped
pub fn find_similar<'a>(
    request: &GenerationRequest,
    campaigns: &'a [HistoricalCampaign],
) -> Vec<&'a HistoricalCampaign> {
    let type_needle = request.campaign_type.as_str().to_lowercase();
    let product_needle = request.product.trim().to_lowercase();
    let offer_needle = request
        .discount
        .split_whitespace()
        .next()
        .map(str::to_lowercase);

    campaigns
        .iter()
        .filter(|campaign| {
            let type_match = contains_needle(&campaign.campaign_name, &type_needle);
            let product_match = contains_needle(&campaign.description, &product_needle);
            let offer_match = offer_needle.as_deref().is_some_and(|needle| {
                campaign
                    .offers
                    .iter()
                    .any(|offer| contains_needle(offer, needle))
            });

            type_match || product_match || offer_match
        })
        .take(MAX_SIMILAR_CAMPAIGNS)
        .collect()
}

// an empty needle never matches
fn contains_needle(haystack: &str, needle: &str) -> bool {
    !needle.is_empty() && haystack.to_lowercase().contains(needle)
}
