// summary statistics over the historical store

use serde::Serialize;

use crate::models::HistoricalCampaign;

const TOP_PERFORMER_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum CampaignCategory {
    Sale,
    Flash,
    Festive,
    Other,
}

impl CampaignCategory {
    // first matching keyword wins
    pub fn of(campaign_name: &str) -> Self {
        if campaign_name.contains("Sale") {
            CampaignCategory::Sale
        } else if campaign_name.contains("Flash") {
            CampaignCategory::Flash
        } else if campaign_name.contains("Festive") || campaign_name.contains("Diwali") {
            CampaignCategory::Festive
        } else {
            CampaignCategory::Other
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopPerformer {
    pub campaign_name: String,
    pub revenue: u64,
    pub order_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBreakdown {
    pub category: CampaignCategory,
    pub count: usize,
    pub revenue: u64,
    pub order_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySummary {
    pub campaign_count: usize,
    pub total_revenue: u64,
    pub total_orders: u64,
    pub average_order_value: f64,
    pub average_open_rate_percent: f64,
    pub top_performers: Vec<TopPerformer>,
    pub categories: Vec<CategoryBreakdown>,
}

pub fn summarize(campaigns: &[HistoricalCampaign]) -> HistorySummary {
    let total_revenue: u64 = campaigns.iter().map(|c| c.performance.revenue).sum();
    let total_orders: u64 = campaigns.iter().map(|c| c.performance.order_count).sum();

    let average_order_value = if total_orders == 0 {
        0.0
    } else {
        total_revenue as f64 / total_orders as f64
    };

    let average_open_rate_percent = if campaigns.is_empty() {
        0.0
    } else {
        let sum: f64 = campaigns.iter().map(|c| c.performance.open_rate_percent).sum();
        (sum / campaigns.len() as f64).round()
    };

    // stable sort keeps store order among equal revenues
    let mut by_revenue: Vec<&HistoricalCampaign> = campaigns.iter().collect();
    by_revenue.sort_by(|a, b| b.performance.revenue.cmp(&a.performance.revenue));
    let top_performers = by_revenue
        .into_iter()
        .take(TOP_PERFORMER_COUNT)
        .map(|c| TopPerformer {
            campaign_name: c.campaign_name.clone(),
            revenue: c.performance.revenue,
            order_count: c.performance.order_count,
        })
        .collect();

    let mut categories: Vec<CategoryBreakdown> = Vec::new();
    for campaign in campaigns {
        let category = CampaignCategory::of(&campaign.campaign_name);
        let index = match categories.iter().position(|entry| entry.category == category) {
            Some(index) => index,
            None => {
                categories.push(CategoryBreakdown {
                    category,
                    count: 0,
                    revenue: 0,
                    order_count: 0,
                });
                categories.len() - 1
            }
        };
        let entry = &mut categories[index];
        entry.count += 1;
        entry.revenue += campaign.performance.revenue;
        entry.order_count += campaign.performance.order_count;
    }
    categories.sort_by_key(|entry| entry.category);

    HistorySummary {
        campaign_count: campaigns.len(),
        total_revenue,
        total_orders,
        average_order_value,
        average_open_rate_percent,
        top_performers,
        categories,
    }
}
