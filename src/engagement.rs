// engagement estimates from historical matches

use crate::models::{BrandTone, HistoricalCampaign, PredictedEngagement};

pub const DEFAULT_ENGAGEMENT: PredictedEngagement = PredictedEngagement {
    open_rate_percent: 35.0,
    click_through_rate_percent: 5.2,
    estimated_orders: 150,
};

// a new campaign starts from a smaller base than the flagship history
const NEW_CAMPAIGN_SCALE: f64 = 0.3;

pub fn tone_multiplier(tone: BrandTone) -> f64 {
    match tone {
        BrandTone::Elegant => 1.10,
        BrandTone::Bold => 1.20,
        BrandTone::Quirky => 0.95,
        BrandTone::Fun => 1.05,
        BrandTone::Premium => 1.0,
    }
}

// averaged history scaled by tone, defaults when nothing matched
pub fn predict(matches: &[&HistoricalCampaign], tone: BrandTone) -> PredictedEngagement {
    if matches.is_empty() {
        return DEFAULT_ENGAGEMENT;
    }

    let count = matches.len() as f64;
    let mean = |metric: fn(&HistoricalCampaign) -> f64| {
        matches.iter().map(|campaign| metric(campaign)).sum::<f64>() / count
    };

    let avg_open = mean(|c| c.performance.open_rate_percent);
    let avg_ctr = mean(|c| c.performance.click_through_rate_percent);
    let avg_orders = mean(|c| c.performance.order_count as f64);

    let multiplier = tone_multiplier(tone);

    PredictedEngagement {
        open_rate_percent: (avg_open * multiplier).round().max(0.0),
        click_through_rate_percent: round_tenths(avg_ctr * multiplier).max(0.0),
        estimated_orders: (avg_orders * NEW_CAMPAIGN_SCALE * multiplier).round().max(0.0) as u64,
    }
}

fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::CampaignStore;

    #[test]
    fn empty_matches_give_defaults() {
        for tone in [BrandTone::Bold, BrandTone::Premium, BrandTone::Quirky] {
            let engagement = predict(&[], tone);
            assert_eq!(engagement.open_rate_percent, 35.0);
            assert_eq!(engagement.click_through_rate_percent, 5.2);
            assert_eq!(engagement.estimated_orders, 150);
        }
    }

    #[test]
    fn single_match_scaled_by_bold() {
        let store = CampaignStore::builtin().unwrap();
        let purple_days = &store.campaigns()[0];

        let engagement = predict(&[purple_days], BrandTone::Bold);

        // 41 * 1.2, 7.2 * 1.2, 4782 * 0.3 * 1.2
        assert_eq!(engagement.open_rate_percent, 49.0);
        assert_eq!(engagement.click_through_rate_percent, 8.6);
        assert_eq!(engagement.estimated_orders, 1722);
    }

    #[test]
    fn averages_across_matches() {
        let store = CampaignStore::builtin().unwrap();
        let campaigns = store.campaigns();
        let matches = [&campaigns[0], &campaigns[1]];

        let engagement = predict(&matches, BrandTone::Premium);

        // means: 38.5 open, 6.5 ctr, 3951 orders
        assert_eq!(engagement.open_rate_percent, 39.0);
        assert_eq!(engagement.click_through_rate_percent, 6.5);
        assert_eq!(engagement.estimated_orders, 1185);
    }

    #[test]
    fn bold_outscores_quirky() {
        let store = CampaignStore::builtin().unwrap();
        let matches: Vec<_> = store.campaigns().iter().take(3).collect();

        let bold = predict(&matches, BrandTone::Bold);
        let quirky = predict(&matches, BrandTone::Quirky);

        assert!(bold.open_rate_percent >= quirky.open_rate_percent);
        assert!(bold.click_through_rate_percent >= quirky.click_through_rate_percent);
        assert!(bold.estimated_orders >= quirky.estimated_orders);
    }
}
