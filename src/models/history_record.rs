use chrono::DateTime;
use chrono_tz::Tz;

use crate::models::PriceSummary;

/// One persisted observation. Created once per fetch cycle, immutable
/// thereafter, never deleted or rewritten.
#[derive(Debug, Clone)]
pub struct HistoryRecord {
    pub timestamp: DateTime<Tz>,
    pub lowest_price: Option<f64>,
    pub computed_min_price: Option<f64>,
    pub median_sale: Option<f64>,
    pub num_listings: Option<usize>,
    pub event_url: String,
    pub all_prices: Vec<f64>,
}

impl HistoryRecord {
    pub fn new(timestamp: DateTime<Tz>, summary: &PriceSummary, event_url: &str) -> Self {
        Self {
            timestamp,
            lowest_price: summary.lowest_price,
            computed_min_price: summary.computed_min_price,
            median_sale: summary.median_sale,
            num_listings: summary.num_listings,
            event_url: event_url.to_string(),
            all_prices: summary.all_prices.clone(),
        }
    }
}

/// Serialize a price list as a bracketed literal, e.g. `[10.5, 12.0]`.
/// Whole floats keep their decimal point so the round trip is stable.
pub fn format_price_list(prices: &[f64]) -> String {
    let inner = prices
        .iter()
        .map(|p| format!("{:?}", p))
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{}]", inner)
}

/// Parse a bracketed price list literal back into floats.
/// Malformed input degrades to an empty list, it never fails.
pub fn parse_price_list(raw: &str) -> Vec<f64> {
    let inner = raw.trim().trim_start_matches('[').trim_end_matches(']').trim();
    if inner.is_empty() {
        return Vec::new();
    }

    let mut prices = Vec::new();
    for part in inner.split(',') {
        match part.trim().parse::<f64>() {
            Ok(v) => prices.push(v),
            Err(_) => return Vec::new(),
        }
    }
    prices
}
