use crate::models::{LastObservation, MonitorState, PriceSummary};
use crate::utils::format_usd;

/// Tolerance below which two lows count as the same price, so float noise
/// on equal values never refires the new-low rule
const NEW_LOW_EPSILON: f64 = 1e-9;

/// Minimum absolute lowest-price change that counts as movement
const PRICE_MOVE_THRESHOLD: f64 = 0.01;

/// How many of the cheapest listings the market snapshot shows
const SNAPSHOT_LOWEST_COUNT: usize = 5;

/// How many of the cheapest listings feed the snapshot median
const SNAPSHOT_MEDIAN_POOL: usize = 10;

/// Static alerting parameters, loaded once from config.
/// A `target_price` of 0 disables the target rule.
#[derive(Debug, Clone, Copy)]
pub struct AlertPolicy {
    pub target_price: f64,
    pub notify_on_new_low: bool,
}

/// Evaluate the alert rules for one observation and update monitor state.
///
/// Returns the alert messages in rule order, possibly empty. `ts_label` is
/// the preformatted local-time label embedded in message text. The last
/// observation in `state` is replaced with the current one every cycle,
/// whether or not any rule fired.
pub fn evaluate(
    summary: &PriceSummary,
    state: &mut MonitorState,
    policy: &AlertPolicy,
    ts_label: &str,
) -> Vec<String> {
    let mut messages = Vec::new();
    let mut movement_detected = false;

    let lowest = summary.lowest_price;

    // Price target
    if let Some(lp) = lowest {
        if policy.target_price > 0.0 && lp <= policy.target_price {
            messages.push(format!(
                "✅ [{}] Target hit: lowest={} ≤ {}",
                ts_label,
                format_usd(Some(lp)),
                format_usd(Some(policy.target_price))
            ));
        }
    }

    // New all-time low, tracked over the effective low of widget and rows
    if policy.notify_on_new_low {
        let effective_low = match (lowest, summary.computed_min_price) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (Some(a), None) => Some(a),
            (None, Some(b)) => Some(b),
            (None, None) => None,
        };

        if let Some(low) = effective_low {
            let is_new_low = match state.all_time_low {
                None => true,
                Some(prev) => low < prev - NEW_LOW_EPSILON,
            };
            if is_new_low {
                messages.push(format!(
                    "📉 [{}] New all-time low: {} (old={})",
                    ts_label,
                    format_usd(Some(low)),
                    format_usd(state.all_time_low)
                ));
                state.all_time_low = Some(low);
            }
        }
    }

    if let Some(last) = &state.last {
        // Ticket movement: listings posted or sold
        if let (Some(num), Some(last_num)) = (summary.num_listings, last.num_listings) {
            if num != last_num {
                if num > last_num {
                    messages.push(format!(
                        "🆕 [{}] {} new ticket(s) posted! Total listings: {}",
                        ts_label,
                        num - last_num,
                        num
                    ));
                } else {
                    messages.push(format!(
                        "💰 [{}] {} ticket(s) sold! Total listings: {}",
                        ts_label,
                        last_num - num,
                        num
                    ));
                }
                movement_detected = true;
            }
        }

        // Lowest-price movement
        if let (Some(lp), Some(last_lowest)) = (lowest, last.lowest_price) {
            if (lp - last_lowest).abs() > PRICE_MOVE_THRESHOLD {
                let arrow = if lp > last_lowest { "↗️" } else { "↘️" };
                messages.push(format!(
                    "{} [{}] Price change: {} → {}",
                    arrow,
                    ts_label,
                    format_usd(Some(last_lowest)),
                    format_usd(Some(lp))
                ));
                movement_detected = true;
            }
        }
    }

    // Market snapshot accompanies movement alerts only
    if movement_detected && !summary.all_prices.is_empty() {
        messages.push(market_snapshot(&summary.all_prices));
    }

    // The current observation becomes the comparison point for next cycle
    state.last = Some(LastObservation {
        lowest_price: lowest,
        num_listings: summary.num_listings,
        all_prices: summary.all_prices.clone(),
    });

    messages
}

/// One-line market summary: the cheapest listings and the median of the
/// bottom pool. The median is the element at index `len / 2` of the sorted
/// pool (upper-middle on even counts), kept as-is for output compatibility.
fn market_snapshot(all_prices: &[f64]) -> String {
    let lowest: Vec<String> = all_prices
        .iter()
        .take(SNAPSHOT_LOWEST_COUNT)
        .map(|p| format_usd(Some(*p)))
        .collect();

    let pool: Vec<f64> = all_prices
        .iter()
        .take(SNAPSHOT_MEDIAN_POOL)
        .copied()
        .collect();
    let median = pool[pool.len() / 2];

    format!(
        "📊 Market update: Lowest 5: [{}] | Median (bottom 10): {}",
        lowest.join(", "),
        format_usd(Some(median))
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const TS: &str = "2025-03-01 07:05 PM";

    fn summary(lowest: Option<f64>, prices: Vec<f64>) -> PriceSummary {
        PriceSummary::from_parts(lowest, None, prices)
    }

    fn state_with_last(
        lowest_price: Option<f64>,
        num_listings: Option<usize>,
        all_time_low: Option<f64>,
    ) -> MonitorState {
        MonitorState {
            all_time_low,
            last: Some(LastObservation {
                lowest_price,
                num_listings,
                all_prices: vec![],
            }),
        }
    }

    #[test]
    fn test_target_hit_fires_at_or_below_target() {
        let policy = AlertPolicy {
            target_price: 125.0,
            notify_on_new_low: false,
        };
        let mut state = MonitorState::default();

        let messages = evaluate(&summary(Some(120.0), vec![]), &mut state, &policy, TS);
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("Target hit"));
        assert!(messages[0].contains("$120.00"));
    }

    #[test]
    fn test_zero_target_disables_rule() {
        let policy = AlertPolicy {
            target_price: 0.0,
            notify_on_new_low: false,
        };
        let mut state = MonitorState::default();

        let messages = evaluate(&summary(Some(1.0), vec![]), &mut state, &policy, TS);
        assert!(messages.is_empty());
    }

    #[test]
    fn test_new_low_uses_effective_low_of_widget_and_rows() {
        let policy = AlertPolicy {
            target_price: 0.0,
            notify_on_new_low: true,
        };
        let mut state = MonitorState {
            all_time_low: Some(110.0),
            last: None,
        };

        // Widget says 120 but a row at 95 beats the running low
        let messages = evaluate(
            &summary(Some(120.0), vec![95.0, 130.0]),
            &mut state,
            &policy,
            TS,
        );
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("New all-time low"));
        assert!(messages[0].contains("$95.00"));
        assert_eq!(state.all_time_low, Some(95.0));
    }

    #[test]
    fn test_new_low_idempotent_on_repeated_summary() {
        let policy = AlertPolicy {
            target_price: 0.0,
            notify_on_new_low: true,
        };
        let mut state = MonitorState::default();
        let current = summary(Some(100.0), vec![100.0]);

        let first = evaluate(&current, &mut state, &policy, TS);
        assert_eq!(first.len(), 1);

        let second = evaluate(&current, &mut state, &policy, TS);
        assert!(second.iter().all(|m| !m.contains("New all-time low")));
    }

    #[test]
    fn test_new_low_disabled_by_policy() {
        let policy = AlertPolicy {
            target_price: 0.0,
            notify_on_new_low: false,
        };
        let mut state = MonitorState::default();

        let messages = evaluate(&summary(Some(50.0), vec![50.0]), &mut state, &policy, TS);
        assert!(messages.is_empty());
        assert_eq!(state.all_time_low, None);
    }

    #[test]
    fn test_tickets_sold_message() {
        let policy = AlertPolicy {
            target_price: 0.0,
            notify_on_new_low: false,
        };
        let mut state = state_with_last(None, Some(5), None);

        let messages = evaluate(
            &summary(None, vec![100.0, 110.0, 120.0]),
            &mut state,
            &policy,
            TS,
        );
        assert_eq!(messages.len(), 2);
        assert!(messages[0].contains("2 ticket(s) sold! Total listings: 3"));
        assert!(messages[1].contains("Market update"));
    }

    #[test]
    fn test_tickets_posted_message() {
        let policy = AlertPolicy {
            target_price: 0.0,
            notify_on_new_low: false,
        };
        let mut state = state_with_last(None, Some(2), None);

        let messages = evaluate(
            &summary(None, vec![100.0, 110.0, 120.0]),
            &mut state,
            &policy,
            TS,
        );
        assert!(messages[0].contains("1 new ticket(s) posted! Total listings: 3"));
    }

    #[test]
    fn test_listing_change_needs_both_counts() {
        let policy = AlertPolicy {
            target_price: 0.0,
            notify_on_new_low: false,
        };

        // Prior count unknown: no movement alert
        let mut state = state_with_last(None, None, None);
        let messages = evaluate(&summary(None, vec![100.0]), &mut state, &policy, TS);
        assert!(messages.is_empty());

        // Current count unknown: no movement alert either
        let mut state = state_with_last(None, Some(4), None);
        let messages = evaluate(&summary(None, vec![]), &mut state, &policy, TS);
        assert!(messages.is_empty());
    }

    #[test]
    fn test_price_change_below_threshold_is_silent() {
        let policy = AlertPolicy {
            target_price: 0.0,
            notify_on_new_low: false,
        };
        let mut state = state_with_last(Some(100.0), None, None);

        let messages = evaluate(&summary(Some(100.005), vec![]), &mut state, &policy, TS);
        assert!(messages.is_empty());
    }

    #[test]
    fn test_price_change_directional_messages() {
        let policy = AlertPolicy {
            target_price: 0.0,
            notify_on_new_low: false,
        };

        let mut state = state_with_last(Some(100.0), None, None);
        let up = evaluate(&summary(Some(110.0), vec![]), &mut state, &policy, TS);
        assert!(up[0].starts_with("↗️"));
        assert!(up[0].contains("$100.00 → $110.00"));

        let mut state = state_with_last(Some(110.0), None, None);
        let down = evaluate(&summary(Some(100.0), vec![]), &mut state, &policy, TS);
        assert!(down[0].starts_with("↘️"));
    }

    #[test]
    fn test_no_prior_state_means_no_movement_rules() {
        let policy = AlertPolicy {
            target_price: 0.0,
            notify_on_new_low: false,
        };
        let mut state = MonitorState::default();

        let messages = evaluate(&summary(Some(90.0), vec![90.0]), &mut state, &policy, TS);
        assert!(messages.is_empty());
        // But the observation is recorded for next cycle regardless
        assert_eq!(state.last.as_ref().unwrap().lowest_price, Some(90.0));
        assert_eq!(state.last.as_ref().unwrap().num_listings, Some(1));
    }

    #[test]
    fn test_snapshot_only_on_movement() {
        let policy = AlertPolicy {
            target_price: 200.0,
            notify_on_new_low: false,
        };
        let mut state = state_with_last(Some(100.0), Some(3), None);

        // Target fires but nothing moved, so no market update
        let messages = evaluate(
            &summary(Some(100.0), vec![100.0, 110.0, 120.0]),
            &mut state,
            &policy,
            TS,
        );
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("Target hit"));
    }

    #[test]
    fn test_snapshot_median_uses_upper_middle_index() {
        // Even count: index 4/2 = 2 of [5,6,7,8] is 7, not the mean 7.5
        let line = market_snapshot(&[5.0, 6.0, 7.0, 8.0]);
        assert!(line.contains("Median (bottom 10): $7.00"));
    }

    #[test]
    fn test_snapshot_limits_to_lowest_five_and_bottom_ten() {
        let prices: Vec<f64> = (1..=12).map(|n| n as f64).collect();
        let line = market_snapshot(&prices);
        assert!(line.contains("[$1.00, $2.00, $3.00, $4.00, $5.00]"));
        // Bottom ten are 1..=10, upper-middle index 5 holds 6
        assert!(line.contains("Median (bottom 10): $6.00"));
    }

    #[test]
    fn test_state_last_replaced_every_cycle() {
        let policy = AlertPolicy {
            target_price: 0.0,
            notify_on_new_low: false,
        };
        let mut state = state_with_last(Some(100.0), Some(5), None);

        evaluate(&summary(None, vec![]), &mut state, &policy, TS);
        let last = state.last.unwrap();
        assert_eq!(last.lowest_price, None);
        assert_eq!(last.num_listings, None);
        assert!(last.all_prices.is_empty());
    }
}
