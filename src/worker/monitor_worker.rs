use chrono::Utc;
use chrono_tz::Tz;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info};

use crate::config::MonitorConfig;
use crate::error::Result;
use crate::models::{HistoryRecord, MonitorState};
use crate::services::detector::{self, AlertPolicy};
use crate::services::page_parser;
use crate::services::{EventFetcher, HistoryStore, Notifier, NotifyContext};
use crate::utils::{format_usd, get_data_dir};

/// History file name inside the data directory
const HISTORY_FILE: &str = "price_history.csv";

/// Local-time label format used inside alert text, e.g. "2025-03-01 07:05 PM"
const ALERT_TS_FORMAT: &str = "%Y-%m-%d %I:%M %p";

/// Run the monitor loop: fetch, parse, persist, detect, notify, wait.
///
/// One cycle executes fully before the next begins. A cycle failure is
/// logged and the loop proceeds to the wait; only a startup error (bad
/// timezone, client construction) is returned. The `stop` flag is checked
/// at the top of each iteration and at every one-second wait tick, so
/// shutdown latency is bounded by one tick, not the full interval.
pub async fn run(config: MonitorConfig, stop: Arc<AtomicBool>) -> Result<()> {
    let tz = config.tz()?;
    let fetcher = EventFetcher::new(&config.event_url, &config.user_agent)?;
    let notifier = Notifier::new();
    let store = HistoryStore::new(get_data_dir().join(HISTORY_FILE));

    let policy = AlertPolicy {
        target_price: config.target_price,
        notify_on_new_low: config.notify_on_new_low,
    };

    let mut state = MonitorState {
        all_time_low: store.min_lowest_price_ever(),
        last: store.last_observation(),
    };

    info!(
        event_url = %config.event_url,
        period_secs = config.check_every_seconds,
        target = %format_usd(Some(config.target_price)),
        run_once = config.run_once,
        "Starting monitor"
    );

    let mut iteration_count = 0u64;

    while !stop.load(Ordering::Relaxed) {
        iteration_count += 1;

        match run_cycle(&config, &fetcher, &notifier, &store, &policy, tz, &mut state).await {
            Ok(()) => {}
            Err(e) => {
                // A single cycle's failure never terminates the loop
                error!(iteration = iteration_count, error = %e, "Error during check");
            }
        }

        // Single-pass mode: one cycle regardless of outcome, then stop
        if config.run_once {
            break;
        }

        for _ in 0..config.check_every_seconds {
            if stop.load(Ordering::Relaxed) {
                break;
            }
            sleep(Duration::from_secs(1)).await;
        }
    }

    info!(iterations = iteration_count, "Monitor stopped");
    Ok(())
}

async fn run_cycle(
    config: &MonitorConfig,
    fetcher: &EventFetcher,
    notifier: &Notifier,
    store: &HistoryStore,
    policy: &AlertPolicy,
    tz: Tz,
    state: &mut MonitorState,
) -> Result<()> {
    let markup = fetcher.fetch().await?;
    let summary = page_parser::parse(&markup);

    let now = Utc::now().with_timezone(&tz);
    store.append(&HistoryRecord::new(now, &summary, &config.event_url))?;

    info!(
        lowest = %format_usd(summary.lowest_price),
        computed_min = %format_usd(summary.computed_min_price),
        median_sale = %format_usd(summary.median_sale),
        listings = ?summary.num_listings,
        "Cycle summary"
    );

    let ts_label = now.format(ALERT_TS_FORMAT).to_string();
    let messages = detector::evaluate(&summary, state, policy, &ts_label);

    if !messages.is_empty() {
        let context = NotifyContext {
            event_url: config.event_url.clone(),
            lowest_price: summary.lowest_price,
            median_sale: summary.median_sale,
            num_listings: summary.num_listings,
        };
        notifier.notify(&messages.join("\n"), &context).await;
    }

    Ok(())
}
