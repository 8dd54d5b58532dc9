use csv::{ReaderBuilder, WriterBuilder};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::models::{format_price_list, parse_price_list, HistoryRecord, LastObservation};

/// Column order of the persisted history file
const HISTORY_COLUMNS: [&str; 8] = [
    "timestamp",
    "lowest_price",
    "page_lowest_price",
    "computed_min_price",
    "median_sale",
    "num_listings",
    "event_url",
    "all_prices",
];

/// Append-only CSV log of observations.
///
/// Single-writer: only this process appends. A concurrent external writer
/// would corrupt the row-ordering guarantee, so none is supported. Reads
/// treat a missing or unreadable file as "no prior data" rather than an
/// error.
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Durably append one observation row, writing the header on first use.
    /// Existing rows are never overwritten or reordered.
    pub fn append(&self, record: &HistoryRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let needs_header = std::fs::metadata(&self.path)
            .map(|m| m.len() == 0)
            .unwrap_or(true);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);

        if needs_header {
            writer.write_record(HISTORY_COLUMNS)?;
        }

        writer.write_record(&[
            record.timestamp.to_rfc3339(),
            float_field(record.lowest_price),
            // page_lowest_price mirrors the summary-widget value
            float_field(record.lowest_price),
            float_field(record.computed_min_price),
            float_field(record.median_sale),
            count_field(record.num_listings),
            record.event_url.clone(),
            format_price_list(&record.all_prices),
        ])?;

        writer.flush()?;
        Ok(())
    }

    /// Minimum of all recorded `lowest_price` values, or `None` when the
    /// store is empty, missing, or unreadable.
    pub fn min_lowest_price_ever(&self) -> Option<f64> {
        let rows = self.read_rows()?;

        let mut min: Option<f64> = None;
        for row in &rows {
            let field = row.lowest_price.as_deref().unwrap_or("");
            if field.is_empty() {
                continue;
            }
            let value: f64 = field.parse().ok()?;
            min = Some(match min {
                Some(current) => current.min(value),
                None => value,
            });
        }
        min
    }

    /// Fields of the most recently appended record, or `None` when no
    /// records exist. A malformed `all_prices` literal degrades to an
    /// empty list.
    pub fn last_observation(&self) -> Option<LastObservation> {
        let rows = self.read_rows()?;
        let last = rows.last()?;

        let lowest_price = match last.lowest_price.as_deref() {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<f64>().ok()?),
        };
        let num_listings = match last.num_listings.as_deref() {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<usize>().ok()?),
        };
        let all_prices = parse_price_list(last.all_prices.as_deref().unwrap_or("[]"));

        Some(LastObservation {
            lowest_price,
            num_listings,
            all_prices,
        })
    }

    /// Read every row, keyed by header. Any read or decode failure yields
    /// `None` so callers fall back to "no prior data".
    fn read_rows(&self) -> Option<Vec<RawRow>> {
        if !self.path.exists() {
            return None;
        }

        let mut reader = ReaderBuilder::new().from_path(&self.path).ok()?;
        let headers = reader.headers().ok()?.clone();
        let lowest_idx = headers.iter().position(|h| h == "lowest_price")?;
        let listings_idx = headers.iter().position(|h| h == "num_listings")?;
        let prices_idx = headers.iter().position(|h| h == "all_prices")?;

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result.ok()?;
            rows.push(RawRow {
                lowest_price: record.get(lowest_idx).map(str::to_string),
                num_listings: record.get(listings_idx).map(str::to_string),
                all_prices: record.get(prices_idx).map(str::to_string),
            });
        }

        if rows.is_empty() {
            None
        } else {
            Some(rows)
        }
    }
}

struct RawRow {
    lowest_price: Option<String>,
    num_listings: Option<String>,
    all_prices: Option<String>,
}

fn float_field(value: Option<f64>) -> String {
    value.map(|v| format!("{:?}", v)).unwrap_or_default()
}

fn count_field(value: Option<usize>) -> String {
    value.map(|n| n.to_string()).unwrap_or_default()
}
