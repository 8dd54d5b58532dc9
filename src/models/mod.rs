mod history_record;
mod monitor_state;
mod price_summary;

pub use history_record::{format_price_list, parse_price_list, HistoryRecord};
pub use monitor_state::{LastObservation, MonitorState};
pub use price_summary::PriceSummary;
