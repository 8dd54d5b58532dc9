/// Fields of the most recent observation used for movement detection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LastObservation {
    pub lowest_price: Option<f64>,
    pub num_listings: Option<usize>,
    pub all_prices: Vec<f64>,
}

/// In-memory monitor state, process lifetime only.
///
/// Derived from the history store at startup and updated once per cycle;
/// never persisted separately, since it is recoverable by re-scanning
/// history.
#[derive(Debug, Clone, Default)]
pub struct MonitorState {
    pub all_time_low: Option<f64>,
    pub last: Option<LastObservation>,
}
