/// Price signals extracted from one fetch of the event page.
///
/// `lowest_price` and `median_sale` come from page-level summary widgets;
/// `computed_min_price`, `num_listings` and `all_prices` are derived from
/// the per-row listing prices. A `num_listings` of `None` means no listing
/// rows matched, which is distinct from zero listings for sale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSummary {
    pub lowest_price: Option<f64>,
    pub median_sale: Option<f64>,
    pub computed_min_price: Option<f64>,
    pub num_listings: Option<usize>,
    pub all_prices: Vec<f64>,
}

impl PriceSummary {
    /// Build a summary from the widget values and the collected row prices.
    ///
    /// Sorts the prices ascending and derives `computed_min_price` and
    /// `num_listings` from them, keeping the count `None` when no rows
    /// were found.
    pub fn from_parts(
        lowest_price: Option<f64>,
        median_sale: Option<f64>,
        mut prices: Vec<f64>,
    ) -> Self {
        prices.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let computed_min_price = prices.first().copied();
        let num_listings = if prices.is_empty() {
            None
        } else {
            Some(prices.len())
        };

        Self {
            lowest_price,
            median_sale,
            computed_min_price,
            num_listings,
            all_prices: prices,
        }
    }
}
