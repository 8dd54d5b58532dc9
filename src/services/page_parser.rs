use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;

use crate::models::PriceSummary;

fn money_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\s*([0-9]+(?:\.[0-9]{1,2})?)").expect("money regex"))
}

fn lowest_label_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)lowest\s*price").expect("lowest label regex"))
}

fn median_label_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)median\s*sale").expect("median label regex"))
}

fn buy_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bbuy\b").expect("buy regex"))
}

fn any_selector() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    SEL.get_or_init(|| Selector::parse("*").expect("universal selector"))
}

fn row_selector() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    SEL.get_or_init(|| Selector::parse("table tr").expect("row selector"))
}

fn cell_selector() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    SEL.get_or_init(|| Selector::parse("td").expect("cell selector"))
}

/// Parse an event page into a price summary.
///
/// Malformed or unexpected markup degrades to absent fields; this never
/// fails. The "Lowest Price" and "Median Sale" summary widgets are located
/// by label; listing prices come from table rows containing a "Buy" token,
/// one price per row.
pub fn parse(markup: &str) -> PriceSummary {
    let doc = Html::parse_document(markup);

    let lowest_price =
        labeled_amount(&doc, lowest_label_re()).or_else(|| document_amount(&doc));
    let median_sale = labeled_amount(&doc, median_label_re());
    let prices = listing_prices(&doc);

    PriceSummary::from_parts(lowest_price, median_sale, prices)
}

/// Extraction strategy: labeled-region lookup.
///
/// Scans elements whose direct text nodes match `label` and returns the
/// first currency amount found in such an element's full text. Labels
/// whose enclosing text holds no parseable amount are skipped.
fn labeled_amount(doc: &Html, label: &Regex) -> Option<f64> {
    for el in doc.select(any_selector()) {
        let has_label = el
            .children()
            .filter_map(|child| child.value().as_text())
            .any(|text| label.is_match(text));
        if !has_label {
            continue;
        }

        if let Some(amount) = parse_money(&element_text(&el)) {
            return Some(amount);
        }
    }
    None
}

/// Extraction strategy: whole-document fallback.
/// First currency amount anywhere in the page text.
fn document_amount(doc: &Html) -> Option<f64> {
    let text = doc.root_element().text().collect::<Vec<_>>().join(" ");
    parse_money(&text)
}

/// Collect one price per purchasable listing row.
///
/// The "Buy" token is the heuristic separating purchasable rows from other
/// table rows. Within a kept row the first cell with a parseable amount
/// wins; later cells are ignored.
fn listing_prices(doc: &Html) -> Vec<f64> {
    let mut prices = Vec::new();

    for row in doc.select(row_selector()) {
        if !buy_re().is_match(&element_text(&row)) {
            continue;
        }

        for cell in row.select(cell_selector()) {
            if let Some(price) = parse_money(&element_text(&cell)) {
                prices.push(price);
                break;
            }
        }
    }

    prices
}

/// Element text with whitespace collapsed to single spaces
fn element_text(el: &ElementRef) -> String {
    el.text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse the first `$<digits>[.<1-2 digits>]` amount in `text`, with
/// thousands-separator commas stripped first. Anything else is unparseable.
pub fn parse_money(text: &str) -> Option<f64> {
    let cleaned = text.replace(',', "");
    money_re()
        .captures(&cleaned)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_money() {
        assert_eq!(parse_money("Lowest Price $120.00"), Some(120.0));
        assert_eq!(parse_money("$ 45"), Some(45.0));
        assert_eq!(parse_money("from $1,250.50 each"), Some(1250.5));
        assert_eq!(parse_money("no price here"), None);
        assert_eq!(parse_money(""), None);
        assert_eq!(parse_money("120.00 USD"), None);
    }

    #[test]
    fn test_full_page_scenario() {
        let html = r#"
            <html><body>
              <div class="summary">Lowest Price <strong>$120.00</strong></div>
              <div class="summary">Median Sale <strong>$140.00</strong></div>
              <table>
                <tr><th>Section</th><th>Price</th><th></th></tr>
                <tr><td>GA</td><td>$150.00</td><td><a>Buy</a></td></tr>
                <tr><td>GA</td><td>$100.00</td><td><a>Buy</a></td></tr>
                <tr><td>Balcony</td><td>$130.00</td><td><a>Buy</a></td></tr>
              </table>
            </body></html>
        "#;
        let summary = parse(html);
        assert_eq!(summary.lowest_price, Some(120.0));
        assert_eq!(summary.median_sale, Some(140.0));
        assert_eq!(summary.computed_min_price, Some(100.0));
        assert_eq!(summary.num_listings, Some(3));
        assert_eq!(summary.all_prices, vec![100.0, 130.0, 150.0]);
    }

    #[test]
    fn test_no_buy_rows_degrades_without_error() {
        let html = r#"
            <html><body>
              <p>Lowest Price $89.99</p>
              <table>
                <tr><td>Sold out</td><td>$150.00</td></tr>
              </table>
            </body></html>
        "#;
        let summary = parse(html);
        assert_eq!(summary.lowest_price, Some(89.99));
        assert_eq!(summary.num_listings, None);
        assert_eq!(summary.computed_min_price, None);
        assert!(summary.all_prices.is_empty());
    }

    #[test]
    fn test_fallback_to_first_document_amount() {
        let html = "<html><body><p>Tickets from $75.50 and up</p></body></html>";
        let summary = parse(html);
        assert_eq!(summary.lowest_price, Some(75.5));
        assert_eq!(summary.median_sale, None);
    }

    #[test]
    fn test_first_priced_cell_wins_per_row() {
        let html = r#"
            <table>
              <tr><td>$95.00</td><td>$200.00</td><td>Buy</td></tr>
            </table>
        "#;
        let summary = parse(html);
        assert_eq!(summary.all_prices, vec![95.0]);
        assert_eq!(summary.num_listings, Some(1));
    }

    #[test]
    fn test_buy_token_is_word_bounded() {
        let html = r#"
            <table>
              <tr><td>Buyer protection info</td><td>$10.00</td></tr>
            </table>
        "#;
        let summary = parse(html);
        assert_eq!(summary.num_listings, None);
        assert!(summary.all_prices.is_empty());
    }

    #[test]
    fn test_prices_sorted_ascending() {
        let html = r#"
            <table>
              <tr><td>Buy</td><td>$30.00</td></tr>
              <tr><td>Buy</td><td>$10.00</td></tr>
              <tr><td>Buy</td><td>$20.00</td></tr>
            </table>
        "#;
        let summary = parse(html);
        assert!(summary
            .all_prices
            .windows(2)
            .all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn test_label_without_amount_falls_through() {
        // The labeled widget holds no amount, so the document fallback runs
        let html = r#"
            <html><body>
              <div><span>Lowest Price</span><span>TBD</span></div>
              <p>Resale from $60.00</p>
            </body></html>
        "#;
        let summary = parse(html);
        assert_eq!(summary.lowest_price, Some(60.0));
    }

    #[test]
    fn test_garbage_input_does_not_panic() {
        let summary = parse("<<<<not html at all \u{0000} ]]>");
        assert_eq!(summary.lowest_price, None);
        assert_eq!(summary.num_listings, None);
        assert!(summary.all_prices.is_empty());
    }
}
