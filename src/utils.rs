use std::path::PathBuf;

/// Get data directory from environment variable or use default
pub fn get_data_dir() -> PathBuf {
    std::env::var("TIXWATCH_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"))
}

/// Format an optional dollar amount for display, "N/A" when absent or not finite
pub fn format_usd(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("${}", group_thousands(v)),
        _ => "N/A".to_string(),
    }
}

/// Render with two decimals and comma-grouped integer digits
fn group_thousands(v: f64) -> String {
    let formatted = format!("{:.2}", v.abs());
    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::new();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if v < 0.0 { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, frac_part)
}
