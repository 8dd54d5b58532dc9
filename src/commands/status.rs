use crate::services::HistoryStore;
use crate::utils::{format_usd, get_data_dir};

pub fn run() {
    println!("📊 Price History Status\n");

    match show_status() {
        Ok(()) => {}
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn show_status() -> Result<(), Box<dyn std::error::Error>> {
    let path = get_data_dir().join("price_history.csv");

    if !path.exists() {
        println!("⚠️  No history found. Run 'monitor' first.");
        return Ok(());
    }

    let content = std::fs::read_to_string(&path)?;
    let record_count = content.lines().count().saturating_sub(1);

    if record_count == 0 {
        println!("⚠️  History file exists but holds no observations yet.");
        return Ok(());
    }

    println!("🔹 {} observation(s) recorded", record_count);

    let first_ts = content.lines().nth(1).map(extract_timestamp);
    let last_ts = content.lines().last().map(extract_timestamp);
    println!("   First: {}", first_ts.unwrap_or_else(|| "N/A".to_string()));
    println!("   Last:  {}", last_ts.unwrap_or_else(|| "N/A".to_string()));

    let store = HistoryStore::new(path.clone());
    println!("   All-time low: {}", format_usd(store.min_lowest_price_ever()));

    if let Some(last) = store.last_observation() {
        println!("   Last lowest:  {}", format_usd(last.lowest_price));
        println!(
            "   Last listings: {}",
            last.num_listings
                .map(|n| n.to_string())
                .unwrap_or_else(|| "N/A".to_string())
        );
    }

    println!("\n💡 History stored at {}", path.display());
    Ok(())
}

fn extract_timestamp(line: &str) -> String {
    line.split(',').next().unwrap_or("N/A").to_string()
}
