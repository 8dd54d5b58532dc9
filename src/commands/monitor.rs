use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

use crate::config::MonitorConfig;
use crate::worker;

pub async fn run(config_path: PathBuf, once: bool) {
    let mut config = match MonitorConfig::from_file(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e);
            eprintln!("   Copy tixwatch.example.toml to {} and edit it first.", config_path.display());
            std::process::exit(1);
        }
    };

    if once {
        config.run_once = true;
    }

    // Ctrl-C sets the stop flag; the loop observes it at its wait ticks
    let stop = Arc::new(AtomicBool::new(false));
    let stop_flag = stop.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Stopping...");
        stop_flag.store(true, Ordering::Relaxed);
    });

    if let Err(e) = worker::run_monitor(config, stop).await {
        eprintln!("❌ Monitor failed: {}", e);
        std::process::exit(1);
    }
}
