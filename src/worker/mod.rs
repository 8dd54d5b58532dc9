pub mod monitor_worker;

pub use monitor_worker::run as run_monitor;
