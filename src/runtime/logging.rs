use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Log file name inside the data directory.
pub const LOG_FILE: &str = "sonata.log";

/// Send `tracing` output to `<data_dir>/sonata.log`, filtered by `SONATA_LOG`
/// (default `info`). The terminal belongs to the UI, so nothing is written
/// to stdout. Failure leaves logging disabled.
pub fn init_logging(data_dir: &Path) {
    let filter = EnvFilter::try_from_env("SONATA_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    let file = fs::create_dir_all(data_dir).and_then(|()| {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(data_dir.join(LOG_FILE))
    });
    let file = match file {
        Ok(f) => f,
        Err(e) => {
            eprintln!("sonata: cannot open log file, logging disabled: {e}");
            return;
        }
    };

    let result = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(false)
        .with_writer(Mutex::new(file))
        .try_init();
    if let Err(e) = result {
        eprintln!("sonata: cannot initialise logging: {e}");
    }
}
