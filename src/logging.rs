use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

// Logs go to a file, the terminal belongs to the UI
pub fn setup(log_file: &Path, filter: &str) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(dir) = log_file.parent() {
        fs::create_dir_all(dir)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(log_file)?;

    let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .with_filter(env_filter);

    tracing_subscriber::registry().with(fmt_layer).try_init()?;

    Ok(())
}
