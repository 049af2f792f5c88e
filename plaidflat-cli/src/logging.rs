use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingSection;

/// Install the global subscriber: stdout always, plus the log file when one is
/// configured. `RUST_LOG` overrides `logging.level`.
pub fn init(cfg: &LoggingSection) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cfg.level))
        .with_context(|| format!("invalid logging.level {:?}", cfg.level))?;

    let file_layer = match &cfg.file {
        Some(path) => {
            let file = open_log_file(path, cfg.file_size_limit)?;
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .try_init()
        .context("install tracing subscriber")?;
    Ok(())
}

/// Open `path` for appending, clearing it first when it is over `size_limit` bytes.
fn open_log_file(path: &Path, size_limit: u64) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }

    let oversized = fs::metadata(path)
        .map(|m| m.len() > size_limit)
        .unwrap_or(false);
    if oversized {
        return File::create(path).with_context(|| format!("truncate {}", path.display()));
    }

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open {}", path.display()))
}
