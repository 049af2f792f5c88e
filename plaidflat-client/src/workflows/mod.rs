//! The four fetch-and-flatten workflows.
//!
//! Each workflow removes its own stale outputs, walks the seed institutions one
//! at a time, skips institutions whose calls fail, and writes whatever it
//! collected. Output write failures are logged and counted in the summary.

mod identity;
mod institutions;
mod items;
mod transactions;

pub use identity::run_identity;
pub use institutions::run_institutions;
pub use items::run_items;
pub use transactions::run_transactions;

use anyhow::{bail, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::client::{DataCall, SandboxClient};
use crate::transport::Transport;

pub const SEED_COLUMN: &str = "institution_id";

/// Outcome of one workflow run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub workflow: &'static str,
    pub institutions_requested: usize,
    pub institutions_fetched: usize,
    pub records: usize,
    pub written: Vec<PathBuf>,
    pub write_failures: usize,
}

impl RunSummary {
    fn new(workflow: &'static str) -> Self {
        Self {
            workflow,
            ..Self::default()
        }
    }

    fn persist(&mut self, path: &Path, result: Result<()>) {
        match result {
            Ok(()) => self.written.push(path.to_path_buf()),
            Err(err) => {
                error!(path = %path.display(), error = %format!("{err:#}"), "failed to write output");
                self.write_failures += 1;
            }
        }
    }

    pub fn log(&self) {
        info!(
            workflow = self.workflow,
            institutions_requested = self.institutions_requested,
            institutions_fetched = self.institutions_fetched,
            records = self.records,
            files_written = self.written.len(),
            write_failures = self.write_failures,
            "workflow finished"
        );
        if self.records == 0 {
            warn!(workflow = self.workflow, "workflow produced no records");
        }
    }
}

/// Institution IDs from the seed CSV. A missing file or an empty list is an error.
pub fn load_seed_ids(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        bail!(
            "seed file not found: {} (run `plaidflat institutions` first)",
            path.display()
        );
    }
    let ids = plaidflat_ingest::read_column(path, SEED_COLUMN)?;
    if ids.is_empty() {
        bail!("no institution IDs found in {}", path.display());
    }
    info!(count = ids.len(), ids = ?ids, "institution IDs to process");
    Ok(ids)
}

/// Token, wait and data call for each institution in turn. Failed
/// institutions are logged and left out.
async fn collect_bodies<T: Transport>(
    client: &SandboxClient<T>,
    institution_ids: &[String],
    call: DataCall<'_>,
    summary: &mut RunSummary,
) -> Vec<(String, Value)> {
    summary.institutions_requested = institution_ids.len();
    let mut bodies = Vec::new();

    for institution_id in institution_ids {
        info!(institution_id = %institution_id, "--- processing institution ---");
        match client.fetch_for_institution(institution_id, call).await {
            Ok(body) => {
                let keys: Vec<&str> = body
                    .as_object()
                    .map(|o| o.keys().map(String::as_str).collect())
                    .unwrap_or_default();
                info!(institution_id = %institution_id, keys = ?keys, "fetched {} data", call.label());
                bodies.push((institution_id.clone(), body));
            }
            Err(err) => {
                error!(
                    institution_id = %institution_id,
                    error = %err,
                    "could not fetch {} data, skipping institution",
                    call.label()
                );
            }
        }
    }

    summary.institutions_fetched = bodies.len();
    info!(
        fetched = bodies.len(),
        requested = institution_ids.len(),
        "all institutions processed"
    );
    bodies
}
