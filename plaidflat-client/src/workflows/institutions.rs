use anyhow::{Context, Result};
use plaidflat_core::flatten_listing;
use plaidflat_ingest::{remove_stale, write_json, write_records};
use std::path::Path;
use tracing::{error, info};

use super::RunSummary;
use crate::client::SandboxClient;
use crate::settings::InstitutionQuery;
use crate::transport::Transport;

pub const JSON_FILE: &str = "institutions.json";
pub const CSV_FILE: &str = "institutions.csv";

/// Header written when the listing comes back empty, so the seed file still
/// has the column the other workflows read.
const FALLBACK_COLUMNS: &[&str] = &["institution_id", "name"];

/// Fetch the institutions listing and write it as JSON and CSV. The CSV is the
/// seed file for every other workflow.
///
/// Unlike the per-institution workflows a failed call here is an error.
pub async fn run_institutions<T: Transport>(
    client: &SandboxClient<T>,
    data_dir: &Path,
    query: &InstitutionQuery,
) -> Result<RunSummary> {
    let json_path = data_dir.join(JSON_FILE);
    let csv_path = data_dir.join(CSV_FILE);
    remove_stale(&[json_path.clone(), csv_path.clone()]);

    let mut summary = RunSummary::new("institutions");
    let body = client
        .institutions(query)
        .await
        .context("fetch institutions listing")?;

    summary.persist(&json_path, write_json(&json_path, &body));

    match flatten_listing(&body, "institutions") {
        Some(records) => {
            info!(count = records.len(), "institutions listed");
            summary.records = records.len();
            let result = write_records(&csv_path, &records, FALLBACK_COLUMNS).map(drop);
            summary.persist(&csv_path, result);
        }
        None => {
            error!("response has no 'institutions' list; CSV not written");
        }
    }

    Ok(summary)
}
