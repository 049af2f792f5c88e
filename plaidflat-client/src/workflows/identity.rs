use plaidflat_core::{flatten_identity, identity_columns};
use plaidflat_ingest::{remove_stale, write_json, write_records};
use serde_json::Value;
use std::path::Path;
use tracing::warn;

use super::{collect_bodies, RunSummary};
use crate::client::{DataCall, SandboxClient};
use crate::transport::Transport;

pub const JSON_FILE: &str = "identity.json";
pub const CSV_FILE: &str = "identity.csv";

/// Fetch `/identity/get` for each seed institution and flatten owners into
/// one row per account-owner pair.
pub async fn run_identity<T: Transport>(
    client: &SandboxClient<T>,
    data_dir: &Path,
    institution_ids: &[String],
) -> RunSummary {
    let json_path = data_dir.join(JSON_FILE);
    let csv_path = data_dir.join(CSV_FILE);
    remove_stale(&[json_path.clone(), csv_path.clone()]);

    let mut summary = RunSummary::new("identity");
    let bodies: Vec<Value> = collect_bodies(client, institution_ids, DataCall::Identity, &mut summary)
        .await
        .into_iter()
        .map(|(_, body)| body)
        .collect();
    if bodies.is_empty() {
        warn!("no identity data collected, writing empty outputs");
    }

    summary.persist(&json_path, write_json(&json_path, &bodies));

    let records = flatten_identity(&bodies);
    summary.records = records.len();
    let result = write_records(&csv_path, &records, &identity_columns()).map(drop);
    summary.persist(&csv_path, result);

    summary
}
