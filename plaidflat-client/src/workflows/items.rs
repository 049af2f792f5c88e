use plaidflat_core::{flatten_available_products, ITEM_PRODUCT_COLUMNS};
use plaidflat_ingest::{remove_stale, write_json, write_records};
use serde_json::Value;
use std::path::Path;
use tracing::warn;

use super::{collect_bodies, RunSummary};
use crate::client::{DataCall, SandboxClient};
use crate::transport::Transport;

pub const JSON_FILE: &str = "items.json";
pub const CSV_FILE: &str = "items.csv";

/// Fetch `/item/get` for each seed institution. Writes the raw bodies as a JSON
/// list and one CSV row per available product.
pub async fn run_items<T: Transport>(
    client: &SandboxClient<T>,
    data_dir: &Path,
    institution_ids: &[String],
) -> RunSummary {
    let json_path = data_dir.join(JSON_FILE);
    let csv_path = data_dir.join(CSV_FILE);
    remove_stale(&[json_path.clone(), csv_path.clone()]);

    let mut summary = RunSummary::new("items");
    let bodies: Vec<Value> = collect_bodies(client, institution_ids, DataCall::Item, &mut summary)
        .await
        .into_iter()
        .map(|(_, body)| body)
        .collect();
    if bodies.is_empty() {
        warn!("no item data collected, writing empty outputs");
    }

    summary.persist(&json_path, write_json(&json_path, &bodies));

    let records = flatten_available_products(&bodies);
    summary.records = records.len();
    let result = write_records(&csv_path, &records, &ITEM_PRODUCT_COLUMNS).map(drop);
    summary.persist(&csv_path, result);

    summary
}
