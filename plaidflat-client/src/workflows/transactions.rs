use plaidflat_core::{flatten_transactions, AccountsResponse, TransactionBundle};
use plaidflat_ingest::{remove_stale, write_json, write_records};
use serde::Deserialize;
use std::path::Path;
use tracing::{error, info, warn};

use super::{collect_bodies, RunSummary};
use crate::client::{DataCall, SandboxClient};
use crate::settings::TransactionWindow;
use crate::transport::Transport;

pub const JSON_FILE: &str = "transactions.json";
pub const CSV_FILE: &str = "transactions.csv";

/// Fetch `/transactions/get` for each seed institution, accumulate accounts and
/// transactions into one bundle, and write the bundle plus its flattened rows.
pub async fn run_transactions<T: Transport>(
    client: &SandboxClient<T>,
    data_dir: &Path,
    institution_ids: &[String],
    window: &TransactionWindow,
) -> RunSummary {
    let json_path = data_dir.join(JSON_FILE);
    let csv_path = data_dir.join(CSV_FILE);
    remove_stale(&[json_path.clone(), csv_path.clone()]);

    let mut summary = RunSummary::new("transactions");
    info!(
        start_date = %window.start_date,
        end_date = %window.end_date,
        count = window.count,
        offset = window.offset,
        "transaction window"
    );

    let bodies = collect_bodies(
        client,
        institution_ids,
        DataCall::Transactions(window),
        &mut summary,
    )
    .await;

    let mut bundle = TransactionBundle::default();
    let mut processed = Vec::new();
    for (institution_id, body) in bodies {
        match AccountsResponse::deserialize(body) {
            Ok(response) => {
                info!(
                    institution_id = %institution_id,
                    accounts = response.accounts.len(),
                    transactions = response.transactions.len(),
                    "transactions response"
                );
                bundle.push_institution(
                    &institution_id,
                    response.accounts,
                    response.transactions,
                    response.item,
                );
                processed.push(institution_id);
            }
            Err(err) => {
                error!(institution_id = %institution_id, error = %err, "unreadable transactions response, skipping");
            }
        }
    }
    bundle.finish(&processed);

    if bundle.transactions.is_empty() {
        warn!(
            accounts = bundle.accounts.len(),
            "no transactions collected"
        );
    }

    summary.persist(&json_path, write_json(&json_path, &bundle));

    let records = flatten_transactions(&bundle);
    summary.records = records.len();
    let result = write_records(&csv_path, &records, &[]).map(drop);
    summary.persist(&csv_path, result);

    summary
}
