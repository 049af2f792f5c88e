//! Identity flattener: one row per (account, owner) pair.
//!
//! Every row has the same columns in the same order ([`identity_columns`]).
//! An account without owners still produces a row, with every owner column
//! set to null.

use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::model::{Account, AccountsResponse, ContactPoint, Item, Owner};
use crate::record::FlatRecord;
use crate::select::{select_primary, select_ranked, Selection};

pub const ACCOUNT_COLUMNS: [&str; 14] = [
    "request_id_source",
    "item_id",
    "item_institution_id",
    "item_institution_name",
    "account_id",
    "account_name",
    "account_official_name",
    "account_type",
    "account_subtype",
    "account_mask",
    "account_balance_available",
    "account_balance_current",
    "account_balance_currency",
    "account_balance_limit",
];

pub const OWNER_COLUMNS: [&str; 13] = [
    "owner_name",
    "owner_address_street",
    "owner_address_city",
    "owner_address_region",
    "owner_address_postal_code",
    "owner_address_country",
    "owner_address_primary",
    "owner_email_data",
    "owner_email_primary",
    "owner_email_type",
    "owner_phone_data",
    "owner_phone_primary",
    "owner_phone_type",
];

/// Column header for identity CSVs, including when there are no rows.
pub fn identity_columns() -> Vec<&'static str> {
    ACCOUNT_COLUMNS.iter().chain(OWNER_COLUMNS.iter()).copied().collect()
}

/// Flatten a batch of `/identity/get` bodies.
pub fn flatten_identity(responses: &[Value]) -> Vec<FlatRecord> {
    info!(responses = responses.len(), "flattening identity responses");
    let mut records = Vec::new();

    for (index, raw) in responses.iter().enumerate() {
        if !raw.is_object() {
            warn!(index, "skipping identity response that is not an object");
            continue;
        }

        let response = match AccountsResponse::deserialize(raw) {
            Ok(r) => r,
            Err(err) => {
                warn!(index, error = %err, "skipping unreadable identity response");
                continue;
            }
        };

        let request_id = response
            .request_id
            .clone()
            .unwrap_or_else(|| format!("N/A_resp_idx_{index}"));

        if response.accounts.is_empty() {
            info!(request_id = %request_id, "no accounts in response, skipping");
            continue;
        }

        for account in &response.accounts {
            let base = account_row(&request_id, &response.item, account);

            if account.owners.is_empty() {
                let mut row = base;
                for column in OWNER_COLUMNS {
                    row.set(column, Value::Null);
                }
                records.push(row);
                continue;
            }

            for owner in &account.owners {
                let mut row = base.clone();
                owner_columns(&mut row, owner);
                records.push(row);
            }
        }
    }

    info!(records = records.len(), "finished flattening identity data");
    records
}

fn account_row(request_id: &str, item: &Item, account: &Account) -> FlatRecord {
    let mut row = FlatRecord::new();
    row.set("request_id_source", request_id);
    row.set("item_id", item.item_id.clone());
    row.set("item_institution_id", item.institution_id.clone());
    row.set("item_institution_name", item.institution_name.clone());
    row.set("account_id", account.account_id.clone());
    row.set("account_name", account.name.clone());
    row.set("account_official_name", account.official_name.clone());
    row.set("account_type", account.account_type.clone());
    row.set("account_subtype", account.subtype.clone());
    row.set("account_mask", account.mask.clone());
    row.set("account_balance_available", account.balances.available.clone());
    row.set("account_balance_current", account.balances.current.clone());
    row.set(
        "account_balance_currency",
        account.balances.iso_currency_code.clone(),
    );
    row.set("account_balance_limit", account.balances.limit.clone());
    row
}

fn owner_columns(row: &mut FlatRecord, owner: &Owner) {
    row.set("owner_name", owner.names.first().cloned());

    let address = select_primary(&owner.addresses, |a| a.primary);
    let data = address.map(|s| &s.item.data);
    row.set("owner_address_street", data.and_then(|d| d.street.clone()));
    row.set("owner_address_city", data.and_then(|d| d.city.clone()));
    row.set("owner_address_region", data.and_then(|d| d.region.clone()));
    row.set(
        "owner_address_postal_code",
        data.and_then(|d| d.postal_code.clone()),
    );
    row.set("owner_address_country", data.and_then(|d| d.country.clone()));
    // null when there was no address at all, false when the first one was a fallback
    row.set("owner_address_primary", address.map(|s| s.primary));

    let email = select_primary(&owner.emails, |e| e.primary);
    contact_columns(row, "owner_email", email);

    let phone = select_ranked(
        &owner.phone_numbers,
        |p| p.primary,
        |p| p.kind.as_deref() == Some("mobile"),
    );
    contact_columns(row, "owner_phone", phone);
}

fn contact_columns(row: &mut FlatRecord, prefix: &str, selection: Option<Selection<'_, ContactPoint>>) {
    row.set(
        format!("{prefix}_data"),
        selection.and_then(|s| s.item.data.clone()),
    );
    row.set(format!("{prefix}_primary"), selection.map(|s| s.primary));
    row.set(
        format!("{prefix}_type"),
        selection.and_then(|s| s.item.kind.clone()),
    );
}
