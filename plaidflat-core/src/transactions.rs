//! Transaction flattener: one row per transaction, joined with its account and
//! the shared item.
//!
//! Transaction fields are flattened two levels deep: scalars become `tx_<key>`,
//! object members become `tx_<key>_<subkey>`, and anything nested below that is
//! kept as compact JSON text so the column set stays bounded.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::model::{Account, Item, Transaction};
use crate::record::FlatRecord;

/// Accounts and transactions accumulated across institutions, written to
/// `transactions.json` and flattened into `transactions.csv`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionBundle {
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    /// Item context applied to every row (the first non-empty one seen)
    #[serde(default)]
    pub item: Item,
    #[serde(default)]
    pub metadata: BundleMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BundleMetadata {
    pub processed_institution_ids: Vec<String>,
    pub total_accounts_retrieved: usize,
    pub total_transactions_retrieved: usize,
}

impl TransactionBundle {
    /// Add one institution's accounts and transactions, tagging each with the
    /// seed institution ID they were fetched for.
    pub fn push_institution(
        &mut self,
        institution_id: &str,
        mut accounts: Vec<Account>,
        mut transactions: Vec<Transaction>,
        item: Item,
    ) {
        for account in &mut accounts {
            account.institution_id_source = Some(institution_id.to_string());
        }
        for tx in &mut transactions {
            tx.tag_source(institution_id);
        }

        self.accounts.append(&mut accounts);
        self.transactions.append(&mut transactions);
        if self.item.is_empty() && !item.is_empty() {
            self.item = item;
        }
    }

    /// Record which institutions were processed and the final totals.
    pub fn finish(&mut self, processed_institution_ids: &[String]) {
        self.metadata = BundleMetadata {
            processed_institution_ids: processed_institution_ids.to_vec(),
            total_accounts_retrieved: self.accounts.len(),
            total_transactions_retrieved: self.transactions.len(),
        };
    }
}

/// Flatten every transaction in the bundle.
pub fn flatten_transactions(bundle: &TransactionBundle) -> Vec<FlatRecord> {
    // Last account wins when IDs repeat.
    let mut lookup: HashMap<&str, &Account> = HashMap::new();
    for account in &bundle.accounts {
        match account.account_id.as_deref() {
            Some(id) => {
                lookup.insert(id, account);
            }
            None => warn!("account without account_id cannot be joined"),
        }
    }

    info!(
        transactions = bundle.transactions.len(),
        accounts = lookup.len(),
        "flattening transactions"
    );

    bundle
        .transactions
        .iter()
        .map(|tx| {
            let mut row = FlatRecord::new();
            transaction_columns(&mut row, tx);

            match tx.account_id().and_then(|id| lookup.get(id)) {
                Some(account) => account_columns(&mut row, account),
                None => debug!(account_id = ?tx.account_id(), "no matching account for transaction"),
            }

            if !bundle.item.is_empty() {
                row.set("item_id", bundle.item.item_id.clone());
                row.set("item_institution_id", bundle.item.institution_id.clone());
                row.set("item_webhook", bundle.item.webhook.clone());
            }

            if !row.contains("institution_id_source") {
                let source = tx
                    .source_tag()
                    .map(Value::from)
                    .or_else(|| {
                        row.get("tx_institution_id_source")
                            .filter(|v| !v.is_null())
                            .cloned()
                    })
                    .or_else(|| bundle.item.institution_id.clone().map(Value::from));
                if let Some(source) = source {
                    row.set("institution_id_source", source);
                }
            }

            row
        })
        .collect()
}

fn transaction_columns(row: &mut FlatRecord, tx: &Transaction) {
    for (key, value) in &tx.fields {
        match value {
            Value::Object(members) => {
                for (sub_key, sub_value) in members {
                    let column = format!("tx_{key}_{sub_key}");
                    match sub_value {
                        Value::Object(_) | Value::Array(_) => row.set(column, sub_value.to_string()),
                        scalar => row.set(column, scalar.clone()),
                    }
                }
            }
            Value::Array(entries) if key == "counterparties" => {
                counterparty_columns(row, entries);
            }
            // Other lists have no stable column mapping.
            Value::Array(_) => {}
            scalar => row.set(format!("tx_{key}"), scalar.clone()),
        }
    }
}

fn counterparty_columns(row: &mut FlatRecord, entries: &[Value]) {
    let Some(first) = entries.first() else {
        return;
    };
    row.set(
        "tx_counterparties_0_name",
        first.get("name").cloned().unwrap_or(Value::Null),
    );
    row.set(
        "tx_counterparties_0_type",
        first.get("type").cloned().unwrap_or(Value::Null),
    );
    row.set("tx_counterparties", Value::Array(entries.to_vec()).to_string());
}

fn account_columns(row: &mut FlatRecord, account: &Account) {
    let balances = &account.balances;
    row.set("acc_account_id", account.account_id.clone());
    row.set("acc_name", account.name.clone());
    row.set("acc_official_name", account.official_name.clone());
    row.set("acc_subtype", account.subtype.clone());
    row.set("acc_type", account.account_type.clone());
    row.set("acc_balance_available", balances.available.clone());
    row.set("acc_balance_current", balances.current.clone());
    row.set(
        "acc_balance_iso_currency_code",
        balances.iso_currency_code.clone(),
    );
    row.set("acc_balance_limit", balances.limit.clone());
    row.set(
        "acc_balance_unofficial_currency_code",
        balances.unofficial_currency_code.clone(),
    );
    row.set("acc_holder_category", account.holder_category.clone());
    row.set("acc_mask", account.mask.clone());
    row.set(
        "acc_institution_id_source",
        account.institution_id_source.clone(),
    );
}
