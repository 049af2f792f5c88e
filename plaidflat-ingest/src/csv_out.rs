//! CSV writer for flattened records.

use anyhow::{Context, Result};
use plaidflat_core::FlatRecord;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::info;

/// Write `records` to `path`, overwriting any existing file.
///
/// Columns are the union of every record's columns in first-seen order; a
/// record without a column gets an empty cell. When there are no records the
/// file holds only the `fallback_columns` header (or nothing at all if that is
/// empty too). Returns the number of data rows written.
pub fn write_records(
    path: impl AsRef<Path>,
    records: &[FlatRecord],
    fallback_columns: &[&str],
) -> Result<usize> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }

    let columns = if records.is_empty() {
        fallback_columns.iter().map(|c| c.to_string()).collect()
    } else {
        union_columns(records)
    };

    let mut wtr = csv::Writer::from_path(path).with_context(|| format!("create {}", path.display()))?;
    if !columns.is_empty() {
        wtr.write_record(&columns)
            .with_context(|| format!("write header to {}", path.display()))?;
    }
    for record in records {
        wtr.write_record(columns.iter().map(|c| record.cell(c)))
            .with_context(|| format!("write row to {}", path.display()))?;
    }
    wtr.flush().with_context(|| format!("flush {}", path.display()))?;

    info!(
        path = %path.display(),
        rows = records.len(),
        columns = columns.len(),
        "wrote CSV"
    );
    Ok(records.len())
}

fn union_columns(records: &[FlatRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut columns = Vec::new();
    for record in records {
        for column in record.columns() {
            if seen.insert(column) {
                columns.push(column.to_string());
            }
        }
    }
    columns
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn record(pairs: &[(&str, Value)]) -> FlatRecord {
        let mut r = FlatRecord::new();
        for (k, v) in pairs {
            r.set(*k, v.clone());
        }
        r
    }

    #[test]
    fn test_union_of_columns_in_first_seen_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("transactions.csv");
        let records = vec![
            record(&[("tx_id", "t1".into()), ("tx_amount", 12.5.into())]),
            record(&[("tx_id", "t2".into()), ("acc_name", "Checking, main".into()), ("flag", true.into())]),
        ];

        let rows = write_records(&path, &records, &[]).unwrap();
        assert_eq!(rows, 2);

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "tx_id,tx_amount,acc_name,flag");
        assert_eq!(lines[1], "t1,12.5,,");
        assert_eq!(lines[2], "t2,,\"Checking, main\",true");
    }

    #[test]
    fn test_empty_records_write_fallback_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("items.csv");
        write_records(&path, &[], &["institution_id", "item_id", "available_product"]).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "institution_id,item_id,available_product\n"
        );

        let bare = dir.path().join("bare.csv");
        write_records(&bare, &[], &[]).unwrap();
        assert_eq!(fs::read_to_string(&bare).unwrap(), "");
    }

    #[test]
    fn test_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("identity.csv");
        fs::write(&path, "stale,data\n1,2\n3,4\n").unwrap();
        write_records(&path, &[record(&[("a", Value::Null), ("b", 1.into())])], &[]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "a,b\n,1\n");
    }
}
