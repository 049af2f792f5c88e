//! Seed CSV reading.
//!
//! The seed file is usually the `institutions.csv` written by the
//! institutions workflow, so it carries many columns; only one is read.

use anyhow::{bail, Context, Result};
use std::collections::HashSet;
use std::path::Path;

/// Unique, non-empty values of `column`, in file order.
pub fn read_column(path: impl AsRef<Path>, column: &str) -> Result<Vec<String>> {
    let path = path.as_ref();
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let headers = rdr
        .headers()
        .with_context(|| format!("reading header of {}", path.display()))?
        .clone();
    let Some(idx) = headers.iter().position(|h| h.trim() == column) else {
        bail!("column '{}' not found in {}", column, path.display());
    };

    let mut seen = HashSet::new();
    let mut values = Vec::new();
    for result in rdr.records() {
        let record = result.with_context(|| format!("reading {}", path.display()))?;
        let value = record.get(idx).unwrap_or("").trim();
        if value.is_empty() || !seen.insert(value.to_string()) {
            continue;
        }
        values.push(value.to_string());
    }

    Ok(values)
}
