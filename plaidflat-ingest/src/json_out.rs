//! Pretty-printed JSON output files.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::info;

/// Serialize `value` as indented JSON to `path`, overwriting it.
pub fn write_json<T: Serialize + ?Sized>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let s = serde_json::to_string_pretty(value).context("serialize JSON output")?;
    fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
    info!(path = %path.display(), "wrote JSON");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_writes_and_keeps_key_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("items.json");
        let bodies = vec![json!({"item": {"item_id": "i"}, "status": null, "request_id": "r"})];

        write_json(&path, &bodies).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let back: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(back, Value::Array(bodies));
        assert!(text.find("\"item\"").unwrap() < text.find("\"request_id\"").unwrap());
    }
}
