//! Available-products rows from `/item/get` bodies.

use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::model::Item;
use crate::record::FlatRecord;

pub const ITEM_PRODUCT_COLUMNS: [&str; 3] = ["institution_id", "item_id", "available_product"];

/// One row per available product per item.
///
/// An item that reports no product list at all still gets a single row with a
/// null product; an empty list produces nothing.
pub fn flatten_available_products(responses: &[Value]) -> Vec<FlatRecord> {
    let mut records = Vec::new();

    for raw in responses {
        let request_id = raw
            .get("request_id")
            .and_then(Value::as_str)
            .unwrap_or("N/A");

        let Some(item_value) = raw.get("item").filter(|v| v.is_object()) else {
            warn!(request_id, "skipping entry with missing or invalid item");
            continue;
        };

        let item = match Item::deserialize(item_value) {
            Ok(item) => item,
            Err(err) => {
                warn!(request_id, error = %err, "skipping unreadable item");
                continue;
            }
        };

        let (Some(institution_id), Some(item_id)) = (&item.institution_id, &item.item_id) else {
            warn!(request_id, "skipping item without institution_id or item_id");
            continue;
        };

        match &item.available_products {
            Some(products) if !products.is_empty() => {
                for product in products {
                    records.push(product_row(institution_id, item_id, Value::from(product.as_str())));
                }
            }
            None => records.push(product_row(institution_id, item_id, Value::Null)),
            Some(_) => warn!(
                item_id = %item_id,
                institution_id = %institution_id,
                "item lists no available products"
            ),
        }
    }

    info!(records = records.len(), "extracted available products");
    records
}

fn product_row(institution_id: &str, item_id: &str, product: Value) -> FlatRecord {
    let mut row = FlatRecord::new();
    row.set("institution_id", institution_id);
    row.set("item_id", item_id);
    row.set("available_product", product);
    row
}
