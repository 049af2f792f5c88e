//! Typed views over sandbox API response bodies.
//!
//! Every entity keeps the fields the flatteners read as typed members and
//! parks everything else in an `extra` bag, so a record written back to JSON
//! still carries fields this crate does not know about.
//!
//! Sequences are parsed leniently: an entry that is not an object, or whose
//! known fields have the wrong JSON type, is dropped with a warning instead of
//! failing the enclosing record.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};

/// A linked institution connection (`item` in the API bodies)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(default, deserialize_with = "lenient_opt", skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt", skip_serializing_if = "Option::is_none")]
    pub institution_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt", skip_serializing_if = "Option::is_none")]
    pub institution_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt", skip_serializing_if = "Option::is_none")]
    pub webhook: Option<String>,
    /// `None` when the API omitted the list or sent `null`
    #[serde(
        default,
        deserialize_with = "lenient_opt_seq",
        skip_serializing_if = "Option::is_none"
    )]
    pub available_products: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Item {
    pub fn is_empty(&self) -> bool {
        self.item_id.is_none()
            && self.institution_id.is_none()
            && self.institution_name.is_none()
            && self.webhook.is_none()
            && self.available_products.is_none()
            && self.extra.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Balances {
    #[serde(default, deserialize_with = "lenient_opt", skip_serializing_if = "Option::is_none")]
    pub available: Option<Number>,
    #[serde(default, deserialize_with = "lenient_opt", skip_serializing_if = "Option::is_none")]
    pub current: Option<Number>,
    #[serde(default, deserialize_with = "lenient_opt", skip_serializing_if = "Option::is_none")]
    pub iso_currency_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt", skip_serializing_if = "Option::is_none")]
    pub limit: Option<Number>,
    #[serde(default, deserialize_with = "lenient_opt", skip_serializing_if = "Option::is_none")]
    pub unofficial_currency_code: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Account {
    #[serde(default, deserialize_with = "lenient_opt", skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt", skip_serializing_if = "Option::is_none")]
    pub official_name: Option<String>,
    #[serde(
        rename = "type",
        default,
        deserialize_with = "lenient_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub account_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt", skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt", skip_serializing_if = "Option::is_none")]
    pub mask: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt", skip_serializing_if = "Option::is_none")]
    pub holder_category: Option<String>,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub balances: Balances,
    #[serde(
        default,
        deserialize_with = "lenient_seq",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub owners: Vec<Owner>,
    /// Seed institution this account was fetched for
    #[serde(default, deserialize_with = "lenient_opt", skip_serializing_if = "Option::is_none")]
    pub institution_id_source: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Identity information for one account holder
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Owner {
    #[serde(default, deserialize_with = "lenient_seq")]
    pub names: Vec<String>,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub addresses: Vec<Address>,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub emails: Vec<ContactPoint>,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub phone_numbers: Vec<ContactPoint>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub primary: bool,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub data: AddressData,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddressData {
    #[serde(default, deserialize_with = "lenient_opt", skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt", skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt", skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt", skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt", skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An email address or phone number entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactPoint {
    #[serde(default, deserialize_with = "lenient_opt", skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub primary: bool,
    #[serde(
        rename = "type",
        default,
        deserialize_with = "lenient_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub kind: Option<String>,
}

/// A transaction kept as its ordered JSON object.
///
/// Transactions are flattened field by field, so the source key order is the
/// only schema they need.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transaction {
    pub fields: Map<String, Value>,
}

impl Transaction {
    pub const SOURCE_TAG: &'static str = "institution_id_source";

    pub fn account_id(&self) -> Option<&str> {
        self.fields.get("account_id").and_then(Value::as_str)
    }

    /// Seed institution recorded by [`Transaction::tag_source`]
    pub fn source_tag(&self) -> Option<&str> {
        self.fields.get(Self::SOURCE_TAG).and_then(Value::as_str)
    }

    pub fn tag_source(&mut self, institution_id: &str) {
        self.fields
            .insert(Self::SOURCE_TAG.to_string(), Value::from(institution_id));
    }
}

/// The parts of an `/identity/get`, `/transactions/get` or `/accounts/get`
/// body that carry accounts.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AccountsResponse {
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub item: Item,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub accounts: Vec<Account>,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub transactions: Vec<Transaction>,
    #[serde(default, deserialize_with = "lenient_opt")]
    pub request_id: Option<String>,
}

/// Parse every element of a JSON array into `T`, dropping the ones that fail.
///
/// `null` and a missing value both yield an empty vector. A value that is not
/// an array is logged and treated as empty.
pub fn parse_seq<T: DeserializeOwned>(value: Value, what: &str) -> Vec<T> {
    let entries = match value {
        Value::Null => return Vec::new(),
        Value::Array(entries) => entries,
        other => {
            tracing::warn!(field = what, found = %kind_of(&other), "expected a list, ignoring");
            return Vec::new();
        }
    };

    entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value::<T>(entry) {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                tracing::warn!(field = what, index, error = %err, "skipping malformed entry");
                None
            }
        })
        .collect()
}

fn lenient_seq<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(parse_seq(raw, std::any::type_name::<T>()))
}

fn lenient_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let raw = Value::deserialize(deserializer)?;
    if raw.is_null() {
        return Ok(T::default());
    }
    Ok(serde_json::from_value(raw).unwrap_or_else(|err| {
        tracing::warn!(
            field = std::any::type_name::<T>(),
            error = %err,
            "malformed value, using the default"
        );
        T::default()
    }))
}

/// A pass-through value of the wrong JSON type becomes `None` instead of
/// failing the record that holds it.
fn lenient_opt<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Value::deserialize(deserializer)?;
    if raw.is_null() {
        return Ok(None);
    }
    let found = kind_of(&raw);
    Ok(serde_json::from_value(raw)
        .map_err(|err| {
            tracing::warn!(
                field = std::any::type_name::<T>(),
                found,
                error = %err,
                "unexpected value type, treating as null"
            );
        })
        .ok())
}

/// Like [`lenient_seq`] but keeps "absent or null" distinct from an empty list.
fn lenient_opt_seq<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Value::deserialize(deserializer)?;
    match raw {
        Value::Null => Ok(None),
        Value::Array(_) => Ok(Some(parse_seq(raw, std::any::type_name::<T>()))),
        other => {
            tracing::warn!(
                field = std::any::type_name::<T>(),
                found = kind_of(&other),
                "expected a list, treating as null"
            );
            Ok(None)
        }
    }
}

pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_account_keeps_unknown_fields() {
        let raw = json!({
            "account_id": "acc-1",
            "type": "depository",
            "balances": {"current": 110, "available": 100.5},
            "verification_status": "automatically_verified"
        });
        let account: Account = serde_json::from_value(raw).unwrap();
        assert_eq!(account.account_type.as_deref(), Some("depository"));
        assert_eq!(account.balances.current, Some(Number::from(110)));
        assert_eq!(
            account.extra.get("verification_status"),
            Some(&json!("automatically_verified"))
        );
        let back = serde_json::to_value(&account).unwrap();
        assert_eq!(back["verification_status"], "automatically_verified");
        assert_eq!(back["balances"]["current"], 110);
    }

    #[test]
    fn test_malformed_owner_entries_are_dropped() {
        let raw = json!({
            "account_id": "acc-1",
            "owners": [
                "not an owner",
                {"names": ["Alberta Charleson"], "addresses": [42, {"primary": true, "data": {"city": "Malakoff"}}]}
            ]
        });
        let account: Account = serde_json::from_value(raw).unwrap();
        assert_eq!(account.owners.len(), 1);
        assert_eq!(account.owners[0].addresses.len(), 1);
        assert_eq!(
            account.owners[0].addresses[0].data.city.as_deref(),
            Some("Malakoff")
        );
    }

    #[test]
    fn test_null_nested_values_default() {
        let raw = json!({
            "account_id": "acc-1",
            "balances": null,
            "owners": null
        });
        let account: Account = serde_json::from_value(raw).unwrap();
        assert_eq!(account.balances, Balances::default());
        assert!(account.owners.is_empty());

        let contact: ContactPoint =
            serde_json::from_value(json!({"data": "x@example.com", "primary": null})).unwrap();
        assert!(!contact.primary);
    }

    #[test]
    fn test_response_with_malformed_item_still_parses_accounts() {
        let raw = json!({
            "item": "broken",
            "accounts": [{"account_id": "a"}, 7],
            "request_id": "req-1"
        });
        let response = AccountsResponse::deserialize(&raw).unwrap();
        assert!(response.item.is_empty());
        assert_eq!(response.accounts.len(), 1);
        assert_eq!(response.request_id.as_deref(), Some("req-1"));
    }

    #[test]
    fn test_wrong_typed_scalars_become_none() {
        let raw = json!({
            "account_id": "acc-1",
            "official_name": ["not", "a", "name"],
            "mask": 1234,
            "balances": {"available": 90, "current": "100.00", "iso_currency_code": 840},
            "owners": [{"names": ["Kept"]}]
        });
        let account: Account = serde_json::from_value(raw).unwrap();
        assert_eq!(account.account_id.as_deref(), Some("acc-1"));
        assert_eq!(account.official_name, None);
        assert_eq!(account.mask, None);
        assert_eq!(account.balances.available, Some(Number::from(90)));
        assert_eq!(account.balances.current, None);
        assert_eq!(account.balances.iso_currency_code, None);
        assert_eq!(account.owners.len(), 1);

        let item: Item = serde_json::from_value(json!({
            "item_id": "item-1",
            "institution_id": "ins_1",
            "available_products": ["auth", 7],
            "webhook": false
        }))
        .unwrap();
        assert_eq!(item.item_id.as_deref(), Some("item-1"));
        assert_eq!(item.available_products, Some(vec!["auth".to_string()]));
        assert_eq!(item.webhook, None);

        let address: Address =
            serde_json::from_value(json!({"primary": "yes", "data": {"city": "Austin", "postal_code": 78701}})).unwrap();
        assert!(!address.primary);
        assert_eq!(address.data.city.as_deref(), Some("Austin"));
        assert_eq!(address.data.postal_code, None);
    }

    #[test]
    fn test_transaction_source_tag() {
        let mut tx: Transaction =
            serde_json::from_value(json!({"transaction_id": "t1", "account_id": "a1"})).unwrap();
        assert_eq!(tx.account_id(), Some("a1"));
        assert_eq!(tx.source_tag(), None);
        tx.tag_source("ins_109508");
        assert_eq!(tx.source_tag(), Some("ins_109508"));
        let keys: Vec<_> = tx.fields.keys().cloned().collect();
        assert_eq!(keys, ["transaction_id", "account_id", "institution_id_source"]);
    }
}
