//! Settings passed explicitly into the client and workflows.
//!
//! These are the `[api]`, `[institutions]` and `[transactions]` sections of
//! the CLI config file; credentials come from the environment instead.

use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ClientError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub base_url: String,
    pub create_public_token_path: String,
    pub exchange_token_path: String,
    pub institutions_path: String,
    pub items_path: String,
    pub identity_path: String,
    pub transactions_path: String,
    pub webhook_url: String,
    /// Courtesy pause between token acquisition and the data call
    pub wait_secs: u64,
    pub timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "https://sandbox.plaid.com".to_string(),
            create_public_token_path: "/sandbox/public_token/create".to_string(),
            exchange_token_path: "/item/public_token/exchange".to_string(),
            institutions_path: "/institutions/get".to_string(),
            items_path: "/item/get".to_string(),
            identity_path: "/identity/get".to_string(),
            transactions_path: "/transactions/get".to_string(),
            webhook_url: "https://www.example.com/webhook".to_string(),
            wait_secs: 5,
            timeout_secs: 30,
        }
    }
}

impl ApiSettings {
    pub fn validate(&self) -> Result<(), ClientError> {
        let required = [
            ("api.base_url", &self.base_url),
            ("api.create_public_token_path", &self.create_public_token_path),
            ("api.exchange_token_path", &self.exchange_token_path),
            ("api.institutions_path", &self.institutions_path),
            ("api.items_path", &self.items_path),
            ("api.identity_path", &self.identity_path),
            ("api.transactions_path", &self.transactions_path),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ClientError::Config(format!("{name} is empty")));
            }
        }
        Ok(())
    }
}

/// API credentials plus the sandbox login used when creating public tokens.
#[derive(Clone)]
pub struct Credentials {
    pub client_id: String,
    pub secret: String,
    pub override_username: String,
    pub override_password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("secret", &"<redacted>")
            .field("override_username", &self.override_username)
            .field("override_password", &"<redacted>")
            .finish()
    }
}

/// Paging and filters for the institutions listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstitutionQuery {
    pub count: u32,
    pub offset: u32,
    pub country_codes: Vec<String>,
    /// Only list institutions supporting these products (omitted when empty)
    pub products: Vec<String>,
}

impl Default for InstitutionQuery {
    fn default() -> Self {
        Self {
            count: 10,
            offset: 0,
            country_codes: vec!["US".to_string()],
            products: vec!["transactions".to_string()],
        }
    }
}

/// Date range and paging for `/transactions/get`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionWindow {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub count: u32,
    pub offset: u32,
}

impl Default for TransactionWindow {
    fn default() -> Self {
        let end_date = Utc::now().date_naive();
        Self {
            start_date: end_date - Duration::days(90),
            end_date,
            count: 100,
            offset: 0,
        }
    }
}

impl TransactionWindow {
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.start_date > self.end_date {
            return Err(ClientError::Config(format!(
                "transactions.start_date {} is after end_date {}",
                self.start_date, self.end_date
            )));
        }
        if self.count == 0 {
            return Err(ClientError::Config("transactions.count must be at least 1".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(ApiSettings::default().validate().is_ok());
        assert!(TransactionWindow::default().validate().is_ok());
    }

    #[test]
    fn test_empty_path_rejected() {
        let api = ApiSettings {
            identity_path: " ".to_string(),
            ..ApiSettings::default()
        };
        let err = api.validate().unwrap_err();
        assert!(err.to_string().contains("api.identity_path"));
    }

    #[test]
    fn test_inverted_window_rejected() {
        let window = TransactionWindow {
            start_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            ..TransactionWindow::default()
        };
        assert!(window.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let creds = Credentials {
            client_id: "client".to_string(),
            secret: "top-secret".to_string(),
            override_username: "user_good".to_string(),
            override_password: "pass_good".to_string(),
        };
        let shown = format!("{creds:?}");
        assert!(shown.contains("client"));
        assert!(!shown.contains("top-secret"));
        assert!(!shown.contains("pass_good"));
    }
}
