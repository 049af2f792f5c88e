//! Sandbox API client: public-token creation, token exchange, and the data
//! endpoints the workflows call.
//!
//! Tokens are never cached. Every institution gets a fresh public token and
//! access token, and every call is attempted exactly once.

use serde_json::{json, Value};
use std::time::Duration;
use tracing::{error, info};

use crate::error::ClientError;
use crate::settings::{ApiSettings, Credentials, InstitutionQuery, TransactionWindow};
use crate::transport::Transport;

/// The per-institution data call a workflow makes once it holds an access token.
#[derive(Debug, Clone, Copy)]
pub enum DataCall<'a> {
    Item,
    Identity,
    Transactions(&'a TransactionWindow),
}

impl DataCall<'_> {
    pub fn label(&self) -> &'static str {
        match self {
            DataCall::Item => "item",
            DataCall::Identity => "identity",
            DataCall::Transactions(_) => "transactions",
        }
    }

    /// Product requested when creating the public token
    pub fn initial_product(&self) -> &'static str {
        match self {
            DataCall::Item | DataCall::Transactions(_) => "transactions",
            DataCall::Identity => "identity",
        }
    }
}

pub struct SandboxClient<T> {
    transport: T,
    api: ApiSettings,
    credentials: Credentials,
}

impl<T: Transport> SandboxClient<T> {
    pub fn new(transport: T, api: ApiSettings, credentials: Credentials) -> Self {
        Self {
            transport,
            api,
            credentials,
        }
    }

    pub fn api(&self) -> &ApiSettings {
        &self.api
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api.base_url.trim_end_matches('/'), path)
    }

    /// Add credentials to `payload` and POST it.
    async fn call(&self, endpoint: &'static str, path: &str, mut payload: Value) -> Result<Value, ClientError> {
        if let Some(fields) = payload.as_object_mut() {
            fields.insert("client_id".to_string(), Value::from(self.credentials.client_id.as_str()));
            fields.insert("secret".to_string(), Value::from(self.credentials.secret.as_str()));
        }

        let url = self.url(path);
        self.transport
            .post_json(&url, &payload)
            .await
            .map_err(|source| {
                error!(endpoint, url = %url, error = %source, "request failed");
                ClientError::Fetch { endpoint, source }
            })
    }

    fn string_field(body: &Value, endpoint: &'static str, field: &'static str) -> Result<String, ClientError> {
        body.get(field)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .ok_or(ClientError::MissingField { endpoint, field })
    }

    pub async fn create_public_token(&self, institution_id: &str, products: &[&str]) -> Result<String, ClientError> {
        let payload = json!({
            "institution_id": institution_id,
            "initial_products": products,
            "options": {
                "webhook": self.api.webhook_url,
                "override_username": self.credentials.override_username,
                "override_password": self.credentials.override_password,
            },
        });
        let body = self
            .call("public_token/create", &self.api.create_public_token_path, payload)
            .await?;
        Self::string_field(&body, "public_token/create", "public_token")
    }

    pub async fn exchange_public_token(&self, public_token: &str) -> Result<String, ClientError> {
        let payload = json!({ "public_token": public_token });
        let body = self
            .call("public_token/exchange", &self.api.exchange_token_path, payload)
            .await?;
        Self::string_field(&body, "public_token/exchange", "access_token")
    }

    /// Create a public token for `institution_id` and exchange it.
    pub async fn access_token(&self, institution_id: &str, products: &[&str]) -> Result<String, ClientError> {
        info!(institution_id, "acquiring access token");
        let public_token = self.create_public_token(institution_id, products).await?;
        self.exchange_public_token(&public_token).await
    }

    pub async fn institutions(&self, query: &InstitutionQuery) -> Result<Value, ClientError> {
        let mut payload = json!({
            "count": query.count,
            "offset": query.offset,
            "country_codes": query.country_codes,
        });
        if !query.products.is_empty() {
            payload["options"] = json!({ "products": query.products });
        }
        self.call("institutions", &self.api.institutions_path, payload).await
    }

    pub async fn data(&self, call: DataCall<'_>, access_token: &str) -> Result<Value, ClientError> {
        match call {
            DataCall::Item => {
                let payload = json!({ "access_token": access_token });
                self.call("item", &self.api.items_path, payload).await
            }
            DataCall::Identity => {
                let payload = json!({ "access_token": access_token });
                self.call("identity", &self.api.identity_path, payload).await
            }
            DataCall::Transactions(window) => {
                let payload = json!({
                    "access_token": access_token,
                    "start_date": window.start_date.format("%Y-%m-%d").to_string(),
                    "end_date": window.end_date.format("%Y-%m-%d").to_string(),
                    "options": {
                        "count": window.count,
                        "offset": window.offset,
                    },
                });
                self.call("transactions", &self.api.transactions_path, payload).await
            }
        }
    }

    /// Full per-institution sequence: token, courtesy wait, data call.
    pub async fn fetch_for_institution(&self, institution_id: &str, call: DataCall<'_>) -> Result<Value, ClientError> {
        let access_token = self
            .access_token(institution_id, &[call.initial_product()])
            .await?;

        if self.api.wait_secs > 0 {
            info!(
                institution_id,
                wait_secs = self.api.wait_secs,
                "waiting before {} call",
                call.label()
            );
            tokio::time::sleep(Duration::from_secs(self.api.wait_secs)).await;
        }

        self.data(call, &access_token).await
    }
}
