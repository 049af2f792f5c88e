//! plaidflat-client: sandbox API client, HTTP transport, and the fetch-and-flatten workflows

pub mod client;
pub mod error;
pub mod settings;
pub mod transport;
pub mod workflows;

pub use client::{DataCall, SandboxClient};
pub use error::{ClientError, FetchError};
pub use settings::{ApiSettings, Credentials, InstitutionQuery, TransactionWindow};
pub use transport::{HttpTransport, Transport};
pub use workflows::{
    load_seed_ids, run_identity, run_institutions, run_items, run_transactions, RunSummary,
};
