use thiserror::Error;

/// Failure of a single POST, classified the way callers log it.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("connection error: {0}")]
    Connect(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("response was not valid JSON ({message}): {snippet}")]
    NotJson { message: String, snippet: String },
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{endpoint} call failed: {source}")]
    Fetch {
        endpoint: &'static str,
        #[source]
        source: FetchError,
    },

    #[error("{endpoint} response has no '{field}'")]
    MissingField {
        endpoint: &'static str,
        field: &'static str,
    },

    #[error("configuration error: {0}")]
    Config(String),
}
