//! Dispatch error taxonomy.

/// Errors raised on the dispatch path.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// Missing or invalid gateway configuration. Raised before any I/O.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Network or HTTP failure talking to the gateway. Chunk-scoped and
    /// never retried here.
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Gateway response does not match the documented contract.
    #[error("gateway protocol error: {0}")]
    Protocol(String),

    /// Device store failure during reconciliation.
    #[error("device store error: {0}")]
    Store(color_eyre::eyre::Report),
}

impl From<reqwest::Error> for DispatchError {
    fn from(err: reqwest::Error) -> Self {
        DispatchError::Transport(Box::new(err))
    }
}
