use std::sync::Arc;

/// Error type returned by this crate.
///
/// Errors are `Clone` because a single in-flight request may be awaited by
/// several callers, and each of them receives the same outcome.
#[derive(Clone, Debug, thiserror::Error)]
pub enum QaffeeError {
    /// Network or request execution error from `reqwest`.
    #[error("transport error: {0}")]
    Transport(Arc<reqwest::Error>),
    /// Non-success HTTP status code with raw response body.
    #[error("http error {status}: {body}")]
    Http { status: u16, body: String },
    /// The access token expired and could not be refreshed.
    #[error("token refresh failed: {0}")]
    RefreshFailed(Box<QaffeeError>),
    /// Response decoding or shape validation error.
    #[error("decode error: {0}")]
    Decode(String),
    /// Token store read or write error.
    #[error("token storage error: {0}")]
    Storage(String),
    /// The request could not be built (bad base URL, path, or header).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl QaffeeError {
    /// HTTP status of the failure, when the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::RefreshFailed(inner) => inner.status(),
            _ => None,
        }
    }

    /// Returns `true` for a 429 that survived every retry.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::Http { status: 429, .. })
    }

    /// Returns `true` when the session is no longer authenticated.
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            Self::Http { status: 401, .. } | Self::RefreshFailed(_)
        )
    }

    /// Parses the error body as JSON, so callers can render field messages.
    pub fn body_json(&self) -> Option<serde_json::Value> {
        match self {
            Self::Http { body, .. } => serde_json::from_str(body).ok(),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for QaffeeError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(Arc::new(err))
    }
}
