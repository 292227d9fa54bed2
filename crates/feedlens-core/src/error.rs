//! Error types for Feedlens

/// Result type alias using Feedlens' Error type
pub type Result<T> = std::result::Result<T, Error>;

/// How much of a raw remote payload is retained on parse errors
const RAW_SNIPPET_LEN: usize = 512;

/// Core error type for Feedlens operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Remote inference call errors (network, non-2xx)
    #[error("remote call error: {0}")]
    Remote(String),

    /// Quota/rate-limit errors from the remote API
    #[error("quota exceeded: {0}")]
    Quota(String),

    /// Malformed structured payload from the remote API
    #[error("parse error: {reason}")]
    Parse {
        /// Terminal parse failure description
        reason: String,
        /// Leading snippet of the raw payload, kept for logging
        raw: String,
    },

    /// Remote call exceeded its deadline
    #[error("operation timed out")]
    Timeout,

    /// Local analyzer errors
    #[error("analyzer error: {0}")]
    Analyzer(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Network/IO errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new remote-call error
    pub fn remote(msg: impl Into<String>) -> Self {
        Self::Remote(msg.into())
    }

    /// Create a new quota error
    pub fn quota(msg: impl Into<String>) -> Self {
        Self::Quota(msg.into())
    }

    /// Create a new parse error, retaining a snippet of the raw payload
    pub fn parse(reason: impl Into<String>, raw: &str) -> Self {
        let snippet = if raw.len() > RAW_SNIPPET_LEN {
            let mut end = RAW_SNIPPET_LEN;
            while !raw.is_char_boundary(end) {
                end -= 1;
            }
            &raw[..end]
        } else {
            raw
        };
        Self::Parse {
            reason: reason.into(),
            raw: snippet.to_string(),
        }
    }

    /// Create a new analyzer error
    pub fn analyzer(msg: impl Into<String>) -> Self {
        Self::Analyzer(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether this error counts as a remote failure toward the circuit breaker
    pub fn is_remote_failure(&self) -> bool {
        matches!(
            self,
            Self::Remote(_) | Self::Quota(_) | Self::Parse { .. } | Self::Timeout
        )
    }

    /// Whether this error is a quota/rate-limit rejection
    pub fn is_quota(&self) -> bool {
        matches!(self, Self::Quota(_))
    }
}
