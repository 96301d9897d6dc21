use thiserror::Error;

/// Top-level error type for finbot.
#[derive(Debug, Error)]
pub enum BotError {
    /// Error from a chat-completion provider.
    #[error("provider error: {0}")]
    Provider(String),

    /// Error from the WAHA chat gateway.
    #[error("channel error: {0}")]
    Channel(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Audit/storage error.
    #[error("audit error: {0}")]
    Audit(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failure from a chat-completion provider, split by retryability.
///
/// Only `RateLimited` and `Timeout` trigger the fallback provider;
/// everything else surfaces the generic user-facing error.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("{0}")]
    Other(String),
}

impl ProviderError {
    /// Whether the agent should retry the conversation on the fallback model.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited(_) | Self::Timeout(_))
    }
}

/// Outcome kinds for identity and category resolution.
///
/// Callers branch on the kind instead of string-matching log output.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The alias directory could not map the LID to a phone number.
    #[error("alias unresolvable: {0}")]
    Unresolvable(String),

    /// The phone (or category name) is not mapped to any record.
    #[error("not found")]
    NotFound,

    /// A collaborator API failed (network error or non-2xx other than 404).
    #[error("upstream failure: {0}")]
    Upstream(String),
}

/// Failure from a backend REST call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend returned 404.
    #[error("not found")]
    NotFound,

    /// The backend returned a non-2xx status other than 404.
    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Transport-level failure (connect, timeout, decode).
    #[error("backend request failed: {0}")]
    Transport(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_retryability() {
        assert!(ProviderError::RateLimited("429".into()).is_retryable());
        assert!(ProviderError::Timeout("30s".into()).is_retryable());
        assert!(!ProviderError::Other("500".into()).is_retryable());
    }

    #[test]
    fn test_resolve_error_display() {
        let e = ResolveError::Unresolvable("1234@lid".into());
        assert!(e.to_string().contains("1234@lid"));
        assert_eq!(ResolveError::NotFound.to_string(), "not found");
    }

    #[test]
    fn test_api_error_status_display() {
        let e = ApiError::Status {
            status: 500,
            body: "boom".into(),
        };
        assert!(e.to_string().contains("500"));
    }
}
