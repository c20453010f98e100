use thiserror::Error;

/// Whether a failure should be absorbed (target contributes zero posts) or
/// indicates a misconfigured fetcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// Timeout, non-2xx, connection reset, truncated body.
    Transient,
    /// The request could never succeed as built (bad URL, client construction).
    Fatal,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rate limited by {url} (retry after {retry_after_secs}s)")]
    RateLimited { url: String, retry_after_secs: u64 },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid request URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),
}

impl FetchError {
    #[must_use]
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            FetchError::Http(e) if e.is_builder() => FetchErrorKind::Fatal,
            FetchError::Http(_)
            | FetchError::RateLimited { .. }
            | FetchError::UnexpectedStatus { .. } => FetchErrorKind::Transient,
            FetchError::InvalidUrl { .. } | FetchError::ClientBuild(_) => FetchErrorKind::Fatal,
        }
    }

    #[must_use]
    pub fn is_transient(&self) -> bool {
        self.kind() == FetchErrorKind::Transient
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_and_rate_limit_are_transient() {
        let status = FetchError::UnexpectedStatus {
            status: 503,
            url: "https://example.com".to_owned(),
        };
        let limited = FetchError::RateLimited {
            url: "https://example.com".to_owned(),
            retry_after_secs: 60,
        };
        assert_eq!(status.kind(), FetchErrorKind::Transient);
        assert!(limited.is_transient());
    }

    #[test]
    fn invalid_url_is_fatal() {
        let err = FetchError::InvalidUrl {
            url: "::".to_owned(),
            reason: "relative URL without a base".to_owned(),
        };
        assert_eq!(err.kind(), FetchErrorKind::Fatal);
    }
}
