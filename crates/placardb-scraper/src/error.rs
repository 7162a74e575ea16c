use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rate limited fetching {url} (retry after {retry_after_secs}s)")]
    RateLimited { url: String, retry_after_secs: u64 },

    #[error("rendering backend busy for {url}")]
    RendererBusy { url: String },

    #[error("page not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("fetch exhausted after {attempts} attempts: {source}")]
    FetchExhausted {
        attempts: u32,
        #[source]
        source: Box<ScraperError>,
    },

    #[error("round listing structure not found at {url}: {reason}")]
    Discovery { url: String, reason: String },

    #[error("mandatory field \"{field}\" missing in {url} (near: {snippet})")]
    MandatoryFieldMissing {
        field: &'static str,
        url: String,
        snippet: String,
    },

    #[error("cannot resolve home/away orientation for {url}")]
    OrientationAmbiguous { url: String },

    #[error("normalization error for {field}: {reason}")]
    Normalization { field: String, reason: String },
}

impl ScraperError {
    /// Splits the taxonomy into retryable-by-nature and structurally terminal
    /// errors.
    ///
    /// **Transient:** network timeouts and connection failures, HTTP 5xx,
    /// 429 rate limiting, and a busy rendering backend.
    ///
    /// **Fatal:** 404 and other 4xx, missing mandatory fields, unresolvable
    /// orientation, normalization failures, discovery-page layout changes,
    /// and an already-exhausted retry budget.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            ScraperError::Http(e) => {
                e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
            }
            ScraperError::RateLimited { .. } | ScraperError::RendererBusy { .. } => true,
            ScraperError::UnexpectedStatus { status, .. } => *status >= 500,
            ScraperError::NotFound { .. }
            | ScraperError::FetchExhausted { .. }
            | ScraperError::Discovery { .. }
            | ScraperError::MandatoryFieldMissing { .. }
            | ScraperError::OrientationAmbiguous { .. }
            | ScraperError::Normalization { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_are_transient() {
        let err = ScraperError::UnexpectedStatus {
            status: 503,
            url: "https://example.com".to_owned(),
        };
        assert!(err.is_transient());
    }

    #[test]
    fn client_errors_are_fatal() {
        let not_found = ScraperError::NotFound {
            url: "https://example.com/jogo/x".to_owned(),
        };
        assert!(!not_found.is_transient());

        let forbidden = ScraperError::UnexpectedStatus {
            status: 403,
            url: "https://example.com".to_owned(),
        };
        assert!(!forbidden.is_transient());
    }

    #[test]
    fn rate_limited_and_renderer_busy_are_transient() {
        assert!(ScraperError::RateLimited {
            url: "u".to_owned(),
            retry_after_secs: 30
        }
        .is_transient());
        assert!(ScraperError::RendererBusy { url: "u".to_owned() }.is_transient());
    }

    #[test]
    fn structural_errors_are_fatal() {
        assert!(!ScraperError::MandatoryFieldMissing {
            field: "score",
            url: "u".to_owned(),
            snippet: String::new(),
        }
        .is_transient());
        assert!(!ScraperError::OrientationAmbiguous { url: "u".to_owned() }.is_transient());
        assert!(!ScraperError::Discovery {
            url: "u".to_owned(),
            reason: "no fixture table".to_owned()
        }
        .is_transient());
    }

    #[test]
    fn exhausted_budget_is_not_retried_again() {
        let err = ScraperError::FetchExhausted {
            attempts: 3,
            source: Box::new(ScraperError::RendererBusy { url: "u".to_owned() }),
        };
        assert!(!err.is_transient());
    }
}
