use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScrapeError>;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("missing {what} in {context}")]
    MissingElement { what: String, context: String },

    #[error("invalid {field}: {value:?}")]
    InvalidValue { field: String, value: String },

    #[error("unknown team: {0}")]
    UnknownTeam(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScrapeError {
    pub fn missing(what: impl Into<String>, context: impl Into<String>) -> Self {
        ScrapeError::MissingElement {
            what: what.into(),
            context: context.into(),
        }
    }

    pub fn invalid(field: impl Into<String>, value: impl Into<String>) -> Self {
        ScrapeError::InvalidValue {
            field: field.into(),
            value: value.into(),
        }
    }

    /// True when the page layout itself did not match what the parsers expect.
    pub fn is_structural(&self) -> bool {
        matches!(self, ScrapeError::MissingElement { .. })
    }

    /// Transport failures and throttling/server statuses are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            ScrapeError::Http { .. } => true,
            ScrapeError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_statuses() {
        let status = |status| ScrapeError::Status {
            url: "https://example.com".to_string(),
            status,
        };
        assert!(status(429).is_retryable());
        assert!(status(503).is_retryable());
        assert!(!status(404).is_retryable());
        assert!(!ScrapeError::UnknownTeam("Nowhere".to_string()).is_retryable());
    }

    #[test]
    fn test_structural() {
        assert!(ScrapeError::missing("scorebox", "box score").is_structural());
        assert!(!ScrapeError::invalid("IP", "x").is_structural());
    }
}
