use thiserror::Error;

/// The one failure kind a page fetch can produce. Network errors, timeouts,
/// bad status codes and undecodable bodies all collapse into it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to fetch stories: {message}")]
pub struct FetchError {
    message: String,
}

impl FetchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        Self::new(err.to_string())
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(format!("malformed response: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_message() {
        let err = FetchError::new("connection refused");
        assert_eq!(err.to_string(), "failed to fetch stories: connection refused");
        assert_eq!(err.message(), "connection refused");
    }

    #[test]
    fn json_errors_are_reported_as_malformed() {
        let err: FetchError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(err.message().starts_with("malformed response:"));
    }
}
