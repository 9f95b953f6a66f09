//! Result and error types for pagecheck.

use thiserror::Error;

/// Result type for pagecheck operations
pub type PagecheckResult<T> = Result<T, PagecheckError>;

/// Errors that can occur while driving a page
#[derive(Debug, Error)]
pub enum PagecheckError {
    /// Immediate lookup matched nothing
    #[error("Element not found: {reference}")]
    ElementNotFound {
        /// Rendered element reference
        reference: String,
    },

    /// Polling locator gave up
    #[error("Timed out after {waited_ms}ms waiting for {reference} to be {condition}")]
    TimeoutExceeded {
        /// Rendered element reference (or "page" for page-level waits)
        reference: String,
        /// Rendered wait condition
        condition: String,
        /// Time spent polling
        waited_ms: u64,
    },

    /// Observed value differs from the expectation
    #[error("Assertion failed for {what}: expected {expected}, got {actual}")]
    AssertionMismatch {
        /// What was being checked
        what: String,
        /// Expected value (debug-rendered)
        expected: String,
        /// Observed value (debug-rendered)
        actual: String,
    },

    /// Browser session not started or already torn down
    #[error("Browser session unavailable")]
    SessionUnavailable,

    /// Handle used after the page navigated away
    #[error("Stale element handle {handle}: the page has navigated since it was resolved")]
    StaleElement {
        /// Rendered handle
        handle: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Selector could not be parsed or evaluated
    #[error("Invalid selector {selector:?}: {message}")]
    InvalidSelector {
        /// Offending selector
        selector: String,
        /// Error message
        message: String,
    },

    /// Click/type/select could not be performed
    #[error("Interaction failed: {message}")]
    Interaction {
        /// Error message
        message: String,
    },

    /// Underlying driver error
    #[error("Driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// Screenshot error
    #[error("Screenshot failed: {message}")]
    Screenshot {
        /// Error message
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// URL parse error
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

impl PagecheckError {
    /// Build an assertion mismatch from two debug-printable values
    pub fn mismatch(
        what: impl Into<String>,
        expected: &impl std::fmt::Debug,
        actual: &impl std::fmt::Debug,
    ) -> Self {
        Self::AssertionMismatch {
            what: what.into(),
            expected: format!("{expected:?}"),
            actual: format!("{actual:?}"),
        }
    }

    /// Create a driver error
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }

    /// Create an interaction error
    pub fn interaction(message: impl Into<String>) -> Self {
        Self::Interaction {
            message: message.into(),
        }
    }

    /// Whether the remaining run should be abandoned
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::SessionUnavailable)
    }

    /// Whether a poll should keep retrying after this error
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ElementNotFound { .. }
                | Self::StaleElement { .. }
                | Self::AssertionMismatch { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatch_renders_both_sides() {
        let err = PagecheckError::mismatch("title", &"Automation Project", &"Other");
        let text = err.to_string();
        assert!(text.contains("title"));
        assert!(text.contains("\"Automation Project\""));
        assert!(text.contains("\"Other\""));
    }

    #[test]
    fn test_timeout_message_carries_reference_and_condition() {
        let err = PagecheckError::TimeoutExceeded {
            reference: "id=missing".to_string(),
            condition: "present".to_string(),
            waited_ms: 200,
        };
        let text = err.to_string();
        assert!(text.contains("id=missing"));
        assert!(text.contains("present"));
        assert!(text.contains("200ms"));
    }

    #[test]
    fn test_only_session_unavailable_is_fatal() {
        assert!(PagecheckError::SessionUnavailable.is_fatal());
        assert!(!PagecheckError::driver("boom").is_fatal());
        assert!(!PagecheckError::mismatch("x", &1, &2).is_fatal());
    }

    #[test]
    fn test_retryable_errors() {
        assert!(PagecheckError::ElementNotFound {
            reference: "tag=h1".to_string()
        }
        .is_retryable());
        assert!(!PagecheckError::SessionUnavailable.is_retryable());
        assert!(!PagecheckError::InvalidSelector {
            selector: "[".to_string(),
            message: "unterminated".to_string()
        }
        .is_retryable());
    }
}
