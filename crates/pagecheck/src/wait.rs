//! Wait conditions and the bounded poll loop behind the polling locator.
//!
//! The loop evaluates an attempt at a fixed interval against a monotonic
//! deadline and reports a tagged [`PollOutcome`] instead of failing
//! directly, so callers decide how a timeout is surfaced.

use crate::driver::{Driver, ElementHandle};
use crate::result::{PagecheckError, PagecheckResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};

/// Default timeout for element waits (5 seconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Element-level wait condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// At least one element matches
    Present,
    /// The first match is displayed
    Visible,
    /// Nothing matches, or the first match is not displayed
    Hidden,
    /// The first match's text equals the value
    TextEquals(String),
    /// The first match's attribute equals the value
    AttributeEquals {
        /// Attribute name
        name: String,
        /// Expected value
        value: String,
    },
    /// Exactly this many elements match
    CountEquals(usize),
}

impl Condition {
    /// Text equality condition
    #[must_use]
    pub fn text(expected: impl Into<String>) -> Self {
        Self::TextEquals(expected.into())
    }

    /// Attribute equality condition
    #[must_use]
    pub fn attribute(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::AttributeEquals {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Whether the condition can hold with zero matches
    #[must_use]
    pub const fn allows_empty(&self) -> bool {
        matches!(self, Self::Hidden | Self::CountEquals(0))
    }

    /// Evaluate against the current matches of a reference
    pub fn evaluate(
        &self,
        driver: &dyn Driver,
        matches: &[ElementHandle],
    ) -> PagecheckResult<bool> {
        let first = matches.first().copied();
        match (self, first) {
            (Self::CountEquals(n), _) => Ok(matches.len() == *n),
            (Self::Hidden, None) => Ok(true),
            (Self::Hidden, Some(element)) => Ok(!driver.is_displayed(element)?),
            (_, None) => Ok(false),
            (Self::Present, Some(_)) => Ok(true),
            (Self::Visible, Some(element)) => driver.is_displayed(element),
            (Self::TextEquals(expected), Some(element)) => Ok(driver.text(element)? == *expected),
            (Self::AttributeEquals { name, value }, Some(element)) => {
                Ok(driver.attribute(element, name)?.as_deref() == Some(value.as_str()))
            }
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Present => write!(f, "present"),
            Self::Visible => write!(f, "visible"),
            Self::Hidden => write!(f, "hidden"),
            Self::TextEquals(text) => write!(f, "text == {text:?}"),
            Self::AttributeEquals { name, value } => write!(f, "@{name} == {value:?}"),
            Self::CountEquals(n) => write!(f, "count == {n}"),
        }
    }
}

/// Page-level wait condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageCondition {
    /// Document title equals the value
    TitleEquals(String),
    /// URL path (query and fragment ignored) ends with the value
    UrlEndsWith(String),
}

impl PageCondition {
    /// Evaluate against the driver's current page
    pub fn evaluate(&self, driver: &dyn Driver) -> PagecheckResult<bool> {
        match self {
            Self::TitleEquals(expected) => Ok(driver.title()? == *expected),
            Self::UrlEndsWith(suffix) => {
                let url = driver.current_url()?;
                Ok(strip_query(&url).ends_with(suffix.as_str()))
            }
        }
    }
}

impl fmt::Display for PageCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TitleEquals(title) => write!(f, "title == {title:?}"),
            Self::UrlEndsWith(suffix) => write!(f, "url ending with {suffix:?}"),
        }
    }
}

fn strip_query(url: &str) -> &str {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    &url[..end]
}

/// Tagged result of a poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    /// The attempt produced a value before the deadline
    Found(T),
    /// The deadline passed
    TimedOut {
        /// Time spent polling
        elapsed: Duration,
        /// Number of attempts made
        attempts: u32,
        /// Last retryable error seen, if any
        last_error: Option<String>,
    },
}

impl<T> PollOutcome<T> {
    /// Whether the poll succeeded
    #[must_use]
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Convert to a result, surfacing a timeout as `TimeoutExceeded`
    pub fn into_result(
        self,
        reference: impl fmt::Display,
        condition: impl fmt::Display,
    ) -> PagecheckResult<T> {
        match self {
            Self::Found(value) => Ok(value),
            Self::TimedOut { elapsed, .. } => Err(PagecheckError::TimeoutExceeded {
                reference: reference.to_string(),
                condition: condition.to_string(),
                waited_ms: elapsed.as_millis() as u64,
            }),
        }
    }
}

/// Poll `attempt` until it yields `Some`, the deadline passes, or it fails fatally.
///
/// The attempt always runs at least once. Retryable errors
/// ([`PagecheckError::is_retryable`]) count as "not yet"; any other error
/// aborts the poll immediately.
pub fn poll_until<T, F>(options: &WaitOptions, mut attempt: F) -> PagecheckResult<PollOutcome<T>>
where
    F: FnMut() -> PagecheckResult<Option<T>>,
{
    let start = Instant::now();
    let deadline = start + options.timeout();
    let mut attempts = 0_u32;
    let mut last_error = None;

    loop {
        attempts += 1;
        match attempt() {
            Ok(Some(value)) => {
                tracing::trace!(
                    attempts,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "poll satisfied"
                );
                return Ok(PollOutcome::Found(value));
            }
            Ok(None) => {}
            Err(err) if err.is_retryable() => last_error = Some(err.to_string()),
            Err(err) => return Err(err),
        }

        let now = Instant::now();
        if now >= deadline {
            let elapsed = now - start;
            tracing::debug!(attempts, elapsed_ms = elapsed.as_millis() as u64, "poll timed out");
            return Ok(PollOutcome::TimedOut {
                elapsed,
                attempts,
                last_error,
            });
        }
        std::thread::sleep(options.poll_interval().min(deadline - now));
    }
}
