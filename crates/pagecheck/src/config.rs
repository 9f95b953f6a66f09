//! Harness configuration.
//!
//! Defaults, overridden by a YAML file ([`HarnessConfig::load`]) and then by
//! command-line flags through the `with_*` builders.

use crate::result::{PagecheckError, PagecheckResult};
use crate::wait::{WaitOptions, DEFAULT_POLL_INTERVAL_MS, DEFAULT_TIMEOUT_MS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Default page-load timeout (30 seconds)
pub const DEFAULT_NAVIGATION_TIMEOUT_MS: u64 = 30_000;

/// Default screenshot directory
pub const DEFAULT_SCREENSHOT_DIR: &str = "screenshots";

/// Default base URL: `file://<cwd>/web/`
#[must_use]
pub fn default_base_url() -> String {
    let web = std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("/"))
        .join("web");
    Url::from_directory_path(&web)
        .map_or_else(|()| "file:///web/".to_string(), |url| url.to_string())
}

/// Configuration for one harness run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Directory URL the site's pages are resolved against
    pub base_url: String,
    /// Element wait timeout in milliseconds
    pub timeout_ms: u64,
    /// Delay between poll attempts in milliseconds
    pub poll_interval_ms: u64,
    /// Page-level wait timeout in milliseconds
    pub navigation_timeout_ms: u64,
    /// Where screenshots are written
    pub screenshot_dir: PathBuf,
    /// Whether scenarios capture screenshots
    pub capture_screenshots: bool,
    /// Run the browser without a window
    pub headless: bool,
    /// Viewport width in pixels
    pub viewport_width: u32,
    /// Viewport height in pixels
    pub viewport_height: u32,
    /// Chromium executable (auto-detected when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chromium_path: Option<PathBuf>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            navigation_timeout_ms: DEFAULT_NAVIGATION_TIMEOUT_MS,
            screenshot_dir: PathBuf::from(DEFAULT_SCREENSHOT_DIR),
            capture_screenshots: true,
            headless: true,
            viewport_width: 1280,
            viewport_height: 800,
            chromium_path: None,
        }
    }
}

impl HarnessConfig {
    /// Create new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a YAML file; missing keys keep their defaults
    pub fn load(path: &Path) -> PagecheckResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| PagecheckError::Config {
            message: format!("cannot read {}: {e}", path.display()),
        })?;
        let config = Self::from_yaml(&text)?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Parse from YAML text
    pub fn from_yaml(text: &str) -> PagecheckResult<Self> {
        let config: Self = serde_yaml_ng::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Render as YAML
    pub fn to_yaml(&self) -> PagecheckResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Check values that would make a run meaningless
    pub fn validate(&self) -> PagecheckResult<()> {
        if self.poll_interval_ms == 0 {
            return Err(PagecheckError::Config {
                message: "poll_interval_ms must be greater than zero".to_string(),
            });
        }
        if self.viewport_width == 0 || self.viewport_height == 0 {
            return Err(PagecheckError::Config {
                message: format!(
                    "viewport must be non-empty, got {}x{}",
                    self.viewport_width, self.viewport_height
                ),
            });
        }
        let _ = self.parsed_base_url()?;
        Ok(())
    }

    /// The base URL as a directory URL (always ends with `/`)
    pub fn parsed_base_url(&self) -> PagecheckResult<Url> {
        let mut raw = self.base_url.clone();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        Url::parse(&raw).map_err(|e| PagecheckError::Config {
            message: format!("invalid base_url {:?}: {e}", self.base_url),
        })
    }

    /// Element wait options
    #[must_use]
    pub const fn wait_options(&self) -> WaitOptions {
        WaitOptions {
            timeout_ms: self.timeout_ms,
            poll_interval_ms: self.poll_interval_ms,
        }
    }

    /// Page-level wait options
    #[must_use]
    pub const fn navigation_wait_options(&self) -> WaitOptions {
        WaitOptions {
            timeout_ms: self.navigation_timeout_ms,
            poll_interval_ms: self.poll_interval_ms,
        }
    }

    /// Set base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set element wait timeout
    #[must_use]
    pub const fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set poll interval
    #[must_use]
    pub const fn with_poll_interval_ms(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Set page-level wait timeout
    #[must_use]
    pub const fn with_navigation_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.navigation_timeout_ms = timeout_ms;
        self
    }

    /// Set screenshot directory
    #[must_use]
    pub fn with_screenshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.screenshot_dir = dir.into();
        self
    }

    /// Enable or disable screenshots
    #[must_use]
    pub const fn with_capture_screenshots(mut self, capture: bool) -> Self {
        self.capture_screenshots = capture;
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set viewport size
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set Chromium executable
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }
}
