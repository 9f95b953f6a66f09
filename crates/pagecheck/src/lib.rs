//! Pagecheck: page-object browser scenarios for the Automation Project demo site.
//!
//! Scenarios drive a [`Session`] through the [`HomePage`] and [`NextPage`]
//! façades. Every element lookup goes through a polling locator that
//! retries until its condition holds or the timeout expires.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   ┌───────────────┐
//! │ Scenario     │──►│ HomePage /   │──►│ Session      │──►│ Driver        │
//! │ catalogue    │   │ NextPage     │   │ (poll, stale │   │ simulated or  │
//! │ + runner     │   │ façades      │   │  detection)  │   │ chromium/CDP  │
//! └──────────────┘   └──────────────┘   └──────────────┘   └───────────────┘
//!        │
//!        ▼
//!  RunReport (JSON) + numbered screenshots
//! ```
//!
//! # Example
//!
//! ```no_run
//! use pagecheck::{
//!     home_page_scenarios, run_catalogue, HarnessConfig, ScenarioRunner, ScreenshotRecorder,
//!     Session, SimulatedDriver,
//! };
//!
//! let config = HarnessConfig::default();
//! let mut session = Session::from_config(Box::new(SimulatedDriver::new()), &config)?;
//! let mut screenshots = ScreenshotRecorder::disabled();
//! let report = run_catalogue(
//!     &ScenarioRunner::new(),
//!     &mut session,
//!     &mut screenshots,
//!     &home_page_scenarios(),
//!     |_| {},
//! )?;
//! assert!(report.all_passed());
//! # Ok::<(), pagecheck::PagecheckError>(())
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

mod assertion;
#[cfg(feature = "browser")]
mod cdp;
mod config;
mod driver;
mod form;
mod locator;
mod page_object;
mod result;
mod runner;
mod screenshot;
mod session;
mod wait;

/// Scripted in-process rendition of the demo site
pub mod simulated;

/// Scenario catalogue and the values it expects
pub mod scenario;

pub use assertion::Assertion;
#[cfg(feature = "browser")]
pub use cdp::{ChromiumDriver, ChromiumOptions};
pub use config::{
    default_base_url, HarnessConfig, DEFAULT_NAVIGATION_TIMEOUT_MS, DEFAULT_SCREENSHOT_DIR,
};
pub use driver::{Driver, ElementHandle, Screenshot};
pub use form::FormRecord;
pub use locator::{By, ElementRef};
pub use page_object::{HomePage, NextPage, PageObject, GENDERS, SUBJECTS};
pub use result::{PagecheckError, PagecheckResult};
pub use runner::{run_catalogue, Outcome, RunReport, ScenarioResult, ScenarioRunner};
pub use scenario::{home_page_scenarios, Scenario, ScenarioContext, ScenarioFn};
pub use screenshot::ScreenshotRecorder;
pub use session::Session;
pub use simulated::SimulatedDriver;
pub use wait::{
    poll_until, Condition, PageCondition, PollOutcome, WaitOptions, DEFAULT_POLL_INTERVAL_MS,
    DEFAULT_TIMEOUT_MS,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::{
        home_page_scenarios, Assertion, By, Condition, Driver, ElementHandle, ElementRef,
        FormRecord, HarnessConfig, HomePage, NextPage, PageCondition, PageObject, PagecheckError,
        PagecheckResult, RunReport, Scenario, ScenarioContext, ScenarioRunner, ScreenshotRecorder,
        Session, SimulatedDriver, WaitOptions,
    };
}
