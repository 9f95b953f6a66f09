//! Driver - the browser-automation surface this crate consumes.
//!
//! Everything above this trait (session, façades, scenarios) is driver
//! agnostic. Two implementations ship with the crate:
//!
//! - [`crate::SimulatedDriver`] - in-process model of the demo site, used by tests
//! - `ChromiumDriver` - real Chromium over CDP (feature `browser`)

use crate::locator::By;
use crate::result::PagecheckResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque handle to a live rendered element.
///
/// Valid only within the navigation generation it was resolved in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementHandle {
    /// Driver-assigned node id
    pub node: u64,
    /// Navigation generation the handle belongs to
    pub generation: u64,
}

impl ElementHandle {
    /// Create a new element handle
    #[must_use]
    pub const fn new(node: u64, generation: u64) -> Self {
        Self { node, generation }
    }
}

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}@{}", self.node, self.generation)
    }
}

/// Screenshot data with metadata
#[derive(Debug, Clone)]
pub struct Screenshot {
    /// Raw PNG data
    pub data: Vec<u8>,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Screenshot {
    /// Create a new screenshot
    #[must_use]
    pub const fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            data,
            width,
            height,
        }
    }

    /// Check if screenshot is valid (has data)
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.data.is_empty() && self.width > 0 && self.height > 0
    }
}

/// Abstract driver trait for browser automation.
///
/// All calls are blocking. Implementations must:
///
/// - return `SessionUnavailable` from every page/element call before
///   [`Driver::start`] or after [`Driver::quit`]
/// - bump the generation on every navigation (explicit or triggered by a
///   click/submit) and reject handles from older generations with
///   `StaleElement`
/// - return matches from [`Driver::find_elements`] in document order
pub trait Driver: Send {
    /// Start the browser session
    fn start(&mut self) -> PagecheckResult<()>;

    /// Tear down the browser session
    fn quit(&mut self) -> PagecheckResult<()>;

    /// Whether the session is running
    fn is_active(&self) -> bool;

    /// Current navigation generation
    fn generation(&self) -> u64;

    /// Navigate to an absolute URL
    fn navigate(&mut self, url: &str) -> PagecheckResult<()>;

    /// Current page URL
    fn current_url(&self) -> PagecheckResult<String>;

    /// Current document title
    fn title(&self) -> PagecheckResult<String>;

    /// All elements matching `by`, searched under `scope` or the whole document
    fn find_elements(
        &mut self,
        by: &By,
        scope: Option<ElementHandle>,
    ) -> PagecheckResult<Vec<ElementHandle>>;

    /// Rendered text of the element (whitespace-normalized, trimmed)
    fn text(&self, element: ElementHandle) -> PagecheckResult<String>;

    /// DOM attribute value
    fn attribute(&self, element: ElementHandle, name: &str) -> PagecheckResult<Option<String>>;

    /// Live property value (`value`, `checked`, ...) rendered as a string
    fn property(&self, element: ElementHandle, name: &str) -> PagecheckResult<Option<String>>;

    /// Whether the element is rendered and not hidden
    fn is_displayed(&self, element: ElementHandle) -> PagecheckResult<bool>;

    /// Whether a checkbox/radio is checked or an option is selected
    fn is_selected(&self, element: ElementHandle) -> PagecheckResult<bool>;

    /// Click the element
    fn click(&mut self, element: ElementHandle) -> PagecheckResult<()>;

    /// Type text into the element
    fn send_keys(&mut self, element: ElementHandle, text: &str) -> PagecheckResult<()>;

    /// Clear a text field
    fn clear(&mut self, element: ElementHandle) -> PagecheckResult<()>;

    /// Select the `<option>` of a `<select>` whose visible text equals `text`
    fn select_by_text(&mut self, element: ElementHandle, text: &str) -> PagecheckResult<()>;

    /// Capture the viewport as PNG
    fn screenshot(&self) -> PagecheckResult<Screenshot>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_display() {
        assert_eq!(ElementHandle::new(12, 3).to_string(), "#12@3");
    }

    #[test]
    fn test_screenshot_validity() {
        assert!(Screenshot::new(vec![1, 2, 3], 10, 10).is_valid());
        assert!(!Screenshot::new(vec![], 10, 10).is_valid());
        assert!(!Screenshot::new(vec![1], 0, 10).is_valid());
    }
}
