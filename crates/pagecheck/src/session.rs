//! Browser session and the polling locator.
//!
//! A [`Session`] owns one [`Driver`] for a whole run and resolves
//! [`ElementRef`]s against it, either once ([`Session::find_now`]) or by
//! polling until a [`Condition`] holds ([`Session::wait_until`]).
//!
//! Handles carry the navigation generation they were resolved in; the
//! session refuses to use a handle from an earlier generation.

use crate::config::HarnessConfig;
use crate::driver::{Driver, ElementHandle, Screenshot};
use crate::locator::ElementRef;
use crate::result::{PagecheckError, PagecheckResult};
use crate::wait::{poll_until, Condition, PageCondition, WaitOptions};
use url::Url;

/// One browser session shared by every scenario of a run
pub struct Session {
    driver: Box<dyn Driver>,
    base_url: Url,
    wait: WaitOptions,
    navigation_wait: WaitOptions,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.base_url.as_str())
            .field("active", &self.driver.is_active())
            .field("generation", &self.driver.generation())
            .field("wait", &self.wait)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Wrap a driver; pages are resolved against `base_url`
    #[must_use]
    pub fn new(driver: Box<dyn Driver>, base_url: Url) -> Self {
        Self {
            driver,
            base_url,
            wait: WaitOptions::default(),
            navigation_wait: WaitOptions::default(),
        }
    }

    /// Wrap a driver using base URL and wait settings from `config`
    pub fn from_config(driver: Box<dyn Driver>, config: &HarnessConfig) -> PagecheckResult<Self> {
        Ok(Self::new(driver, config.parsed_base_url()?)
            .with_wait_options(config.wait_options())
            .with_navigation_wait_options(config.navigation_wait_options()))
    }

    /// Set element wait options
    #[must_use]
    pub const fn with_wait_options(mut self, wait: WaitOptions) -> Self {
        self.wait = wait;
        self
    }

    /// Set page-level wait options
    #[must_use]
    pub const fn with_navigation_wait_options(mut self, wait: WaitOptions) -> Self {
        self.navigation_wait = wait;
        self
    }

    /// Element wait options in effect
    #[must_use]
    pub const fn wait_options(&self) -> WaitOptions {
        self.wait
    }

    /// Base URL pages are resolved against
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Borrow the underlying driver
    #[must_use]
    pub fn driver(&self) -> &dyn Driver {
        self.driver.as_ref()
    }

    /// Start the browser
    pub fn start(&mut self) -> PagecheckResult<()> {
        tracing::info!(base_url = %self.base_url, "starting browser session");
        self.driver.start()
    }

    /// Tear the browser down; later calls fail with `SessionUnavailable`
    pub fn quit(&mut self) -> PagecheckResult<()> {
        tracing::info!("closing browser session");
        self.driver.quit()
    }

    /// Whether the browser is running
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.driver.is_active()
    }

    /// Absolute URL of a site page
    pub fn url_for(&self, path: &str) -> PagecheckResult<Url> {
        Ok(self.base_url.join(path)?)
    }

    /// Navigate to a site page, e.g. `home.html`
    pub fn open(&mut self, path: &str) -> PagecheckResult<()> {
        let url = self.url_for(path)?;
        tracing::info!(url = %url, "navigating");
        self.driver.navigate(url.as_str())
    }

    /// Current page URL
    pub fn current_url(&self) -> PagecheckResult<String> {
        self.driver.current_url()
    }

    /// Current document title
    pub fn title(&self) -> PagecheckResult<String> {
        self.driver.title()
    }

    /// Whether the current URL is the site page `path`, ignoring query and fragment
    pub fn url_matches_path(&self, path: &str) -> PagecheckResult<bool> {
        let mut current = Url::parse(&self.current_url()?)?;
        let mut expected = self.url_for(path)?;
        for url in [&mut current, &mut expected] {
            url.set_query(None);
            url.set_fragment(None);
        }
        Ok(current == expected)
    }

    /// Resolve a reference once, without waiting
    pub fn find_now(&mut self, reference: &ElementRef) -> PagecheckResult<Vec<ElementHandle>> {
        let scope = match reference.scope() {
            Some(parent) => {
                let parents = self.find_now(parent)?;
                let first = parents.first().copied().ok_or_else(|| {
                    PagecheckError::ElementNotFound {
                        reference: parent.to_string(),
                    }
                })?;
                Some(first)
            }
            None => None,
        };
        let found = self.driver.find_elements(reference.by(), scope)?;
        Ok(match reference.index() {
            Some(index) => found.get(index).copied().into_iter().collect(),
            None => found,
        })
    }

    /// Poll until `condition` holds for `reference`; returns the matches at that moment
    pub fn wait_until(
        &mut self,
        reference: &ElementRef,
        condition: &Condition,
    ) -> PagecheckResult<Vec<ElementHandle>> {
        let options = self.wait;
        let outcome = poll_until(&options, || {
            let matches = self.find_now(reference)?;
            if matches.is_empty() && !condition.allows_empty() {
                return Ok(None);
            }
            Ok(condition
                .evaluate(self.driver.as_ref(), &matches)?
                .then_some(matches))
        })?;
        outcome.into_result(reference, condition)
    }

    /// First element matching `reference` once it is present
    pub fn wait_for(&mut self, reference: &ElementRef) -> PagecheckResult<ElementHandle> {
        self.first(reference, &Condition::Present)
    }

    /// First element matching `reference` once it is displayed
    pub fn wait_visible(&mut self, reference: &ElementRef) -> PagecheckResult<ElementHandle> {
        self.first(reference, &Condition::Visible)
    }

    /// Every element matching `reference` once at least one is present, in document order
    pub fn wait_for_all(&mut self, reference: &ElementRef) -> PagecheckResult<Vec<ElementHandle>> {
        self.wait_until(reference, &Condition::Present)
    }

    fn first(
        &mut self,
        reference: &ElementRef,
        condition: &Condition,
    ) -> PagecheckResult<ElementHandle> {
        self.wait_until(reference, condition)?
            .first()
            .copied()
            .ok_or_else(|| PagecheckError::ElementNotFound {
                reference: reference.to_string(),
            })
    }

    /// Poll until a page-level condition holds
    pub fn wait_for_page(&mut self, condition: &PageCondition) -> PagecheckResult<()> {
        let options = self.navigation_wait;
        let driver = self.driver.as_ref();
        poll_until(&options, || Ok(condition.evaluate(driver)?.then_some(())))?
            .into_result("page", condition)
    }

    fn live(&self, element: ElementHandle) -> PagecheckResult<ElementHandle> {
        if !self.driver.is_active() {
            return Err(PagecheckError::SessionUnavailable);
        }
        if element.generation == self.driver.generation() {
            Ok(element)
        } else {
            Err(PagecheckError::StaleElement {
                handle: element.to_string(),
            })
        }
    }

    /// Rendered text of an element
    pub fn text(&self, element: ElementHandle) -> PagecheckResult<String> {
        self.driver.text(self.live(element)?)
    }

    /// Texts of several elements, in order
    pub fn texts(&self, elements: &[ElementHandle]) -> PagecheckResult<Vec<String>> {
        elements.iter().map(|&e| self.text(e)).collect()
    }

    /// DOM attribute of an element
    pub fn attribute(&self, element: ElementHandle, name: &str) -> PagecheckResult<Option<String>> {
        self.driver.attribute(self.live(element)?, name)
    }

    /// Live property of an element
    pub fn property(&self, element: ElementHandle, name: &str) -> PagecheckResult<Option<String>> {
        self.driver.property(self.live(element)?, name)
    }

    /// Whether an element is displayed
    pub fn is_displayed(&self, element: ElementHandle) -> PagecheckResult<bool> {
        self.driver.is_displayed(self.live(element)?)
    }

    /// Whether a checkbox/radio is checked or an option selected
    pub fn is_selected(&self, element: ElementHandle) -> PagecheckResult<bool> {
        self.driver.is_selected(self.live(element)?)
    }

    /// Click an element
    pub fn click(&mut self, element: ElementHandle) -> PagecheckResult<()> {
        let element = self.live(element)?;
        self.driver.click(element)
    }

    /// Type into a text field
    pub fn type_text(&mut self, element: ElementHandle, text: &str) -> PagecheckResult<()> {
        let element = self.live(element)?;
        self.driver.send_keys(element, text)
    }

    /// Clear a text field
    pub fn clear(&mut self, element: ElementHandle) -> PagecheckResult<()> {
        let element = self.live(element)?;
        self.driver.clear(element)
    }

    /// Pick the `<option>` with the given visible text
    pub fn select_by_text(&mut self, element: ElementHandle, text: &str) -> PagecheckResult<()> {
        let element = self.live(element)?;
        self.driver.select_by_text(element, text)
    }

    /// Capture the viewport
    pub fn screenshot(&self) -> PagecheckResult<Screenshot> {
        self.driver.screenshot()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::simulated::SimulatedDriver;
    use std::time::{Duration, Instant};

    fn session() -> Session {
        let mut session = Session::new(
            Box::new(SimulatedDriver::new().with_download_step(Duration::from_millis(2))),
            Url::parse("file:///site/web/").unwrap(),
        )
        .with_wait_options(WaitOptions::new().with_timeout(500).with_poll_interval(2));
        session.start().unwrap();
        session.open("home.html").unwrap();
        session
    }

    mod locate_tests {
        use super::*;

        #[test]
        fn test_wait_for_heading() {
            let mut s = session();
            let heading = s.wait_for(&ElementRef::tag("h1")).unwrap();
            assert_eq!(s.text(heading).unwrap(), "Automation Project - Main Page");
        }

        #[test]
        fn test_scoped_and_indexed_reference() {
            let mut s = session();
            let students = ElementRef::class("table-container").nth(1);
            let rows = s
                .wait_for_all(&ElementRef::tag("tr").within(students.clone()))
                .unwrap();
            assert_eq!(rows.len(), 6);
            let title = s.wait_for(&ElementRef::tag("h2").within(students)).unwrap();
            assert_eq!(s.text(title).unwrap(), "Student Details");
        }

        #[test]
        fn test_index_out_of_range_matches_nothing() {
            let mut s = session();
            assert!(s.find_now(&ElementRef::tag("h1").nth(1)).unwrap().is_empty());
        }

        #[test]
        fn test_missing_scope_is_not_found() {
            let mut s = session();
            let err = s
                .find_now(&ElementRef::tag("td").within(ElementRef::id("nope")))
                .unwrap_err();
            assert!(matches!(err, PagecheckError::ElementNotFound { .. }));
        }

        #[test]
        fn test_absent_element_times_out_after_deadline() {
            let mut s = session()
                .with_wait_options(WaitOptions::new().with_timeout(80).with_poll_interval(10));
            let started = Instant::now();
            let err = s.wait_for(&ElementRef::id("no-such-element")).unwrap_err();
            assert!(started.elapsed() >= Duration::from_millis(80));
            match err {
                PagecheckError::TimeoutExceeded {
                    reference,
                    condition,
                    waited_ms,
                } => {
                    assert_eq!(reference, "id=no-such-element");
                    assert_eq!(condition, "present");
                    assert!(waited_ms >= 80);
                }
                other => panic!("unexpected error: {other}"),
            }
        }

        #[test]
        fn test_hidden_condition_holds_for_missing_element() {
            let mut s = session();
            let found = s
                .wait_until(&ElementRef::id("no-such-element"), &Condition::Hidden)
                .unwrap();
            assert!(found.is_empty());
        }

        #[test]
        fn test_wait_until_attribute_value() {
            let mut s = session();
            let button = s.wait_for(&ElementRef::id("download-button")).unwrap();
            s.click(button).unwrap();
            let progress = s
                .wait_until(
                    &ElementRef::id("download-progress"),
                    &Condition::attribute("value", "100"),
                )
                .unwrap();
            assert_eq!(progress.len(), 1);
            let dialog = s.wait_visible(&ElementRef::id("download-dialog")).unwrap();
            assert!(s.is_displayed(dialog).unwrap());
        }

        #[test]
        fn test_wait_until_text_equals() {
            let mut s = session();
            let found = s
                .wait_until(
                    &ElementRef::tag("h1"),
                    &Condition::text("Automation Project - Main Page"),
                )
                .unwrap();
            assert_eq!(found.len(), 1);
        }

        #[test]
        fn test_wait_until_count_equals() {
            let mut s = session();
            let containers = s
                .wait_until(&ElementRef::class("table-container"), &Condition::CountEquals(2))
                .unwrap();
            assert_eq!(containers.len(), 2);
        }

        #[test]
        fn test_wrong_count_times_out_with_condition() {
            let mut s = session()
                .with_wait_options(WaitOptions::new().with_timeout(30).with_poll_interval(5));
            let err = s
                .wait_until(&ElementRef::class("table-container"), &Condition::CountEquals(3))
                .unwrap_err();
            match err {
                PagecheckError::TimeoutExceeded { condition, .. } => {
                    assert_eq!(condition, "count == 3");
                }
                other => panic!("unexpected error: {other}"),
            }
        }

        #[test]
        fn test_zero_count_holds_for_missing_element() {
            let mut s = session();
            let found = s
                .wait_until(&ElementRef::id("no-such-element"), &Condition::CountEquals(0))
                .unwrap();
            assert!(found.is_empty());
        }
    }

    mod lifecycle_tests {
        use super::*;

        #[test]
        fn test_stale_handle_after_navigation() {
            let mut s = session();
            let heading = s.wait_for(&ElementRef::tag("h1")).unwrap();
            s.open("next.html").unwrap();
            assert!(matches!(
                s.text(heading),
                Err(PagecheckError::StaleElement { .. })
            ));
            assert!(matches!(
                s.click(heading),
                Err(PagecheckError::StaleElement { .. })
            ));
        }

        #[test]
        fn test_quit_makes_session_unavailable() {
            let mut s = session();
            let heading = s.wait_for(&ElementRef::tag("h1")).unwrap();
            s.quit().unwrap();
            assert!(!s.is_active());
            assert!(matches!(s.text(heading), Err(PagecheckError::SessionUnavailable)));
            assert!(matches!(
                s.wait_for(&ElementRef::tag("h1")),
                Err(PagecheckError::SessionUnavailable)
            ));
        }

        #[test]
        fn test_url_matches_relative_path() {
            let mut s = session();
            assert!(s.url_matches_path("home.html").unwrap());
            assert!(!s.url_matches_path("next.html").unwrap());
            let link = s.wait_for(&ElementRef::id("next-page-link")).unwrap();
            s.click(link).unwrap();
            s.wait_for_page(&PageCondition::UrlEndsWith("next.html".to_string()))
                .unwrap();
            assert!(s.url_matches_path("next.html").unwrap());
        }

        #[test]
        fn test_page_condition_times_out() {
            let mut s = session().with_navigation_wait_options(
                WaitOptions::new().with_timeout(20).with_poll_interval(5),
            );
            let err = s
                .wait_for_page(&PageCondition::TitleEquals("Nope".to_string()))
                .unwrap_err();
            match err {
                PagecheckError::TimeoutExceeded { reference, .. } => assert_eq!(reference, "page"),
                other => panic!("unexpected error: {other}"),
            }
        }
    }
}
