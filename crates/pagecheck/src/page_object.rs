//! Page façades for the demo site.
//!
//! Each façade borrows the [`Session`] and exposes one accessor per
//! meaningful element. Accessors re-resolve on every call, so a handle is
//! never reused across a navigation or DOM change.

use crate::assertion::Assertion;
use crate::driver::ElementHandle;
use crate::form::FormRecord;
use crate::locator::ElementRef;
use crate::result::PagecheckResult;
use crate::session::Session;
use crate::wait::{poll_until, Condition, PageCondition};

/// Radio values of the gender group
pub const GENDERS: [&str; 3] = ["male", "female", "other"];

/// Checkbox values of the subject group
pub const SUBJECTS: [&str; 3] = ["math", "physics", "chemistry"];

/// A page of the site, addressed relative to the session's base URL
pub trait PageObject {
    /// Path relative to the base URL, e.g. `home.html`
    fn path(&self) -> &'static str;

    /// Name for logs and reports
    fn page_name(&self) -> &'static str;

    /// The session this page drives
    fn session(&self) -> &Session;

    /// Mutable access to the session
    fn session_mut(&mut self) -> &mut Session;

    /// Navigate to the page
    fn navigate(&mut self) -> PagecheckResult<()> {
        let path = self.path();
        self.session_mut().open(path)
    }

    /// Whether the browser is currently on this page
    fn is_loaded(&self) -> PagecheckResult<bool> {
        self.session().url_matches_path(self.path())
    }
}

/// Façade over `home.html`
#[derive(Debug)]
pub struct HomePage<'a> {
    session: &'a mut Session,
}

impl<'a> PageObject for HomePage<'a> {
    fn path(&self) -> &'static str {
        "home.html"
    }

    fn page_name(&self) -> &'static str {
        "home page"
    }

    fn session(&self) -> &Session {
        &*self.session
    }

    fn session_mut(&mut self) -> &mut Session {
        &mut *self.session
    }
}

fn students_container() -> ElementRef {
    ElementRef::class("table-container").nth(1)
}

fn download_progress_ref() -> ElementRef {
    ElementRef::id("download-progress")
}

fn parse_progress(raw: &str) -> Option<u32> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(|v| v.round() as u32)
}

impl<'a> HomePage<'a> {
    /// Wrap a session without navigating
    pub fn new(session: &'a mut Session) -> Self {
        Self { session }
    }

    /// Navigate to the home page and wait for its heading
    pub fn open(session: &'a mut Session) -> PagecheckResult<Self> {
        let mut page = Self::new(session);
        page.navigate()?;
        let _ = page.heading()?;
        Ok(page)
    }

    /// The page's `h1`
    pub fn heading(&mut self) -> PagecheckResult<ElementHandle> {
        self.session.wait_for(&ElementRef::tag("h1"))
    }

    /// Every `h1` on the page
    pub fn headings(&mut self) -> PagecheckResult<Vec<ElementHandle>> {
        self.session.wait_for_all(&ElementRef::tag("h1"))
    }

    /// The `.table-container` sections
    pub fn table_containers(&mut self) -> PagecheckResult<Vec<ElementHandle>> {
        self.session.wait_for_all(&ElementRef::class("table-container"))
    }

    /// Texts of the table titles (`h2`), in page order
    pub fn table_titles(&mut self) -> PagecheckResult<Vec<String>> {
        let titles = self.session.wait_for_all(&ElementRef::tag("h2"))?;
        self.session.texts(&titles)
    }

    /// The cities table
    pub fn cities_table(&mut self) -> PagecheckResult<ElementHandle> {
        self.session.wait_for(&ElementRef::id("cities-table"))
    }

    /// The students table
    pub fn students_table(&mut self) -> PagecheckResult<ElementHandle> {
        self.session
            .wait_for(&ElementRef::tag("table").within(students_container()))
    }

    /// Every row of the students table, header row first
    pub fn student_rows(&mut self) -> PagecheckResult<Vec<ElementHandle>> {
        self.session
            .wait_for_all(&ElementRef::tag("tr").within(students_container()))
    }

    /// The "First Name" column of the students table
    pub fn student_first_names(&mut self) -> PagecheckResult<Vec<String>> {
        let cells = self.session.wait_for_all(
            &ElementRef::xpath(".//tbody/tr/td[2]").within(students_container()),
        )?;
        self.session.texts(&cells)
    }

    /// Download trigger
    pub fn download_button(&mut self) -> PagecheckResult<ElementHandle> {
        self.session.wait_for(&ElementRef::id("download-button"))
    }

    /// Download `<progress>` bar
    pub fn download_progress(&mut self) -> PagecheckResult<ElementHandle> {
        self.session.wait_for(&download_progress_ref())
    }

    /// Completion message, once displayed
    pub fn download_message(&mut self) -> PagecheckResult<ElementHandle> {
        self.session.wait_visible(&ElementRef::id("download-message"))
    }

    /// Button dismissing the completion dialog
    pub fn download_close_button(&mut self) -> PagecheckResult<ElementHandle> {
        self.session.wait_visible(&ElementRef::id("close-dialog"))
    }

    /// Link to the next page
    pub fn next_page_link(&mut self) -> PagecheckResult<ElementHandle> {
        self.session.wait_for(&ElementRef::id("next-page-link"))
    }

    /// First name field
    pub fn first_name(&mut self) -> PagecheckResult<ElementHandle> {
        self.session.wait_for(&ElementRef::id("first-name"))
    }

    /// Last name field
    pub fn last_name(&mut self) -> PagecheckResult<ElementHandle> {
        self.session.wait_for(&ElementRef::id("last-name"))
    }

    /// City `<select>`
    pub fn city(&mut self) -> PagecheckResult<ElementHandle> {
        self.session.wait_for(&ElementRef::id("city"))
    }

    /// Texts of the real city options (placeholder excluded)
    pub fn city_options(&mut self) -> PagecheckResult<Vec<String>> {
        let options = self
            .session
            .wait_for_all(&ElementRef::css("option[value]").within(ElementRef::id("city")))?;
        let mut texts = Vec::with_capacity(options.len());
        for option in options {
            if self.session.attribute(option, "value")?.unwrap_or_default().is_empty() {
                continue;
            }
            texts.push(self.session.text(option)?);
        }
        Ok(texts)
    }

    /// Email field
    pub fn email(&mut self) -> PagecheckResult<ElementHandle> {
        self.session.wait_for(&ElementRef::id("email"))
    }

    /// Mobile field
    pub fn mobile(&mut self) -> PagecheckResult<ElementHandle> {
        self.session.wait_for(&ElementRef::id("mobile"))
    }

    /// Gender radio with the given value
    pub fn gender(&mut self, value: &str) -> PagecheckResult<ElementHandle> {
        self.session
            .wait_for(&ElementRef::css(format!("input[name=\"gender\"][value=\"{value}\"]")))
    }

    /// Subject checkbox with the given value
    pub fn subject(&mut self, value: &str) -> PagecheckResult<ElementHandle> {
        self.session
            .wait_for(&ElementRef::css(format!("input[name=\"subject\"][value=\"{value}\"]")))
    }

    /// Form submit button
    pub fn submit_button(&mut self) -> PagecheckResult<ElementHandle> {
        self.session.wait_for(&ElementRef::id("submit-button"))
    }

    /// Form reset button
    pub fn reset_button(&mut self) -> PagecheckResult<ElementHandle> {
        self.session.wait_for(&ElementRef::id("reset-button"))
    }

    fn set_text(&mut self, field: ElementHandle, value: &str) -> PagecheckResult<()> {
        self.session.clear(field)?;
        if value.is_empty() {
            return Ok(());
        }
        self.session.type_text(field, value)
    }

    fn set_checked(&mut self, control: ElementHandle, checked: bool) -> PagecheckResult<()> {
        if self.session.is_selected(control)? != checked {
            self.session.click(control)?;
        }
        Ok(())
    }

    /// Fill the registration form with `record`
    pub fn fill_form(&mut self, record: &FormRecord) -> PagecheckResult<()> {
        tracing::debug!(?record, "filling registration form");
        let field = self.first_name()?;
        self.set_text(field, &record.first_name)?;
        let field = self.last_name()?;
        self.set_text(field, &record.last_name)?;
        if !record.city.is_empty() {
            let city = self.city()?;
            self.session.select_by_text(city, &record.city)?;
        }
        let field = self.email()?;
        self.set_text(field, &record.email)?;
        let field = self.mobile()?;
        self.set_text(field, &record.mobile)?;
        if let Some(gender) = &record.gender {
            let radio = self.gender(gender)?;
            self.set_checked(radio, true)?;
        }
        for subject in SUBJECTS {
            let checkbox = self.subject(subject)?;
            self.set_checked(checkbox, record.subjects.contains(subject))?;
        }
        Ok(())
    }

    /// Submit the form and decode the record from the resulting URL
    pub fn submit_form(&mut self) -> PagecheckResult<FormRecord> {
        let submit = self.submit_button()?;
        self.session.click(submit)?;

        let options = self.session.wait_options();
        let session = &*self.session;
        let url = poll_until(&options, || {
            let url = session.current_url()?;
            Ok(url.contains('?').then_some(url))
        })?
        .into_result("page", "url with a query string")?;
        Assertion::is_true("submitted to home.html", session.url_matches_path(self.path())?)?;
        FormRecord::from_url(&url)
    }

    /// Reset the form
    pub fn reset_form(&mut self) -> PagecheckResult<()> {
        let reset = self.reset_button()?;
        self.session.click(reset)
    }

    /// Read the form's current values
    pub fn read_form(&mut self) -> PagecheckResult<FormRecord> {
        let mut record = FormRecord::default();
        let value = |page: &mut Self, handle: ElementHandle| -> PagecheckResult<String> {
            Ok(page.session.property(handle, "value")?.unwrap_or_default())
        };
        let field = self.first_name()?;
        record.first_name = value(self, field)?;
        let field = self.last_name()?;
        record.last_name = value(self, field)?;
        let field = self.city()?;
        record.city = value(self, field)?;
        let field = self.email()?;
        record.email = value(self, field)?;
        let field = self.mobile()?;
        record.mobile = value(self, field)?;
        for gender in GENDERS {
            let radio = self.gender(gender)?;
            if self.session.is_selected(radio)? {
                record.gender = Some(gender.to_string());
            }
        }
        for subject in SUBJECTS {
            let checkbox = self.subject(subject)?;
            if self.session.is_selected(checkbox)? {
                let _ = record.subjects.insert(subject.to_string());
            }
        }
        Ok(record)
    }

    /// Click the download button
    pub fn start_download(&mut self) -> PagecheckResult<()> {
        let button = self.download_button()?;
        self.session.click(button)
    }

    /// Sample the progress bar until it reaches 100; returns every sample seen
    pub fn wait_download_complete(&mut self) -> PagecheckResult<Vec<u32>> {
        let reference = download_progress_ref();
        let options = self.session.wait_options();
        let session = &mut *self.session;
        let mut samples = Vec::new();
        let outcome = poll_until(&options, || {
            let Some(bar) = session.find_now(&reference)?.first().copied() else {
                return Ok(None);
            };
            let raw = session.property(bar, "value")?.unwrap_or_default();
            let Some(value) = parse_progress(&raw) else {
                return Ok(None);
            };
            if samples.last() != Some(&value) {
                samples.push(value);
            }
            Ok((value >= 100).then_some(()))
        })?;
        outcome.into_result(&reference, Condition::attribute("value", "100"))?;
        tracing::debug!(?samples, "download progress sampled");
        Ok(samples)
    }

    /// Close the completion dialog and wait until it is hidden
    pub fn dismiss_download(&mut self) -> PagecheckResult<()> {
        let close = self.download_close_button()?;
        self.session.click(close)?;
        let _ = self
            .session
            .wait_until(&ElementRef::id("download-dialog"), &Condition::Hidden)?;
        Ok(())
    }

    /// Follow the next-page link
    pub fn go_to_next_page(mut self) -> PagecheckResult<NextPage<'a>> {
        let link = self.next_page_link()?;
        self.session.click(link)?;
        let mut next = NextPage::new(self.session);
        let path = next.path();
        next.session
            .wait_for_page(&PageCondition::UrlEndsWith(path.to_string()))?;
        let _ = next.heading()?;
        Ok(next)
    }
}

/// Façade over `next.html`
#[derive(Debug)]
pub struct NextPage<'a> {
    session: &'a mut Session,
}

impl<'a> PageObject for NextPage<'a> {
    fn path(&self) -> &'static str {
        "next.html"
    }

    fn page_name(&self) -> &'static str {
        "next page"
    }

    fn session(&self) -> &Session {
        &*self.session
    }

    fn session_mut(&mut self) -> &mut Session {
        &mut *self.session
    }
}

impl<'a> NextPage<'a> {
    /// Wrap a session without navigating
    pub fn new(session: &'a mut Session) -> Self {
        Self { session }
    }

    /// Navigate to the next page and wait for its heading
    pub fn open(session: &'a mut Session) -> PagecheckResult<Self> {
        let mut page = Self::new(session);
        page.navigate()?;
        let _ = page.heading()?;
        Ok(page)
    }

    /// The page's `h1`
    pub fn heading(&mut self) -> PagecheckResult<ElementHandle> {
        self.session.wait_for(&ElementRef::tag("h1"))
    }

    /// Title-change control
    pub fn change_title_button(&mut self) -> PagecheckResult<ElementHandle> {
        self.session.wait_for(&ElementRef::id("change-title-button"))
    }

    /// Link back to the home page
    pub fn back_link(&mut self) -> PagecheckResult<ElementHandle> {
        self.session.wait_for(&ElementRef::id("back-link"))
    }

    /// Click the title-change control and wait for `expected`
    pub fn change_title(&mut self, expected: &str) -> PagecheckResult<String> {
        let button = self.change_title_button()?;
        self.session.click(button)?;
        self.session
            .wait_for_page(&PageCondition::TitleEquals(expected.to_string()))?;
        self.session.title()
    }

    /// Follow the link back to the home page
    pub fn go_back_home(mut self) -> PagecheckResult<HomePage<'a>> {
        let link = self.back_link()?;
        self.session.click(link)?;
        let mut home = HomePage::new(self.session);
        let path = home.path();
        home.session
            .wait_for_page(&PageCondition::UrlEndsWith(path.to_string()))?;
        let _ = home.heading()?;
        Ok(home)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::simulated::SimulatedDriver;
    use crate::wait::WaitOptions;
    use std::time::Duration;
    use url::Url;

    fn session() -> Session {
        let mut session = Session::new(
            Box::new(SimulatedDriver::new().with_download_step(Duration::from_millis(2))),
            Url::parse("file:///site/web/").unwrap(),
        )
        .with_wait_options(WaitOptions::new().with_timeout(1000).with_poll_interval(1));
        session.start().unwrap();
        session
    }

    mod home_page_tests {
        use super::*;

        #[test]
        fn test_open_and_is_loaded() {
            let mut s = session();
            let home = HomePage::open(&mut s).unwrap();
            assert!(home.is_loaded().unwrap());
            assert_eq!(home.page_name(), "home page");
        }

        #[test]
        fn test_tables() {
            let mut s = session();
            let mut home = HomePage::open(&mut s).unwrap();
            assert_eq!(home.table_containers().unwrap().len(), 2);
            assert_eq!(
                home.table_titles().unwrap(),
                ["Cities of the World", "Student Details"]
            );
            assert_eq!(home.student_rows().unwrap().len(), 6);
            assert_eq!(
                home.student_first_names().unwrap(),
                ["John", "Jane", "Alice", "Michael", "Emily"]
            );
            let _ = home.cities_table().unwrap();
            let table = home.students_table().unwrap();
            assert_eq!(
                home.session().attribute(table, "id").unwrap().as_deref(),
                Some("students-table")
            );
        }

        #[test]
        fn test_city_options_skip_placeholder() {
            let mut s = session();
            let mut home = HomePage::open(&mut s).unwrap();
            assert_eq!(
                home.city_options().unwrap(),
                ["Jerusalem", "Tel Aviv", "Haifa", "Eilat"]
            );
        }

        #[test]
        fn test_fill_read_and_reset() {
            let mut s = session();
            let mut home = HomePage::open(&mut s).unwrap();
            home.fill_form(&FormRecord::sample()).unwrap();
            assert_eq!(home.read_form().unwrap(), FormRecord::sample());
            home.reset_form().unwrap();
            assert!(home.read_form().unwrap().is_blank());
        }

        #[test]
        fn test_submit_round_trips_record() {
            let mut s = session();
            let mut home = HomePage::open(&mut s).unwrap();
            home.fill_form(&FormRecord::sample()).unwrap();
            assert_eq!(home.submit_form().unwrap(), FormRecord::sample());
        }

        #[test]
        fn test_download_samples_are_monotonic() {
            let mut s = session();
            let mut home = HomePage::open(&mut s).unwrap();
            home.start_download().unwrap();
            let samples = home.wait_download_complete().unwrap();
            assert_eq!(samples.last(), Some(&100));
            assert!(samples.windows(2).all(|w| w[0] <= w[1]));
            let message = home.download_message().unwrap();
            assert_eq!(home.session().text(message).unwrap(), "Download complete!");
            home.dismiss_download().unwrap();
        }

        #[test]
        fn test_parse_progress() {
            assert_eq!(parse_progress("40"), Some(40));
            assert_eq!(parse_progress("99.6"), Some(100));
            assert_eq!(parse_progress(""), None);
            assert_eq!(parse_progress("-3"), None);
        }
    }

    mod navigation_tests {
        use super::*;

        #[test]
        fn test_round_trip_between_pages() {
            let mut s = session();
            let home = HomePage::open(&mut s).unwrap();
            let mut next = home.go_to_next_page().unwrap();
            assert!(next.is_loaded().unwrap());
            assert_eq!(next.change_title("Title Changed").unwrap(), "Title Changed");
            let home = next.go_back_home().unwrap();
            assert!(home.is_loaded().unwrap());
        }
    }
}
