//! Scenario catalogue for the demo site.
//!
//! Every scenario starts by navigating to its starting page, so scenarios
//! are independent of each other and of their order.

use crate::assertion::Assertion;
use crate::form::FormRecord;
use crate::page_object::{HomePage, NextPage, PageObject};
use crate::result::PagecheckResult;
use crate::screenshot::ScreenshotRecorder;
use crate::session::Session;
use std::fmt;

/// Title of the home page
pub const HOME_TITLE: &str = "Automation Project";
/// Heading of the home page
pub const HOME_HEADING: &str = "Automation Project - Main Page";
/// Heading of the next page
pub const NEXT_HEADING: &str = "Automation Project - Next Page";
/// Title after the next page's title change
pub const CHANGED_TITLE: &str = "Title Changed";
/// Table titles, in page order
pub const TABLE_TITLES: [&str; 2] = ["Cities of the World", "Student Details"];
/// Second column of the students table
pub const STUDENT_FIRST_NAMES: [&str; 5] = ["John", "Jane", "Alice", "Michael", "Emily"];
/// Options of the city select, placeholder excluded
pub const CITY_OPTIONS: [&str; 4] = ["Jerusalem", "Tel Aviv", "Haifa", "Eilat"];
/// Text of the download completion message
pub const DOWNLOAD_MESSAGE: &str = "Download complete!";

/// What a scenario gets to work with
#[derive(Debug)]
pub struct ScenarioContext<'a> {
    /// The shared browser session
    pub session: &'a mut Session,
    /// Screenshot writer, already positioned on this scenario
    pub screenshots: &'a mut ScreenshotRecorder,
}

impl<'a> ScenarioContext<'a> {
    /// Bundle a session and recorder
    pub fn new(session: &'a mut Session, screenshots: &'a mut ScreenshotRecorder) -> Self {
        Self {
            session,
            screenshots,
        }
    }

    /// Screenshot the current page
    pub fn capture(&mut self, label: &str) -> PagecheckResult<()> {
        let _ = self.screenshots.capture(&*self.session, label)?;
        Ok(())
    }
}

/// Scenario body
pub type ScenarioFn = fn(&mut ScenarioContext<'_>) -> PagecheckResult<()>;

/// One named, independent check
#[derive(Clone, Copy)]
pub struct Scenario {
    /// Stable identifier used by filters and reports
    pub name: &'static str,
    /// One-line description
    pub description: &'static str,
    run: ScenarioFn,
}

impl fmt::Debug for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scenario")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl Scenario {
    /// Create a scenario
    #[must_use]
    pub const fn new(name: &'static str, description: &'static str, run: ScenarioFn) -> Self {
        Self {
            name,
            description,
            run,
        }
    }

    /// Run the scenario body
    pub fn run(&self, ctx: &mut ScenarioContext<'_>) -> PagecheckResult<()> {
        (self.run)(ctx)
    }
}

fn open_home_page(ctx: &mut ScenarioContext<'_>) -> PagecheckResult<()> {
    let _ = HomePage::open(ctx.session)?;
    ctx.capture("open_home_page")
}

fn title(ctx: &mut ScenarioContext<'_>) -> PagecheckResult<()> {
    let _ = HomePage::open(ctx.session)?;
    ctx.capture("open_home_page")?;
    let title = ctx.session.title()?;
    ctx.capture("home_page_title")?;
    Assertion::equals("page title", HOME_TITLE, title.as_str())
}

fn h1_text(ctx: &mut ScenarioContext<'_>) -> PagecheckResult<()> {
    let mut home = HomePage::open(ctx.session)?;
    let heading = home.heading()?;
    let text = home.session().text(heading)?;
    Assertion::equals("h1 text", HOME_HEADING, text.as_str())
}

fn only_single_h1(ctx: &mut ScenarioContext<'_>) -> PagecheckResult<()> {
    let mut home = HomePage::open(ctx.session)?;
    Assertion::count("h1 count", 1, &home.headings()?)
}

fn only_two_tables(ctx: &mut ScenarioContext<'_>) -> PagecheckResult<()> {
    let mut home = HomePage::open(ctx.session)?;
    Assertion::count("table container count", 2, &home.table_containers()?)
}

fn first_table_title(ctx: &mut ScenarioContext<'_>) -> PagecheckResult<()> {
    let titles = HomePage::open(ctx.session)?.table_titles()?;
    Assertion::equals(
        "first table title",
        &Some(TABLE_TITLES[0]),
        &titles.first().map(String::as_str),
    )
}

fn second_table_title(ctx: &mut ScenarioContext<'_>) -> PagecheckResult<()> {
    let titles = HomePage::open(ctx.session)?.table_titles()?;
    Assertion::equals(
        "second table title",
        &Some(TABLE_TITLES[1]),
        &titles.get(1).map(String::as_str),
    )
}

fn student_row_count(ctx: &mut ScenarioContext<'_>) -> PagecheckResult<()> {
    let rows = HomePage::open(ctx.session)?.student_rows()?;
    // first row holds the column headers
    Assertion::equals("student data rows", &5, &rows.len().saturating_sub(1))
}

fn student_first_names(ctx: &mut ScenarioContext<'_>) -> PagecheckResult<()> {
    let names = HomePage::open(ctx.session)?.student_first_names()?;
    Assertion::equals("student first names", &STUDENT_FIRST_NAMES[..], &names_ref(&names)[..])
}

fn city_options(ctx: &mut ScenarioContext<'_>) -> PagecheckResult<()> {
    let options = HomePage::open(ctx.session)?.city_options()?;
    Assertion::equals("city options", &CITY_OPTIONS[..], &names_ref(&options)[..])
}

fn names_ref(values: &[String]) -> Vec<&str> {
    values.iter().map(String::as_str).collect()
}

fn download_progress(ctx: &mut ScenarioContext<'_>) -> PagecheckResult<()> {
    let mut home = HomePage::open(ctx.session)?;
    home.start_download()?;
    ctx.screenshots.capture(home.session(), "download_started")?;
    let samples = home.wait_download_complete()?;
    Assertion::non_decreasing("download progress", &samples)?;
    Assertion::equals("final progress", &Some(100), &samples.last().copied())?;

    let message = home.download_message()?;
    let text = home.session().text(message)?;
    ctx.screenshots.capture(home.session(), "download_complete")?;
    Assertion::equals("download message", DOWNLOAD_MESSAGE, text.as_str())?;

    home.dismiss_download()?;
    Assertion::is_false("download message displayed", home.session().is_displayed(message)?)
}

fn navigate_to_next_page(ctx: &mut ScenarioContext<'_>) -> PagecheckResult<()> {
    let mut next = HomePage::open(ctx.session)?.go_to_next_page()?;
    Assertion::is_true("on next.html", next.is_loaded()?)?;
    let heading = next.heading()?;
    let text = next.session().text(heading)?;
    ctx.screenshots.capture(next.session(), "next_page")?;
    Assertion::equals("next page heading", NEXT_HEADING, text.as_str())
}

fn next_page_change_title(ctx: &mut ScenarioContext<'_>) -> PagecheckResult<()> {
    let mut next = NextPage::open(ctx.session)?;
    let title = next.change_title(CHANGED_TITLE)?;
    ctx.screenshots.capture(next.session(), "title_changed")?;
    Assertion::equals("changed title", CHANGED_TITLE, title.as_str())
}

fn back_to_home_page(ctx: &mut ScenarioContext<'_>) -> PagecheckResult<()> {
    let home = NextPage::open(ctx.session)?.go_back_home()?;
    Assertion::is_true("on home.html", home.is_loaded()?)?;
    let title = home.session().title()?;
    Assertion::equals("page title", HOME_TITLE, title.as_str())
}

fn submit_form(ctx: &mut ScenarioContext<'_>) -> PagecheckResult<()> {
    let record = FormRecord::sample();
    let mut home = HomePage::open(ctx.session)?;
    home.fill_form(&record)?;
    ctx.screenshots.capture(home.session(), "form_filled")?;
    let submitted = home.submit_form()?;
    ctx.screenshots.capture(home.session(), "form_submitted")?;
    Assertion::equals("submitted record", &record, &submitted)
}

fn clear_form(ctx: &mut ScenarioContext<'_>) -> PagecheckResult<()> {
    let mut home = HomePage::open(ctx.session)?;
    home.fill_form(&FormRecord::sample())?;
    Assertion::equals("filled record", &FormRecord::sample(), &home.read_form()?)?;
    home.reset_form()?;
    ctx.screenshots.capture(home.session(), "form_cleared")?;
    Assertion::equals("record after reset", &FormRecord::default(), &home.read_form()?)
}

/// Every scenario for the demo site, in catalogue order
#[must_use]
pub fn home_page_scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new("open_home_page", "home page loads", open_home_page),
        Scenario::new("title", "page title is the project name", title),
        Scenario::new("h1_text", "heading names the main page", h1_text),
        Scenario::new("only_single_h1", "exactly one h1", only_single_h1),
        Scenario::new("only_two_tables", "exactly two table containers", only_two_tables),
        Scenario::new("first_table_title", "first table is the cities table", first_table_title),
        Scenario::new(
            "second_table_title",
            "second table is the students table",
            second_table_title,
        ),
        Scenario::new("student_row_count", "students table has five data rows", student_row_count),
        Scenario::new(
            "student_first_names",
            "first-name column lists the students",
            student_first_names,
        ),
        Scenario::new("city_options", "city select offers four cities", city_options),
        Scenario::new(
            "download_progress",
            "download completes and the dialog closes",
            download_progress,
        ),
        Scenario::new("navigate_to_next_page", "link leads to next.html", navigate_to_next_page),
        Scenario::new(
            "next_page_change_title",
            "title control renames the page",
            next_page_change_title,
        ),
        Scenario::new("back_to_home_page", "return link leads to home.html", back_to_home_page),
        Scenario::new("submit_form", "submitted query reproduces the filled record", submit_form),
        Scenario::new("clear_form", "reset empties every field", clear_form),
    ]
}
