//! In-process copy of the demo site under `web/`.
//!
//! Keep this in step with `web/home.html` and `web/next.html`: ids, classes,
//! names and literal texts are what the page façades and scenarios look for.

use super::dom::{Document, El, NodeId};

/// Pages the simulated site can serve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SitePage {
    /// `home.html`
    Home,
    /// `next.html`
    Next,
}

impl SitePage {
    /// Resolve a file name to a page
    #[must_use]
    pub fn from_file(name: &str) -> Option<Self> {
        match name {
            "home.html" => Some(Self::Home),
            "next.html" => Some(Self::Next),
            _ => None,
        }
    }

    /// Build a fresh document for this page
    #[must_use]
    pub fn render(self) -> Document {
        match self {
            Self::Home => home_page(),
            Self::Next => next_page(),
        }
    }
}

/// Title set by the next page's change-title control
pub const CHANGED_TITLE: &str = "Title Changed";

const CITIES: [[&str; 3]; 5] = [
    ["Tokyo", "Japan", "37,400,068"],
    ["Delhi", "India", "28,514,000"],
    ["Shanghai", "China", "25,582,000"],
    ["Sao Paulo", "Brazil", "21,650,000"],
    ["Mexico City", "Mexico", "21,581,000"],
];

const STUDENTS: [[&str; 5]; 5] = [
    ["1", "John", "Doe", "20", "Computer Science"],
    ["2", "Jane", "Smith", "22", "Mathematics"],
    ["3", "Alice", "Johnson", "21", "Physics"],
    ["4", "Michael", "Brown", "23", "Chemistry"],
    ["5", "Emily", "Davis", "20", "Biology"],
];

const CITY_OPTIONS: [&str; 4] = ["Jerusalem", "Tel Aviv", "Haifa", "Eilat"];

fn table<const N: usize>(
    doc: &mut Document,
    parent: NodeId,
    id: &str,
    header: [&str; N],
    rows: &[[&str; N]],
) {
    let table = doc.append(parent, El::new("table").id(id));
    let thead = doc.append(table, El::new("thead"));
    let head_row = doc.append(thead, El::new("tr"));
    for cell in header {
        let _ = doc.append(head_row, El::new("th").text(cell));
    }
    let tbody = doc.append(table, El::new("tbody"));
    for row in rows {
        let tr = doc.append(tbody, El::new("tr"));
        for cell in row {
            let _ = doc.append(tr, El::new("td").text(cell));
        }
    }
}

fn labelled_input(doc: &mut Document, form: NodeId, label: &str, id: &str, name: &str, kind: &str) {
    let row = doc.append(form, El::new("div").class("form-row"));
    let _ = doc.append(row, El::new("label").attr("for", id).text(label));
    let _ = doc.append(
        row,
        El::new("input").id(id).attr("name", name).attr("type", kind),
    );
}

fn choice_group(
    doc: &mut Document,
    form: NodeId,
    legend: &str,
    name: &str,
    kind: &str,
    choices: &[(&str, &str)],
) {
    let fieldset = doc.append(form, El::new("fieldset").class("form-row"));
    let _ = doc.append(fieldset, El::new("legend").text(legend));
    for (value, label) in choices {
        let id = format!("{name}-{value}");
        let _ = doc.append(
            fieldset,
            El::new("input")
                .id(&id)
                .attr("type", kind)
                .attr("name", name)
                .attr("value", value),
        );
        let _ = doc.append(fieldset, El::new("label").attr("for", &id).text(label));
    }
}

/// The home page document
#[must_use]
pub fn home_page() -> Document {
    let mut doc = Document::new("Automation Project");
    let body = doc.append(doc.root(), El::new("body"));

    let header = doc.append(body, El::new("header"));
    let _ = doc.append(header, El::new("h1").text("Automation Project - Main Page"));
    let nav = doc.append(header, El::new("nav"));
    let _ = doc.append(
        nav,
        El::new("a")
            .id("next-page-link")
            .attr("href", "next.html")
            .text("Go to Next Page"),
    );

    let cities = doc.append(body, El::new("div").class("table-container"));
    let _ = doc.append(cities, El::new("h2").text("Cities of the World"));
    table(&mut doc, cities, "cities-table", ["City", "Country", "Population"], &CITIES);

    let students = doc.append(body, El::new("div").class("table-container"));
    let _ = doc.append(students, El::new("h2").text("Student Details"));
    table(
        &mut doc,
        students,
        "students-table",
        ["ID", "First Name", "Last Name", "Age", "Major"],
        &STUDENTS,
    );

    let download = doc.append(body, El::new("section").id("download-section"));
    let _ = doc.append(download, El::new("h3").text("Download File"));
    let _ = doc.append(
        download,
        El::new("button")
            .id("download-button")
            .attr("type", "button")
            .text("Start Download"),
    );
    let _ = doc.append(
        download,
        El::new("progress")
            .id("download-progress")
            .attr("value", "0")
            .attr("max", "100"),
    );
    let _ = doc.append(download, El::new("span").id("download-percent").text("0%"));
    let dialog = doc.append(download, El::new("div").id("download-dialog").hidden());
    let _ = doc.append(
        dialog,
        El::new("p").id("download-message").text("Download complete!"),
    );
    let _ = doc.append(
        dialog,
        El::new("button")
            .id("close-dialog")
            .attr("type", "button")
            .text("Close"),
    );

    let section = doc.append(body, El::new("section").id("form-section"));
    let _ = doc.append(section, El::new("h3").text("Registration Form"));
    let form = doc.append(
        section,
        El::new("form")
            .id("registration-form")
            .attr("action", "home.html")
            .attr("method", "get"),
    );
    labelled_input(&mut doc, form, "First Name", "first-name", "firstName", "text");
    labelled_input(&mut doc, form, "Last Name", "last-name", "lastName", "text");

    let city_row = doc.append(form, El::new("div").class("form-row"));
    let _ = doc.append(city_row, El::new("label").attr("for", "city").text("City"));
    let select = doc.append(city_row, El::new("select").id("city").attr("name", "city"));
    let _ = doc.append(
        select,
        El::new("option").attr("value", "").attr("selected", "").text("Select a city"),
    );
    for city in CITY_OPTIONS {
        let _ = doc.append(select, El::new("option").attr("value", city).text(city));
    }

    labelled_input(&mut doc, form, "Email", "email", "email", "email");
    labelled_input(&mut doc, form, "Mobile", "mobile", "mobile", "tel");
    choice_group(
        &mut doc,
        form,
        "Gender",
        "gender",
        "radio",
        &[("male", "Male"), ("female", "Female"), ("other", "Other")],
    );
    choice_group(
        &mut doc,
        form,
        "Subjects",
        "subject",
        "checkbox",
        &[("math", "Math"), ("physics", "Physics"), ("chemistry", "Chemistry")],
    );

    let actions = doc.append(form, El::new("div").class("form-actions"));
    let _ = doc.append(
        actions,
        El::new("button").id("submit-button").attr("type", "submit").text("Submit"),
    );
    let _ = doc.append(
        actions,
        El::new("button").id("reset-button").attr("type", "reset").text("Reset"),
    );

    doc
}

/// The next page document
#[must_use]
pub fn next_page() -> Document {
    let mut doc = Document::new("Next Page");
    let body = doc.append(doc.root(), El::new("body"));
    let _ = doc.append(body, El::new("h1").text("Automation Project - Next Page"));
    let _ = doc.append(
        body,
        El::new("button")
            .id("change-title-button")
            .attr("type", "button")
            .text("Change Title"),
    );
    let _ = doc.append(
        body,
        El::new("a")
            .id("back-link")
            .attr("href", "home.html")
            .text("Back to Home Page"),
    );
    doc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_lookup() {
        assert_eq!(SitePage::from_file("home.html"), Some(SitePage::Home));
        assert_eq!(SitePage::from_file("next.html"), Some(SitePage::Next));
        assert_eq!(SitePage::from_file("missing.html"), None);
    }

    #[test]
    fn test_home_page_shape() {
        let doc = home_page();
        let all = doc.descendants(doc.root());
        let count = |tag: &str| all.iter().filter(|&&n| doc.node(n).tag == tag).count();
        assert_eq!(count("h1"), 1);
        assert_eq!(count("h2"), 2);
        assert_eq!(count("table"), 2);
        assert_eq!(count("select"), 1);
        assert!(doc.by_id("download-dialog").is_some_and(|d| !doc.is_displayed(d)));
    }

    #[test]
    fn test_next_page_shape() {
        let doc = next_page();
        assert_eq!(doc.title, "Next Page");
        assert!(doc.by_id("change-title-button").is_some());
        assert!(doc.by_id("back-link").is_some());
    }
}
