//! Simulated driver: an in-process model of the demo site.
//!
//! Serves `home.html` and `next.html` from [`site`], resolves locators with a
//! small CSS/XPath engine and scripts the page behaviours a browser would run
//! (download progress, dialog dismissal, form submit/reset, title change).
//! Every scenario in the catalogue runs against it without a browser.

mod dom;
mod selector;
mod site;

pub use dom::{Document, El, Node, NodeId};
pub use selector::{CssSelector, XPath};
pub use site::{SitePage, CHANGED_TITLE};

use crate::driver::{Driver, ElementHandle, Screenshot};
use crate::locator::By;
use crate::result::{PagecheckError, PagecheckResult};
use std::borrow::Cow;
use std::time::{Duration, Instant};
use url::Url;

/// Default time between two 10% download progress steps
pub const DEFAULT_DOWNLOAD_STEP_MS: u64 = 30;

/// Progress added per download step
const DOWNLOAD_INCREMENT: u32 = 10;

#[derive(Debug, Clone, Copy)]
struct Download {
    started: Instant,
    dismissed: bool,
}

/// Driver backed by an in-process copy of the demo site
#[derive(Debug)]
pub struct SimulatedDriver {
    active: bool,
    generation: u64,
    url: Option<Url>,
    page: Option<SitePage>,
    doc: Document,
    download: Option<Download>,
    download_step: Duration,
    viewport: (u32, u32),
    call_history: Vec<String>,
}

impl Default for SimulatedDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedDriver {
    /// Create a stopped driver with an empty page
    #[must_use]
    pub fn new() -> Self {
        Self {
            active: false,
            generation: 0,
            url: None,
            page: None,
            doc: Document::new(""),
            download: None,
            download_step: Duration::from_millis(DEFAULT_DOWNLOAD_STEP_MS),
            viewport: (1280, 800),
            call_history: Vec::new(),
        }
    }

    /// Set the time between download progress steps
    #[must_use]
    pub const fn with_download_step(mut self, step: Duration) -> Self {
        self.download_step = step;
        self
    }

    /// Set the screenshot size
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport = (width, height);
        self
    }

    /// Calls made so far, as `method:argument` strings
    #[must_use]
    pub fn history(&self) -> &[String] {
        &self.call_history
    }

    /// Check if method was called
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.call_history.iter().any(|c| c.starts_with(method))
    }

    /// The page currently loaded, if any
    #[must_use]
    pub const fn page(&self) -> Option<SitePage> {
        self.page
    }

    fn ensure_active(&self) -> PagecheckResult<()> {
        if self.active {
            Ok(())
        } else {
            Err(PagecheckError::SessionUnavailable)
        }
    }

    fn node_id(&self, element: ElementHandle) -> PagecheckResult<NodeId> {
        self.ensure_active()?;
        let stale = || PagecheckError::StaleElement {
            handle: element.to_string(),
        };
        if element.generation != self.generation {
            return Err(stale());
        }
        let id = usize::try_from(element.node).map_err(|_| stale())?;
        self.doc.get(id).map(|_| id).ok_or_else(stale)
    }

    fn download_progress(&self) -> Option<u32> {
        self.download.map(|download| {
            let step = self.download_step.as_millis().max(1);
            let steps = download.started.elapsed().as_millis() / step;
            u32::try_from(steps)
                .unwrap_or(u32::MAX)
                .saturating_mul(DOWNLOAD_INCREMENT)
                .min(100)
        })
    }

    /// The document as a browser would render it right now
    fn document(&self) -> Cow<'_, Document> {
        let (Some(progress), Some(download)) = (self.download_progress(), self.download) else {
            return Cow::Borrowed(&self.doc);
        };
        let mut doc = self.doc.clone();
        if let Some(node) = doc.by_id("download-progress").and_then(|id| doc.get_mut(id)) {
            node.value = progress.to_string();
            let _ = node.attrs.insert("value".to_string(), progress.to_string());
        }
        if let Some(node) = doc.by_id("download-percent").and_then(|id| doc.get_mut(id)) {
            node.text = format!("{progress}%");
        }
        if let Some(node) = doc.by_id("download-dialog").and_then(|id| doc.get_mut(id)) {
            node.hidden = progress < 100 || download.dismissed;
        }
        Cow::Owned(doc)
    }

    fn handles(&self, nodes: impl IntoIterator<Item = NodeId>) -> Vec<ElementHandle> {
        nodes
            .into_iter()
            .map(|n| ElementHandle::new(n as u64, self.generation))
            .collect()
    }

    fn load(&mut self, url: Url) -> PagecheckResult<()> {
        let file = url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .unwrap_or_default()
            .to_string();
        let page = SitePage::from_file(&file).ok_or_else(|| PagecheckError::Navigation {
            url: url.to_string(),
            message: format!("no page named {file:?} on the simulated site"),
        })?;
        self.doc = page.render();
        self.page = Some(page);
        self.url = Some(url);
        self.download = None;
        self.generation += 1;
        tracing::debug!(page = ?page, generation = self.generation, "simulated page loaded");
        Ok(())
    }

    fn follow(&mut self, href: &str) -> PagecheckResult<()> {
        let base = self.url.clone().ok_or(PagecheckError::SessionUnavailable)?;
        let target = base.join(href)?;
        self.load(target)
    }

    fn submit(&mut self, form: NodeId) -> PagecheckResult<()> {
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        for id in self.doc.descendants(form) {
            let node = self.doc.node(id);
            let Some(name) = node.attr("name") else {
                continue;
            };
            if node.is_text_control() {
                let _ = query.append_pair(name, &node.value);
            } else if node.is_checkable() {
                if node.checked {
                    let _ = query.append_pair(name, node.attr("value").unwrap_or("on"));
                }
            } else if node.tag == "select" {
                let _ = query.append_pair(name, &self.select_value(id));
            }
        }
        let query = query.finish();
        let action = self.doc.node(form).attr("action").unwrap_or("").to_string();
        let base = self.url.clone().ok_or(PagecheckError::SessionUnavailable)?;
        let mut target = base.join(&action)?;
        target.set_query(Some(&query));
        tracing::debug!(query = %query, "simulated form submitted");
        self.load(target)
    }

    fn reset(&mut self, form: NodeId) {
        for id in self.doc.descendants(form) {
            if let Some(node) = self.doc.get_mut(id) {
                if node.is_text_control() {
                    node.value = node.attr("value").unwrap_or_default().to_string();
                } else if node.is_checkable() {
                    node.checked = node.attr("checked").is_some();
                } else if node.tag == "option" {
                    node.checked = node.attr("selected").is_some();
                }
            }
        }
    }

    fn select_value(&self, select: NodeId) -> String {
        let options: Vec<NodeId> = self
            .doc
            .descendants(select)
            .into_iter()
            .filter(|&n| self.doc.node(n).tag == "option")
            .collect();
        options
            .iter()
            .find(|&&n| self.doc.node(n).checked)
            .or_else(|| options.first())
            .map(|&n| self.option_value(n))
            .unwrap_or_default()
    }

    fn option_value(&self, option: NodeId) -> String {
        let node = self.doc.node(option);
        node.attr("value")
            .map_or_else(|| self.doc.text_content(option), str::to_string)
    }

    fn choose_option(&mut self, select: NodeId, option: NodeId) {
        for id in self.doc.descendants(select) {
            if let Some(node) = self.doc.get_mut(id) {
                if node.tag == "option" {
                    node.checked = id == option;
                }
            }
        }
    }

    fn toggle(&mut self, id: NodeId) {
        let node = self.doc.node(id);
        if node.input_type() == "radio" {
            let name = node.attr("name").map(str::to_string);
            let group_root = self.doc.enclosing_form(id).unwrap_or(self.doc.root());
            for other in self.doc.descendants(group_root) {
                if let Some(peer) = self.doc.get_mut(other) {
                    if peer.is_checkable()
                        && peer.input_type() == "radio"
                        && peer.attr("name").map(str::to_string) == name
                    {
                        peer.checked = other == id;
                    }
                }
            }
        } else if let Some(node) = self.doc.get_mut(id) {
            node.checked = !node.checked;
        }
    }

    fn text_control(&self, id: NodeId, element: ElementHandle) -> PagecheckResult<()> {
        let node = self.doc.node(id);
        if !node.is_text_control() {
            return Err(PagecheckError::interaction(format!(
                "element {element} (<{}>) does not accept text",
                node.tag
            )));
        }
        if !self.document().is_displayed(id) {
            return Err(PagecheckError::interaction(format!(
                "element {element} is not displayed"
            )));
        }
        Ok(())
    }

    fn render_png(&self) -> PagecheckResult<Vec<u8>> {
        let (width, height) = self.viewport;
        let band = height.min(48);
        let mut pixels = Vec::with_capacity(width as usize * height as usize * 3);
        for row in 0..height {
            let colour: [u8; 3] = if row < band {
                [0x2c, 0x3e, 0x50]
            } else {
                [0xf4, 0xf4, 0xf4]
            };
            for _ in 0..width {
                pixels.extend_from_slice(&colour);
            }
        }

        let encode_err = |e: png::EncodingError| PagecheckError::Screenshot {
            message: e.to_string(),
        };
        let mut data = Vec::new();
        let mut encoder = png::Encoder::new(&mut data, width, height);
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().map_err(encode_err)?;
        writer.write_image_data(&pixels).map_err(encode_err)?;
        writer.finish().map_err(encode_err)?;
        Ok(data)
    }
}

impl Driver for SimulatedDriver {
    fn start(&mut self) -> PagecheckResult<()> {
        self.call_history.push("start".to_string());
        self.active = true;
        Ok(())
    }

    fn quit(&mut self) -> PagecheckResult<()> {
        self.call_history.push("quit".to_string());
        self.active = false;
        self.url = None;
        self.page = None;
        self.download = None;
        self.doc = Document::new("");
        self.generation += 1;
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn generation(&self) -> u64 {
        self.generation
    }

    fn navigate(&mut self, url: &str) -> PagecheckResult<()> {
        self.ensure_active()?;
        self.call_history.push(format!("navigate:{url}"));
        let parsed = Url::parse(url).map_err(|e| PagecheckError::Navigation {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        self.load(parsed)
    }

    fn current_url(&self) -> PagecheckResult<String> {
        self.ensure_active()?;
        Ok(self
            .url
            .as_ref()
            .map_or_else(|| "about:blank".to_string(), Url::to_string))
    }

    fn title(&self) -> PagecheckResult<String> {
        self.ensure_active()?;
        Ok(self.doc.title.clone())
    }

    fn find_elements(
        &mut self,
        by: &By,
        scope: Option<ElementHandle>,
    ) -> PagecheckResult<Vec<ElementHandle>> {
        self.ensure_active()?;
        let context = match scope {
            Some(handle) => self.node_id(handle)?,
            None => self.doc.root(),
        };
        let doc = self.document();
        let found: Vec<NodeId> = match by {
            By::XPath(expr) => XPath::parse(expr)?.evaluate(&doc, context),
            By::LinkText(text) => doc
                .descendants(context)
                .into_iter()
                .filter(|&n| doc.node(n).tag == "a" && doc.rendered_text(n) == *text)
                .collect(),
            other => {
                let css = other.to_css().ok_or_else(|| PagecheckError::InvalidSelector {
                    selector: other.to_string(),
                    message: "no CSS form".to_string(),
                })?;
                let selector = CssSelector::parse(&css)?;
                doc.descendants(context)
                    .into_iter()
                    .filter(|&n| selector.matches(&doc, n))
                    .collect()
            }
        };
        Ok(self.handles(found))
    }

    fn text(&self, element: ElementHandle) -> PagecheckResult<String> {
        let id = self.node_id(element)?;
        Ok(self.document().rendered_text(id))
    }

    fn attribute(&self, element: ElementHandle, name: &str) -> PagecheckResult<Option<String>> {
        let id = self.node_id(element)?;
        Ok(self.document().node(id).attr(name).map(str::to_string))
    }

    fn property(&self, element: ElementHandle, name: &str) -> PagecheckResult<Option<String>> {
        let id = self.node_id(element)?;
        let doc = self.document();
        let node = doc.node(id);
        let value = match name {
            "value" if node.tag == "select" => Some(self.select_value(id)),
            "value" if node.tag == "option" => Some(self.option_value(id)),
            "value" if node.tag == "progress" => {
                Some(node.attr("value").unwrap_or("0").to_string())
            }
            "value" => Some(node.value.clone()),
            "checked" | "selected" => Some(node.checked.to_string()),
            "textContent" => Some(doc.text_content(id)),
            "tagName" => Some(node.tag.to_ascii_uppercase()),
            other => node.attr(other).map(str::to_string),
        };
        Ok(value)
    }

    fn is_displayed(&self, element: ElementHandle) -> PagecheckResult<bool> {
        let id = self.node_id(element)?;
        Ok(self.document().is_displayed(id))
    }

    fn is_selected(&self, element: ElementHandle) -> PagecheckResult<bool> {
        let id = self.node_id(element)?;
        let node = self.doc.node(id);
        Ok((node.is_checkable() || node.tag == "option") && node.checked)
    }

    fn click(&mut self, element: ElementHandle) -> PagecheckResult<()> {
        let id = self.node_id(element)?;
        if !self.document().is_displayed(id) {
            return Err(PagecheckError::interaction(format!(
                "element {element} is not displayed"
            )));
        }
        self.call_history.push(format!("click:{element}"));
        let node = self.doc.node(id).clone();

        match node.attr("id") {
            Some("download-button") => {
                // ignored while a download is still running
                let running = self.download_progress().is_some_and(|p| p < 100);
                if !running {
                    self.download = Some(Download {
                        started: Instant::now(),
                        dismissed: false,
                    });
                }
                return Ok(());
            }
            Some("close-dialog") => {
                if let Some(download) = self.download.as_mut() {
                    download.dismissed = true;
                }
                return Ok(());
            }
            Some("change-title-button") => {
                self.doc.title = CHANGED_TITLE.to_string();
                return Ok(());
            }
            _ => {}
        }

        match node.tag.as_str() {
            "a" => match node.attr("href") {
                Some(href) => self.follow(href),
                None => Ok(()),
            },
            "input" if node.is_checkable() => {
                self.toggle(id);
                Ok(())
            }
            "option" => {
                if let Some(select) = self
                    .doc
                    .ancestors(id)
                    .into_iter()
                    .find(|&a| self.doc.node(a).tag == "select")
                {
                    self.choose_option(select, id);
                }
                Ok(())
            }
            "button" | "input" => {
                let kind = node.attr("type").unwrap_or("submit").to_ascii_lowercase();
                match (kind.as_str(), self.doc.enclosing_form(id)) {
                    ("submit", Some(form)) => self.submit(form),
                    ("reset", Some(form)) => {
                        self.reset(form);
                        Ok(())
                    }
                    _ => Ok(()),
                }
            }
            _ => Ok(()),
        }
    }

    fn send_keys(&mut self, element: ElementHandle, text: &str) -> PagecheckResult<()> {
        let id = self.node_id(element)?;
        self.text_control(id, element)?;
        self.call_history.push(format!("send_keys:{element}"));
        if let Some(node) = self.doc.get_mut(id) {
            node.value.push_str(text);
        }
        Ok(())
    }

    fn clear(&mut self, element: ElementHandle) -> PagecheckResult<()> {
        let id = self.node_id(element)?;
        self.text_control(id, element)?;
        if let Some(node) = self.doc.get_mut(id) {
            node.value.clear();
        }
        Ok(())
    }

    fn select_by_text(&mut self, element: ElementHandle, text: &str) -> PagecheckResult<()> {
        let id = self.node_id(element)?;
        if self.doc.node(id).tag != "select" {
            return Err(PagecheckError::interaction(format!(
                "element {element} is not a <select>"
            )));
        }
        let option = self
            .doc
            .descendants(id)
            .into_iter()
            .find(|&n| self.doc.node(n).tag == "option" && self.doc.text_content(n) == text)
            .ok_or_else(|| {
                PagecheckError::interaction(format!("no option with text {text:?} in {element}"))
            })?;
        self.call_history.push(format!("select:{text}"));
        self.choose_option(id, option);
        Ok(())
    }

    fn screenshot(&self) -> PagecheckResult<Screenshot> {
        self.ensure_active()?;
        let (width, height) = self.viewport;
        Ok(Screenshot::new(self.render_png()?, width, height))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    const HOME: &str = "file:///site/web/home.html";

    fn started() -> SimulatedDriver {
        let mut driver = SimulatedDriver::new().with_download_step(Duration::from_millis(1));
        driver.start().unwrap();
        driver.navigate(HOME).unwrap();
        driver
    }

    fn one(driver: &mut SimulatedDriver, by: By) -> ElementHandle {
        let found = driver.find_elements(&by, None).unwrap();
        assert!(!found.is_empty(), "nothing matched {by}");
        found[0]
    }

    mod lifecycle_tests {
        use super::*;

        #[test]
        fn test_calls_before_start_are_unavailable() {
            let mut driver = SimulatedDriver::new();
            assert!(!driver.is_active());
            assert!(matches!(
                driver.navigate(HOME),
                Err(PagecheckError::SessionUnavailable)
            ));
            assert!(matches!(driver.title(), Err(PagecheckError::SessionUnavailable)));
        }

        #[test]
        fn test_calls_after_quit_are_unavailable() {
            let mut driver = started();
            driver.quit().unwrap();
            assert!(matches!(
                driver.find_elements(&By::tag("h1"), None),
                Err(PagecheckError::SessionUnavailable)
            ));
            assert!(driver.was_called("quit"));
        }

        #[test]
        fn test_unknown_page_is_navigation_error() {
            let mut driver = started();
            let err = driver.navigate("file:///site/web/missing.html").unwrap_err();
            assert!(matches!(err, PagecheckError::Navigation { .. }));
        }

        #[test]
        fn test_navigation_bumps_generation_and_stales_handles() {
            let mut driver = started();
            let heading = one(&mut driver, By::tag("h1"));
            let before = driver.generation();
            driver.navigate(HOME).unwrap();
            assert_eq!(driver.generation(), before + 1);
            assert!(matches!(
                driver.text(heading),
                Err(PagecheckError::StaleElement { .. })
            ));
        }
    }

    mod lookup_tests {
        use super::*;

        #[test]
        fn test_strategies_resolve_in_document_order() {
            let mut driver = started();
            assert_eq!(driver.title().unwrap(), "Automation Project");
            assert_eq!(driver.find_elements(&By::tag("h1"), None).unwrap().len(), 1);
            assert_eq!(
                driver.find_elements(&By::class("table-container"), None).unwrap().len(),
                2
            );
            let titles: Vec<String> = driver
                .find_elements(&By::tag("h2"), None)
                .unwrap()
                .into_iter()
                .map(|h| driver.text(h).unwrap())
                .collect();
            assert_eq!(titles, ["Cities of the World", "Student Details"]);
        }

        #[test]
        fn test_scoped_xpath_reads_student_column() {
            let mut driver = started();
            let students = driver.find_elements(&By::class("table-container"), None).unwrap()[1];
            let cells = driver
                .find_elements(&By::xpath(".//tbody/tr/td[2]"), Some(students))
                .unwrap();
            let names: Vec<String> = cells.into_iter().map(|c| driver.text(c).unwrap()).collect();
            assert_eq!(names, ["John", "Jane", "Alice", "Michael", "Emily"]);
        }

        #[test]
        fn test_link_text_and_name() {
            let mut driver = started();
            let link = one(&mut driver, By::link_text("Go to Next Page"));
            assert_eq!(driver.attribute(link, "href").unwrap().as_deref(), Some("next.html"));
            assert_eq!(driver.find_elements(&By::name("gender"), None).unwrap().len(), 3);
        }

        #[test]
        fn test_bad_selector_is_reported() {
            let mut driver = started();
            let err = driver.find_elements(&By::css("div["), None).unwrap_err();
            assert!(matches!(err, PagecheckError::InvalidSelector { .. }));
        }
    }

    mod behaviour_tests {
        use super::*;

        #[test]
        fn test_link_click_navigates_relative() {
            let mut driver = started();
            let link = one(&mut driver, By::id("next-page-link"));
            driver.click(link).unwrap();
            assert_eq!(driver.current_url().unwrap(), "file:///site/web/next.html");
            assert_eq!(driver.page(), Some(SitePage::Next));

            let change = one(&mut driver, By::id("change-title-button"));
            driver.click(change).unwrap();
            assert_eq!(driver.title().unwrap(), CHANGED_TITLE);
        }

        #[test]
        fn test_download_runs_to_completion_and_dismisses() {
            let mut driver = started();
            let button = one(&mut driver, By::id("download-button"));
            let progress = one(&mut driver, By::id("download-progress"));
            let dialog = one(&mut driver, By::id("download-dialog"));
            assert_eq!(driver.property(progress, "value").unwrap().as_deref(), Some("0"));
            assert!(!driver.is_displayed(dialog).unwrap());

            driver.click(button).unwrap();
            std::thread::sleep(Duration::from_millis(30));
            assert_eq!(driver.attribute(progress, "value").unwrap().as_deref(), Some("100"));
            assert!(driver.is_displayed(dialog).unwrap());

            let close = one(&mut driver, By::id("close-dialog"));
            driver.click(close).unwrap();
            assert!(!driver.is_displayed(dialog).unwrap());
        }

        #[test]
        fn test_second_click_does_not_restart_download() {
            let mut driver = SimulatedDriver::new().with_download_step(Duration::from_millis(50));
            driver.start().unwrap();
            driver.navigate(HOME).unwrap();
            let button = one(&mut driver, By::id("download-button"));
            let progress = one(&mut driver, By::id("download-progress"));

            driver.click(button).unwrap();
            std::thread::sleep(Duration::from_millis(60));
            let value = |d: &SimulatedDriver| -> u32 {
                d.attribute(progress, "value").unwrap().unwrap().parse().unwrap()
            };
            let before = value(&driver);
            assert!(before > 0 && before < 100, "download not running: {before}");

            driver.click(button).unwrap();
            let after = value(&driver);
            assert!(after >= before, "progress went back from {before} to {after}");
            let clicks = driver.history().iter().filter(|c| c.starts_with("click:")).count();
            assert_eq!(clicks, 2);
        }

        #[test]
        fn test_download_restarts_once_finished() {
            let mut driver = started();
            let button = one(&mut driver, By::id("download-button"));
            let progress = one(&mut driver, By::id("download-progress"));
            driver.click(button).unwrap();
            std::thread::sleep(Duration::from_millis(30));
            assert_eq!(driver.attribute(progress, "value").unwrap().as_deref(), Some("100"));

            driver.download_step = Duration::from_secs(60);
            driver.click(button).unwrap();
            assert_eq!(driver.attribute(progress, "value").unwrap().as_deref(), Some("0"));
        }

        #[test]
        fn test_hidden_element_cannot_be_clicked() {
            let mut driver = started();
            let close = one(&mut driver, By::id("close-dialog"));
            assert!(matches!(
                driver.click(close),
                Err(PagecheckError::Interaction { .. })
            ));
        }

        #[test]
        fn test_form_submit_encodes_query() {
            let mut driver = started();
            let first = one(&mut driver, By::id("first-name"));
            driver.send_keys(first, "Ido").unwrap();
            let city = one(&mut driver, By::id("city"));
            driver.select_by_text(city, "Tel Aviv").unwrap();
            let female = one(&mut driver, By::id("gender-female"));
            driver.click(female).unwrap();
            let math = one(&mut driver, By::id("subject-math"));
            driver.click(math).unwrap();
            let submit = one(&mut driver, By::id("submit-button"));
            driver.click(submit).unwrap();

            let url = Url::parse(&driver.current_url().unwrap()).unwrap();
            assert!(url.path().ends_with("/home.html"));
            let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
            assert!(pairs.contains(&("firstName".to_string(), "Ido".to_string())));
            assert!(pairs.contains(&("city".to_string(), "Tel Aviv".to_string())));
            assert!(pairs.contains(&("gender".to_string(), "female".to_string())));
            assert!(pairs.contains(&("subject".to_string(), "math".to_string())));
            assert_eq!(pairs.iter().filter(|(k, _)| k == "subject").count(), 1);
        }

        #[test]
        fn test_radio_group_is_exclusive_and_reset_clears() {
            let mut driver = started();
            let male = one(&mut driver, By::id("gender-male"));
            let other = one(&mut driver, By::id("gender-other"));
            driver.click(male).unwrap();
            driver.click(other).unwrap();
            assert!(!driver.is_selected(male).unwrap());
            assert!(driver.is_selected(other).unwrap());

            let email = one(&mut driver, By::id("email"));
            driver.send_keys(email, "a@b.c").unwrap();
            let reset = one(&mut driver, By::id("reset-button"));
            driver.click(reset).unwrap();
            assert!(!driver.is_selected(other).unwrap());
            assert_eq!(driver.property(email, "value").unwrap().as_deref(), Some(""));
        }

        #[test]
        fn test_send_keys_rejects_non_text_controls() {
            let mut driver = started();
            let heading = one(&mut driver, By::tag("h1"));
            assert!(matches!(
                driver.send_keys(heading, "x"),
                Err(PagecheckError::Interaction { .. })
            ));
        }

        #[test]
        fn test_screenshot_is_png_of_viewport() {
            let driver = started();
            let shot = driver.screenshot().unwrap();
            assert!(shot.is_valid());
            assert_eq!((shot.width, shot.height), (1280, 800));
            assert_eq!(&shot.data[..8], b"\x89PNG\r\n\x1a\n");
        }
    }
}
