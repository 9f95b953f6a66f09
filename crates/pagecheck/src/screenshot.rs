//! Screenshot recorder.
//!
//! Writes `<root>/<scenario>/<NN>_<label>.png`, numbering captures per
//! scenario starting at `01`.

use crate::result::{PagecheckError, PagecheckResult};
use crate::session::Session;
use std::fs;
use std::path::{Path, PathBuf};

/// Numbered screenshot writer for one run
#[derive(Debug, Clone)]
pub struct ScreenshotRecorder {
    root: PathBuf,
    enabled: bool,
    scenario: String,
    counter: u32,
    saved: Vec<PathBuf>,
}

fn sanitize(label: &str) -> String {
    let cleaned: String = label
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "shot".to_string()
    } else {
        cleaned
    }
}

impl ScreenshotRecorder {
    /// Recorder writing under `root`
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            enabled: true,
            scenario: String::new(),
            counter: 0,
            saved: Vec::new(),
        }
    }

    /// Recorder that never writes
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(PathBuf::new()).with_enabled(false)
    }

    /// Enable or disable writing
    #[must_use]
    pub const fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Whether captures are written
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Root directory
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Start numbering for a new scenario
    pub fn begin(&mut self, scenario: &str) {
        self.scenario = sanitize(scenario);
        self.counter = 0;
        self.saved.clear();
    }

    /// Path the next capture with `label` would be written to
    #[must_use]
    pub fn next_path(&self, label: &str) -> PathBuf {
        self.root
            .join(&self.scenario)
            .join(format!("{:02}_{}.png", self.counter + 1, sanitize(label)))
    }

    /// Capture the viewport.
    ///
    /// A failed capture is logged and skipped; only a lost session is an error.
    pub fn capture(&mut self, session: &Session, label: &str) -> PagecheckResult<Option<PathBuf>> {
        if !self.enabled {
            return Ok(None);
        }
        let path = self.next_path(label);
        match self.write(session, &path) {
            Ok(()) => {
                self.counter += 1;
                tracing::debug!(path = %path.display(), "screenshot saved");
                self.saved.push(path.clone());
                Ok(Some(path))
            }
            Err(err) if err.is_fatal() => Err(err),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "screenshot skipped");
                Ok(None)
            }
        }
    }

    fn write(&self, session: &Session, path: &Path) -> PagecheckResult<()> {
        let shot = session.screenshot()?;
        if !shot.is_valid() {
            return Err(PagecheckError::Screenshot {
                message: "driver returned an empty image".to_string(),
            });
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, &shot.data)?;
        Ok(())
    }

    /// Paths written since the last [`ScreenshotRecorder::begin`]
    #[must_use]
    pub fn saved(&self) -> &[PathBuf] {
        &self.saved
    }

    /// Drain the paths written since the last [`ScreenshotRecorder::begin`]
    pub fn take_saved(&mut self) -> Vec<PathBuf> {
        std::mem::take(&mut self.saved)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::simulated::SimulatedDriver;
    use url::Url;

    fn session() -> Session {
        let mut session = Session::new(
            Box::new(SimulatedDriver::new().with_viewport(64, 48)),
            Url::parse("file:///site/web/").unwrap(),
        );
        session.start().unwrap();
        session.open("home.html").unwrap();
        session
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("open home page"), "open_home_page");
        assert_eq!(sanitize("../x"), "___x");
        assert_eq!(sanitize(""), "shot");
    }

    #[test]
    fn test_numbered_per_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let session = session();
        let mut recorder = ScreenshotRecorder::new(dir.path());
        assert!(recorder.is_enabled());

        recorder.begin("title");
        let first = recorder.capture(&session, "open_home_page").unwrap().unwrap();
        let second = recorder.capture(&session, "home_page_title").unwrap().unwrap();
        assert_eq!(first, dir.path().join("title").join("01_open_home_page.png"));
        assert_eq!(second, dir.path().join("title").join("02_home_page_title.png"));
        assert!(first.exists() && second.exists());
        assert_eq!(recorder.saved().len(), 2);

        recorder.begin("h1_text");
        assert!(recorder.saved().is_empty());
        assert_eq!(
            recorder.next_path("failure"),
            dir.path().join("h1_text").join("01_failure.png")
        );
    }

    #[test]
    fn test_disabled_writes_nothing() {
        let session = session();
        let mut recorder = ScreenshotRecorder::disabled();
        assert!(!recorder.is_enabled());
        recorder.begin("title");
        assert!(recorder.capture(&session, "x").unwrap().is_none());
        assert!(recorder.take_saved().is_empty());
    }

    #[test]
    fn test_lost_session_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session();
        session.quit().unwrap();
        let mut recorder = ScreenshotRecorder::new(dir.path());
        recorder.begin("title");
        assert!(matches!(
            recorder.capture(&session, "x"),
            Err(PagecheckError::SessionUnavailable)
        ));
    }
}
