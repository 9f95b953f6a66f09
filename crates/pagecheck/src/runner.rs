//! Sequential scenario runner and run report.

use crate::result::PagecheckResult;
use crate::scenario::{Scenario, ScenarioContext};
use crate::screenshot::ScreenshotRecorder;
use crate::session::Session;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// How a scenario ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Every step and assertion succeeded
    Passed,
    /// A step or assertion failed
    Failed,
    /// Skipped after a fatal error or a fail-fast stop
    NotRun,
}

/// Result of running a single scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioResult {
    /// Scenario name
    pub name: String,
    /// Outcome
    pub outcome: Outcome,
    /// Error message if failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Wall-clock duration in milliseconds
    pub duration_ms: u64,
    /// Screenshots written while it ran
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub screenshots: Vec<PathBuf>,
}

impl ScenarioResult {
    /// Create a passing result
    #[must_use]
    pub fn pass(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            outcome: Outcome::Passed,
            error: None,
            duration_ms: 0,
            screenshots: Vec::new(),
        }
    }

    /// Create a failing result
    #[must_use]
    pub fn fail(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Failed,
            error: Some(error.into()),
            ..Self::pass(name)
        }
    }

    /// Create a skipped result
    #[must_use]
    pub fn not_run(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::NotRun,
            error: Some(reason.into()),
            ..Self::pass(name)
        }
    }

    /// Set duration
    #[must_use]
    pub const fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    /// Attach screenshots
    #[must_use]
    pub fn with_screenshots(mut self, screenshots: Vec<PathBuf>) -> Self {
        self.screenshots = screenshots;
        self
    }

    /// Whether the scenario passed
    #[must_use]
    pub fn passed(&self) -> bool {
        self.outcome == Outcome::Passed
    }
}

/// Results of one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Base URL pages were loaded from
    pub base_url: String,
    /// Per-scenario results, in run order
    pub results: Vec<ScenarioResult>,
    /// Total duration in milliseconds
    pub duration_ms: u64,
}

impl RunReport {
    fn count(&self, outcome: Outcome) -> usize {
        self.results.iter().filter(|r| r.outcome == outcome).count()
    }

    /// Check if every scenario passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.results.iter().all(ScenarioResult::passed)
    }

    /// Count passed scenarios
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.count(Outcome::Passed)
    }

    /// Count failed scenarios
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.count(Outcome::Failed)
    }

    /// Count skipped scenarios
    #[must_use]
    pub fn not_run_count(&self) -> usize {
        self.count(Outcome::NotRun)
    }

    /// Get total scenario count
    #[must_use]
    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// Get failed scenarios
    #[must_use]
    pub fn failures(&self) -> Vec<&ScenarioResult> {
        self.results
            .iter()
            .filter(|r| r.outcome == Outcome::Failed)
            .collect()
    }

    /// Look up a result by scenario name
    #[must_use]
    pub fn result(&self, name: &str) -> Option<&ScenarioResult> {
        self.results.iter().find(|r| r.name == name)
    }

    /// Serialize as pretty JSON
    pub fn to_json(&self) -> PagecheckResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write as pretty JSON, creating parent directories
    pub fn write_json(&self, path: &Path) -> PagecheckResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// Runs scenarios one after another over a single session
#[derive(Debug, Default, Clone)]
pub struct ScenarioRunner {
    filter: Option<String>,
    fail_fast: bool,
}

impl ScenarioRunner {
    /// Create a new runner
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Only run scenarios whose name contains `filter`
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        let filter = filter.into();
        self.filter = (!filter.is_empty()).then_some(filter);
        self
    }

    /// Stop after the first failure
    #[must_use]
    pub const fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Scenarios this runner would execute, in order
    #[must_use]
    pub fn select<'s>(&self, scenarios: &'s [Scenario]) -> Vec<&'s Scenario> {
        scenarios
            .iter()
            .filter(|s| self.filter.as_deref().map_or(true, |f| s.name.contains(f)))
            .collect()
    }

    /// Run the selected scenarios
    pub fn run(
        &self,
        session: &mut Session,
        recorder: &mut ScreenshotRecorder,
        scenarios: &[Scenario],
    ) -> RunReport {
        self.run_with(session, recorder, scenarios, |_| {})
    }

    /// Run the selected scenarios, reporting each result as it completes.
    ///
    /// Starts the session if needed. A `SessionUnavailable` failure (or any
    /// failure under fail-fast) marks the remaining scenarios as not run.
    pub fn run_with<F>(
        &self,
        session: &mut Session,
        recorder: &mut ScreenshotRecorder,
        scenarios: &[Scenario],
        mut on_result: F,
    ) -> RunReport
    where
        F: FnMut(&ScenarioResult),
    {
        let started = Instant::now();
        let selected = self.select(scenarios);
        let mut results = Vec::with_capacity(selected.len());
        let mut abort: Option<String> = None;

        if !session.is_active() {
            if let Err(err) = session.start() {
                tracing::error!(error = %err, "browser session failed to start");
                abort = Some(format!("session failed to start: {err}"));
            }
        }

        for scenario in selected {
            let result = match &abort {
                Some(reason) => ScenarioResult::not_run(scenario.name, reason.clone()),
                None => {
                    let (result, fatal) = Self::run_one(scenario, session, recorder);
                    if fatal {
                        abort = Some(format!("aborted after {}: session lost", scenario.name));
                    } else if self.fail_fast && !result.passed() {
                        abort = Some(format!("fail-fast after {}", scenario.name));
                    }
                    result
                }
            };
            on_result(&result);
            results.push(result);
        }

        let report = RunReport {
            base_url: session.base_url().to_string(),
            results,
            duration_ms: started.elapsed().as_millis() as u64,
        };
        tracing::info!(
            passed = report.passed_count(),
            failed = report.failed_count(),
            not_run = report.not_run_count(),
            duration_ms = report.duration_ms,
            "run finished"
        );
        report
    }

    fn run_one(
        scenario: &Scenario,
        session: &mut Session,
        recorder: &mut ScreenshotRecorder,
    ) -> (ScenarioResult, bool) {
        tracing::info!(scenario = scenario.name, "scenario started");
        recorder.begin(scenario.name);
        let started = Instant::now();
        let outcome = scenario.run(&mut ScenarioContext::new(session, recorder));
        let duration_ms = started.elapsed().as_millis() as u64;

        let (result, fatal) = match outcome {
            Ok(()) => (ScenarioResult::pass(scenario.name), false),
            Err(err) => {
                let fatal = err.is_fatal();
                if !fatal {
                    if let Err(shot_err) = recorder.capture(session, "failure") {
                        tracing::warn!(error = %shot_err, "failure screenshot not taken");
                    }
                }
                (ScenarioResult::fail(scenario.name, err.to_string()), fatal)
            }
        };
        let result = result
            .with_duration_ms(duration_ms)
            .with_screenshots(recorder.take_saved());
        match &result.error {
            None => tracing::info!(scenario = scenario.name, duration_ms, "scenario passed"),
            Some(error) => {
                tracing::info!(scenario = scenario.name, duration_ms, %error, "scenario failed");
            }
        }
        (result, fatal)
    }
}

/// Start the session, run, and quit regardless of outcome
pub fn run_catalogue(
    runner: &ScenarioRunner,
    session: &mut Session,
    recorder: &mut ScreenshotRecorder,
    scenarios: &[Scenario],
    on_result: impl FnMut(&ScenarioResult),
) -> PagecheckResult<RunReport> {
    let report = runner.run_with(session, recorder, scenarios, on_result);
    if session.is_active() {
        session.quit()?;
    }
    Ok(report)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::result::PagecheckError;
    use crate::scenario::home_page_scenarios;
    use crate::simulated::SimulatedDriver;
    use crate::wait::WaitOptions;
    use std::time::Duration;
    use url::Url;

    fn session() -> Session {
        Session::new(
            Box::new(SimulatedDriver::new().with_download_step(Duration::from_millis(1))),
            Url::parse("file:///site/web/").unwrap(),
        )
        .with_wait_options(WaitOptions::new().with_timeout(300).with_poll_interval(1))
    }

    fn failing(_: &mut ScenarioContext<'_>) -> PagecheckResult<()> {
        Err(PagecheckError::mismatch("answer", &42, &41))
    }

    fn losing_session(ctx: &mut ScenarioContext<'_>) -> PagecheckResult<()> {
        ctx.session.quit()?;
        ctx.session.open("home.html")
    }

    fn passing(ctx: &mut ScenarioContext<'_>) -> PagecheckResult<()> {
        ctx.session.open("home.html")
    }

    mod report_tests {
        use super::*;

        #[test]
        fn test_counts_and_json() {
            let report = RunReport {
                base_url: "file:///w/".to_string(),
                results: vec![
                    ScenarioResult::pass("a").with_duration_ms(3),
                    ScenarioResult::fail("b", "boom"),
                    ScenarioResult::not_run("c", "fail-fast after b"),
                ],
                duration_ms: 9,
            };
            assert!(!report.all_passed());
            assert_eq!(report.passed_count(), 1);
            assert_eq!(report.failed_count(), 1);
            assert_eq!(report.not_run_count(), 1);
            assert_eq!(report.failures()[0].name, "b");

            let json = report.to_json().unwrap();
            assert!(json.contains("\"outcome\": \"not_run\""));
            let back: RunReport = serde_json::from_str(&json).unwrap();
            assert_eq!(back, report);
        }

        #[test]
        fn test_write_json_creates_directories() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("reports").join("run.json");
            let report = RunReport {
                base_url: "file:///w/".to_string(),
                results: vec![ScenarioResult::pass("a")],
                duration_ms: 1,
            };
            report.write_json(&path).unwrap();
            assert!(std::fs::read_to_string(&path).unwrap().contains("\"passed\""));
        }
    }

    mod runner_tests {
        use super::*;

        #[test]
        fn test_filter_selects_by_substring() {
            let scenarios = home_page_scenarios();
            let runner = ScenarioRunner::new().with_filter("table");
            let names: Vec<&str> = runner.select(&scenarios).iter().map(|s| s.name).collect();
            assert_eq!(names, ["only_two_tables", "first_table_title", "second_table_title"]);
            assert_eq!(ScenarioRunner::new().with_filter("").select(&scenarios).len(), 16);
        }

        #[test]
        fn test_failure_is_isolated() {
            let scenarios = [
                Scenario::new("first", "", failing),
                Scenario::new("second", "", passing),
            ];
            let mut s = session();
            let report =
                ScenarioRunner::new().run(&mut s, &mut ScreenshotRecorder::disabled(), &scenarios);
            assert_eq!(report.result("first").unwrap().outcome, Outcome::Failed);
            assert!(report.result("first").unwrap().error.as_deref().unwrap().contains("answer"));
            assert_eq!(report.result("second").unwrap().outcome, Outcome::Passed);
        }

        #[test]
        fn test_fail_fast_skips_rest() {
            let scenarios = [
                Scenario::new("first", "", failing),
                Scenario::new("second", "", passing),
            ];
            let mut s = session();
            let report = ScenarioRunner::new()
                .with_fail_fast(true)
                .run(&mut s, &mut ScreenshotRecorder::disabled(), &scenarios);
            assert_eq!(report.result("second").unwrap().outcome, Outcome::NotRun);
        }

        #[test]
        fn test_lost_session_aborts_run() {
            let scenarios = [
                Scenario::new("first", "", losing_session),
                Scenario::new("second", "", passing),
                Scenario::new("third", "", passing),
            ];
            let mut s = session();
            let report =
                ScenarioRunner::new().run(&mut s, &mut ScreenshotRecorder::disabled(), &scenarios);
            assert_eq!(report.result("first").unwrap().outcome, Outcome::Failed);
            assert_eq!(report.not_run_count(), 2);
        }

        #[test]
        fn test_failure_screenshot_recorded() {
            let dir = tempfile::tempdir().unwrap();
            let scenarios = [Scenario::new("broken", "", |ctx| {
                ctx.session.open("home.html")?;
                Err(PagecheckError::mismatch("x", &1, &2))
            })];
            let mut s = session();
            let mut recorder = ScreenshotRecorder::new(dir.path());
            let report = ScenarioRunner::new().run(&mut s, &mut recorder, &scenarios);
            let shots = &report.result("broken").unwrap().screenshots;
            assert_eq!(shots, &[dir.path().join("broken").join("01_failure.png")]);
        }

        #[test]
        fn test_run_catalogue_quits_session() {
            let scenarios = [Scenario::new("ok", "", passing)];
            let mut s = session();
            let mut seen = Vec::new();
            let report = run_catalogue(
                &ScenarioRunner::new(),
                &mut s,
                &mut ScreenshotRecorder::disabled(),
                &scenarios,
                |r| seen.push(r.name.clone()),
            )
            .unwrap();
            assert!(report.all_passed());
            assert_eq!(seen, ["ok"]);
            assert!(!s.is_active());
        }
    }
}
