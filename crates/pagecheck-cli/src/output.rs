//! Progress bar and styled result lines

use console::{style, Style, Term};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use pagecheck::{Outcome, RunReport, ScenarioResult};
use std::time::Duration;

/// Progress reporter for a scenario run
#[derive(Debug)]
pub struct ProgressReporter {
    term: Term,
    progress_bar: Option<ProgressBar>,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl ProgressReporter {
    /// Create a new progress reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            progress_bar: None,
            use_color,
            quiet,
        }
    }

    /// Start a progress bar over `total` scenarios
    pub fn start_progress(&mut self, total: u64, message: &str) {
        if self.quiet {
            return;
        }

        let pb = ProgressBar::with_draw_target(Some(total), ProgressDrawTarget::stderr());
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        pb.set_message(message.to_string());
        self.progress_bar = Some(pb);
    }

    /// Increment progress
    pub fn increment(&self, delta: u64) {
        if let Some(ref pb) = self.progress_bar {
            pb.inc(delta);
        }
    }

    /// Update progress message
    pub fn set_message(&self, message: &str) {
        if let Some(ref pb) = self.progress_bar {
            pb.set_message(message.to_string());
        }
    }

    /// Finish and clear the progress bar
    pub fn finish(&mut self) {
        if let Some(pb) = self.progress_bar.take() {
            pb.finish_and_clear();
        }
    }

    fn line(&self, text: &str) {
        match &self.progress_bar {
            Some(pb) => pb.suspend(|| {
                let _ = self.term.write_line(text);
            }),
            None => {
                let _ = self.term.write_line(text);
            }
        }
    }

    fn label(&self, plain: &str, styled: console::StyledObject<&str>) -> String {
        if self.use_color {
            styled.bold().to_string()
        } else {
            plain.to_string()
        }
    }

    fn pass_line(&self, message: &str) -> Option<String> {
        (!self.quiet).then(|| format!("{} {message}", self.label("PASS", style("PASS").green())))
    }

    fn fail_line(&self, message: &str) -> String {
        format!("{} {message}", self.label("FAIL", style("FAIL").red()))
    }

    fn skip_line(&self, message: &str) -> Option<String> {
        (!self.quiet).then(|| format!("{} {message}", self.label("SKIP", style("SKIP").yellow())))
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if let Some(line) = self.pass_line(message) {
            self.line(&line);
        }
    }

    /// Print a failure message, even in quiet mode
    pub fn failure(&self, message: &str) {
        self.line(&self.fail_line(message));
    }

    /// Print a skipped message
    pub fn skipped(&self, message: &str) {
        if let Some(line) = self.skip_line(message) {
            self.line(&line);
        }
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if !self.quiet {
            let prefix = self.label("WARN", style("WARN").yellow());
            self.line(&format!("{prefix} {message}"));
        }
    }

    /// Line for one scenario's outcome, `None` when quiet mode hides it
    #[must_use]
    pub fn scenario_line(&self, result: &ScenarioResult) -> Option<String> {
        let timing = format!("{} ({}ms)", result.name, result.duration_ms);
        match result.outcome {
            Outcome::Passed => self.pass_line(&timing),
            Outcome::Failed => {
                let error = result.error.as_deref().unwrap_or("unknown error");
                Some(self.fail_line(&format!("{timing}: {error}")))
            }
            Outcome::NotRun => {
                let reason = result.error.as_deref().unwrap_or("not run");
                self.skip_line(&format!("{}: {reason}", result.name))
            }
        }
    }

    /// Print one scenario's outcome
    pub fn scenario(&self, result: &ScenarioResult) {
        if let Some(line) = self.scenario_line(result) {
            self.line(&line);
        }
    }

    /// Summary line for a run, `None` when quiet mode hides it
    #[must_use]
    pub fn summary_line(&self, report: &RunReport) -> Option<String> {
        let passed = report.passed_count();
        let failed = report.failed_count();
        let skipped = report.not_run_count();
        if self.quiet && failed == 0 && skipped == 0 {
            return None;
        }

        let duration_secs = Duration::from_millis(report.duration_ms).as_secs_f64();
        let total = report.total();

        if self.use_color {
            let passed_style = Style::new().green().bold();
            let failed_style = Style::new().red().bold();
            let skipped_style = Style::new().yellow();

            let status = if report.all_passed() {
                passed_style.apply_to("PASSED")
            } else {
                failed_style.apply_to("FAILED")
            };
            let failed = if failed > 0 {
                failed_style.apply_to(failed).to_string()
            } else {
                failed.to_string()
            };
            Some(format!(
                "{status} {total} scenarios in {duration_secs:.2}s \
                 ({} passed, {failed} failed, {} not run)",
                passed_style.apply_to(passed),
                skipped_style.apply_to(skipped)
            ))
        } else {
            let status = if report.all_passed() { "PASSED" } else { "FAILED" };
            Some(format!(
                "{status} {total} scenarios in {duration_secs:.2}s \
                 ({passed} passed, {failed} failed, {skipped} not run)"
            ))
        }
    }

    /// Print the run summary
    pub fn summary(&self, report: &RunReport) {
        if let Some(line) = self.summary_line(report) {
            self.line("");
            self.line(&line);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod progress_reporter_tests {
        use super::*;

        fn report() -> RunReport {
            RunReport {
                base_url: "file:///w/web/".to_string(),
                results: vec![
                    ScenarioResult::pass("title").with_duration_ms(12),
                    ScenarioResult::fail("h1_text", "Assertion failed").with_duration_ms(40),
                    ScenarioResult::not_run("clear_form", "fail-fast after h1_text"),
                ],
                duration_ms: 52,
            }
        }

        #[test]
        fn test_new_reporter() {
            let reporter = ProgressReporter::new(false, true);
            assert!(!reporter.use_color);
            assert!(reporter.quiet);
        }

        #[test]
        fn test_scenario_lines() {
            let reporter = ProgressReporter::new(false, false);
            let lines: Vec<String> = report()
                .results
                .iter()
                .filter_map(|r| reporter.scenario_line(r))
                .collect();
            assert_eq!(
                lines,
                [
                    "PASS title (12ms)",
                    "FAIL h1_text (40ms): Assertion failed",
                    "SKIP clear_form: fail-fast after h1_text",
                ]
            );
        }

        #[test]
        fn test_quiet_keeps_only_failures() {
            let reporter = ProgressReporter::new(false, true);
            let lines: Vec<String> = report()
                .results
                .iter()
                .filter_map(|r| reporter.scenario_line(r))
                .collect();
            assert_eq!(lines, ["FAIL h1_text (40ms): Assertion failed"]);
        }

        #[test]
        fn test_summary_plain() {
            let line = ProgressReporter::new(false, false).summary_line(&report()).unwrap();
            assert_eq!(line, "FAILED 3 scenarios in 0.05s (1 passed, 1 failed, 1 not run)");
        }

        #[test]
        fn test_summary_colored_has_same_text() {
            let line = ProgressReporter::new(true, false).summary_line(&report()).unwrap();
            let plain = console::strip_ansi_codes(&line);
            assert!(plain.starts_with("FAILED 3 scenarios"));
            assert!(plain.contains("(1 passed, 1 failed, 1 not run)"));
        }

        #[test]
        fn test_quiet_summary_hidden_when_all_pass() {
            let passing = RunReport {
                base_url: "file:///w/web/".to_string(),
                results: vec![ScenarioResult::pass("title")],
                duration_ms: 3,
            };
            let reporter = ProgressReporter::new(false, true);
            assert!(reporter.summary_line(&passing).is_none());
            let line = ProgressReporter::new(false, false).summary_line(&passing).unwrap();
            assert!(line.starts_with("PASSED 1 scenarios"));
        }

        #[test]
        fn test_progress_bar_lifecycle() {
            let mut reporter = ProgressReporter::new(false, false);
            reporter.start_progress(3, "running");
            reporter.set_message("title");
            reporter.increment(1);
            reporter.success("title (12ms)");
            reporter.finish();
            assert!(reporter.progress_bar.is_none());
        }

        #[test]
        fn test_quiet_mode_has_no_bar() {
            let mut reporter = ProgressReporter::new(false, true);
            reporter.start_progress(3, "running");
            assert!(reporter.progress_bar.is_none());
            reporter.failure("still printed");
        }
    }
}
