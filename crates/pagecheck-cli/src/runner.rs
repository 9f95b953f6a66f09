//! Command handlers: resolve configuration, build the driver, run, report.

use crate::commands::{ConfigArgs, DriverArg, RunArgs};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::ProgressReporter;
use pagecheck::{
    home_page_scenarios, run_catalogue, Driver, HarnessConfig, Outcome, RunReport, ScenarioResult,
    ScenarioRunner, ScreenshotRecorder, Session, SimulatedDriver,
};

/// Load the config file (if any) and apply command-line overrides
pub fn resolve_config(args: &ConfigArgs) -> CliResult<HarnessConfig> {
    let mut config = match &args.config {
        Some(path) => HarnessConfig::load(path)?,
        None => HarnessConfig::default(),
    };
    if let Some(url) = &args.base_url {
        config = config.with_base_url(url.clone());
    }
    if let Some(ms) = args.timeout_ms {
        config = config.with_timeout_ms(ms);
    }
    if let Some(ms) = args.poll_ms {
        config = config.with_poll_interval_ms(ms);
    }
    if let Some(dir) = &args.screenshots {
        config = config.with_screenshot_dir(dir.clone());
    }
    if args.no_screenshots {
        config = config.with_capture_screenshots(false);
    }
    if let Some(headless) = args.headless_override() {
        config = config.with_headless(headless);
    }
    config
        .validate()
        .map_err(|e| CliError::config(e.to_string()))?;
    Ok(config)
}

/// Build the selected driver
pub fn build_driver(driver: DriverArg, config: &HarnessConfig) -> CliResult<Box<dyn Driver>> {
    match driver {
        DriverArg::Simulated => Ok(Box::new(
            SimulatedDriver::new().with_viewport(config.viewport_width, config.viewport_height),
        )),
        #[cfg(feature = "browser")]
        DriverArg::Chromium => Ok(Box::new(pagecheck::ChromiumDriver::from_config(config))),
        #[cfg(not(feature = "browser"))]
        DriverArg::Chromium => Err(CliError::invalid_argument(
            "chromium driver not enabled. Rebuild with --features browser",
        )),
    }
}

/// Whether a failed scenario ended without its failure screenshot
#[must_use]
pub fn missing_failure_screenshot(result: &ScenarioResult) -> bool {
    result.outcome == Outcome::Failed
        && !result
            .screenshots
            .iter()
            .filter_map(|path| path.file_stem())
            .any(|stem| stem.to_string_lossy().ends_with("_failure"))
}

/// `pagecheck run`
pub fn execute_run(cli: &CliConfig, args: &RunArgs) -> CliResult<RunReport> {
    let config = resolve_config(&args.config)?;
    let driver = build_driver(args.driver, &config)?;
    let mut session = Session::from_config(driver, &config)?;
    let mut screenshots = if config.capture_screenshots {
        ScreenshotRecorder::new(&config.screenshot_dir)
    } else {
        ScreenshotRecorder::disabled()
    };

    let runner = ScenarioRunner::new()
        .with_filter(args.filter.clone().unwrap_or_default())
        .with_fail_fast(args.fail_fast);
    let catalogue = home_page_scenarios();
    let selected = runner.select(&catalogue).len();
    if selected == 0 {
        return Err(CliError::invalid_argument(format!(
            "no scenario matches filter {:?}",
            args.filter.as_deref().unwrap_or_default()
        )));
    }

    tracing::info!(
        driver = ?args.driver,
        base_url = %config.base_url,
        scenarios = selected,
        "starting run"
    );
    let capturing = screenshots.is_enabled();
    let mut reporter = ProgressReporter::new(cli.color.should_color(), cli.verbosity.is_quiet());
    reporter.start_progress(selected as u64, "running scenarios");
    let report = run_catalogue(&runner, &mut session, &mut screenshots, &catalogue, |result| {
        reporter.scenario(result);
        if capturing && missing_failure_screenshot(result) {
            reporter.warning(&format!("no failure screenshot for {}", result.name));
        }
        reporter.increment(1);
    });
    reporter.finish();
    let report = report?;
    reporter.summary(&report);

    if let Some(path) = &args.report {
        report.write_json(path)?;
        tracing::info!(path = %path.display(), "report written");
    }
    Ok(report)
}

/// `pagecheck list`
#[must_use]
pub fn render_list() -> String {
    let scenarios = home_page_scenarios();
    let width = scenarios.iter().map(|s| s.name.len()).max().unwrap_or(0);
    scenarios
        .iter()
        .map(|s| format!("{:width$}  {}\n", s.name, s.description))
        .collect()
}

/// `pagecheck config`
pub fn render_config(args: &ConfigArgs) -> CliResult<String> {
    Ok(resolve_config(args)?.to_yaml()?)
}
