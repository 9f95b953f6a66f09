//! CLI command definitions using clap

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Pagecheck: page-object scenarios for the Automation Project demo site
#[derive(Parser, Debug)]
#[command(name = "pagecheck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the scenario catalogue
    Run(RunArgs),

    /// List the scenario catalogue
    List,

    /// Print the effective configuration as YAML
    Config(ConfigArgs),
}

/// Options shared by commands that resolve a harness configuration
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// YAML configuration file
    #[arg(short, long, env = "PAGECHECK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Base URL the site pages are resolved against
    #[arg(long)]
    pub base_url: Option<String>,

    /// Element wait timeout in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Poll interval in milliseconds
    #[arg(long)]
    pub poll_ms: Option<u64>,

    /// Screenshot directory
    #[arg(long)]
    pub screenshots: Option<PathBuf>,

    /// Do not write screenshots
    #[arg(long)]
    pub no_screenshots: bool,

    /// Run chromium without a window
    #[arg(long, overrides_with = "headed")]
    pub headless: bool,

    /// Run chromium with a window
    #[arg(long, overrides_with = "headless")]
    pub headed: bool,
}

impl ConfigArgs {
    /// Headless override, if either flag was given
    #[must_use]
    pub const fn headless_override(&self) -> Option<bool> {
        if self.headed {
            Some(false)
        } else if self.headless {
            Some(true)
        } else {
            None
        }
    }
}

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Only run scenarios whose name contains this substring
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Stop after the first failure
    #[arg(long)]
    pub fail_fast: bool,

    /// Browser driver
    #[arg(long, default_value = "simulated")]
    pub driver: DriverArg,

    /// Write the JSON run report here
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Configuration and overrides
    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Browser driver selection
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DriverArg {
    /// In-process model of the demo site
    #[default]
    Simulated,
    /// Real chromium over CDP (needs the `browser` feature)
    Chromium,
}

/// Color argument for CLI
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    mod cli_tests {
        use super::*;

        #[test]
        fn test_parse_run_defaults() {
            let cli = Cli::parse_from(["pagecheck", "run"]);
            let Commands::Run(args) = cli.command else {
                panic!("expected run");
            };
            assert_eq!(args.driver, DriverArg::Simulated);
            assert!(!args.fail_fast);
            assert!(args.filter.is_none());
            assert_eq!(args.config.headless_override(), None);
        }

        #[test]
        fn test_parse_run_overrides() {
            let cli = Cli::parse_from([
                "pagecheck",
                "run",
                "--filter",
                "table",
                "--fail-fast",
                "--timeout-ms",
                "250",
                "--poll-ms",
                "10",
                "--base-url",
                "http://localhost:8000/",
                "--headed",
            ]);
            let Commands::Run(args) = cli.command else {
                panic!("expected run");
            };
            assert_eq!(args.filter.as_deref(), Some("table"));
            assert!(args.fail_fast);
            assert_eq!(args.config.timeout_ms, Some(250));
            assert_eq!(args.config.poll_ms, Some(10));
            assert_eq!(args.config.base_url.as_deref(), Some("http://localhost:8000/"));
            assert_eq!(args.config.headless_override(), Some(false));
        }

        #[test]
        fn test_last_headless_flag_wins() {
            let cli = Cli::parse_from(["pagecheck", "run", "--headed", "--headless"]);
            let Commands::Run(args) = cli.command else {
                panic!("expected run");
            };
            assert_eq!(args.config.headless_override(), Some(true));
        }

        #[test]
        fn test_global_flags() {
            let cli =
                Cli::parse_from(["pagecheck", "list", "-vv", "--color", "never", "--log-json"]);
            assert_eq!(cli.verbose, 2);
            assert!(cli.log_json);
            assert!(matches!(cli.color, ColorArg::Never));
            assert!(matches!(cli.command, Commands::List));
        }

        #[test]
        fn test_parse_chromium_driver() {
            let cli = Cli::parse_from(["pagecheck", "run", "--driver", "chromium"]);
            let Commands::Run(args) = cli.command else {
                panic!("expected run");
            };
            assert_eq!(args.driver, DriverArg::Chromium);
        }
    }
}
