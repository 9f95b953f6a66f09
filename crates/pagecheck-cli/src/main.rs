//! Pagecheck CLI: run the Automation Project scenarios
//!
//! ## Usage
//!
//! ```bash
//! pagecheck run                          # Run every scenario (simulated driver)
//! pagecheck run --filter table           # Only scenarios whose name contains "table"
//! pagecheck run --driver chromium        # Real browser against web/
//! pagecheck run --report target/run.json # Also write the JSON report
//! pagecheck list                         # Show the catalogue
//! pagecheck config --config ci.yaml      # Print the effective configuration
//! ```

use clap::Parser;
use pagecheck_cli::{
    execute_run, init_logging, render_config, render_list, Cli, CliConfig, CliError, CliResult,
    Commands, Verbosity,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = build_config(&cli);
    init_logging(&config);

    match cli.command {
        Commands::Run(args) => {
            let report = execute_run(&config, &args)?;
            if report.all_passed() {
                Ok(())
            } else {
                Err(CliError::ScenarioFailures {
                    failed: report.failed_count() + report.not_run_count(),
                    total: report.total(),
                })
            }
        }
        Commands::List => {
            print!("{}", render_list());
            Ok(())
        }
        Commands::Config(args) => {
            print!("{}", render_config(&args)?);
            Ok(())
        }
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(cli.color.into())
        .with_log_json(cli.log_json)
}
