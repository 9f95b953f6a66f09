//! Pagecheck CLI library
//!
//! Command-line front end for running the pagecheck scenario catalogue.

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod config;
mod error;
mod logging;
mod output;
mod runner;

pub use commands::{Cli, ColorArg, Commands, ConfigArgs, DriverArg, RunArgs};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use logging::{env_filter, init_logging};
pub use output::ProgressReporter;
pub use runner::{build_driver, execute_run, render_config, render_list, resolve_config};
