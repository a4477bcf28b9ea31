//! Command-line interface: argument parsing, command handlers and summaries.

use std::process::ExitCode;

use anyhow::Result;

mod args;
pub mod commands;
mod report;
mod run;

pub use args::{Arguments, Command};
pub use commands::ExitStatus;

pub fn run_cli(args: Arguments) -> Result<ExitCode> {
    let Some(args) = args.with_command_or_help() else {
        return Ok(ExitStatus::Success.into());
    };

    let result = run::run(args)?;
    report::print(&result);

    Ok(result.exit_status().into())
}
