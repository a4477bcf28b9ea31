use anyhow::Result;

use super::{
    args::{Arguments, Command},
    commands::{CommandResult, backfill::backfill, build::build, init::init, prune::prune},
};

/// Dispatch to the handler of the parsed command.
pub fn run(Arguments { command, .. }: Arguments) -> Result<CommandResult> {
    match command {
        Some(Command::Build(cmd)) => build(cmd),
        Some(Command::Prune(cmd)) => prune(cmd),
        Some(Command::Backfill(cmd)) => backfill(cmd),
        Some(Command::Init) => init(),
        None => {
            anyhow::bail!("No command provided. Use --help to see available commands.")
        }
    }
}
