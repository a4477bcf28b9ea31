pub mod backfill;
pub mod build;
mod command_result;
pub mod helper;
pub mod init;
pub mod prune;

pub use command_result::*;
