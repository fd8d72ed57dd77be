//! CLI command handlers, one file per command.

mod convert;
mod harvest;
mod run;

pub use convert::run_convert;
pub use harvest::run_harvest;
pub use run::{run_pipeline_command, RunArgs};
