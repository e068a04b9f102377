//! CLI module for awtrix-weather commands

pub mod generate;
pub mod run;

pub use generate::GenerateCommand;
pub use run::{RunCommand, RunError};
