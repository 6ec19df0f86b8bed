//! pairgraph CLI library: settings, report formatting and commands.

pub mod commands;
pub mod config;
pub mod error;
pub mod report;

pub use config::Settings;
pub use error::{CliError, CliResult};
