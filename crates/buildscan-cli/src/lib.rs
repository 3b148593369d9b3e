mod args;
mod commands;
mod handlers;
mod logging;
pub mod presentation;

pub use args::{Cli, Commands, ConfigCommand, LogLevel, OutputFormat};
pub use commands::run;
