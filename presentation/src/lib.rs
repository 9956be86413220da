//! Presentation layer for chatrelay
//!
//! This crate contains CLI definitions, output settings and the
//! console/JSON formatters.

pub mod cli;
pub mod config;
pub mod output;

// Re-export commonly used types
pub use cli::commands::{
    CallerArgs, Cli, Command, GuardrailsArgs, ModelsArgs, OutputFormat, ResolveArgs, ResolveView,
};
pub use config::OutputConfig;
pub use output::ConfigSourceLine;
pub use output::console::ConsoleFormatter;
pub use output::formatter::OutputFormatter;
pub use output::json::JsonFormatter;
