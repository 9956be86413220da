//! Presentation-level configuration

use crate::cli::commands::OutputFormat;
use crate::output::console::ConsoleFormatter;
use crate::output::formatter::OutputFormatter;
use crate::output::json::JsonFormatter;

/// Output configuration for the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Enable colored terminal output
    pub color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Pretty,
            color: true,
        }
    }
}

impl OutputConfig {
    /// The command-line flag wins over the configured format.
    pub fn resolve(flag: Option<OutputFormat>, configured: Option<OutputFormat>, color: bool) -> Self {
        Self {
            format: flag.or(configured).unwrap_or(OutputFormat::Pretty),
            color,
        }
    }

    pub fn formatter(&self) -> Box<dyn OutputFormatter> {
        match self.format {
            OutputFormat::Pretty => Box::new(ConsoleFormatter),
            OutputFormat::Json => Box::new(JsonFormatter),
        }
    }
}
