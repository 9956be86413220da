//! Configuration file loading for chatrelay
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `CHATRELAY_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./chatrelay.toml` or `./.chatrelay.toml`
//! 4. Global: `~/.config/chatrelay/config.toml`
//! 5. Default values
//!
//! Provider credentials (`OPENAI_API_KEY`, `LITELLM_URL`, ...) are not part
//! of the file config; they come from the environment snapshot.

mod file_config;
mod loader;

pub use file_config::{
    FileAllEndpointsConfig, FileAzureConfig, FileAzureGroup, FileAzureModel,
    FileBaseEndpointConfig, FileBehaviorConfig, FileConfig, FileCustomEndpointConfig,
    FileCustomModelsConfig, FileEndpointsConfig, FileGuardrailsConfig, FileOutputConfig,
    FileOutputFormat,
};
pub use loader::{ConfigLoader, ConfigSource, ConfigSourceKind};
