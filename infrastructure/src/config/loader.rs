//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use chatrelay_domain::EnvSettings;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

const PROJECT_FILES: [&str; 2] = ["chatrelay.toml", ".chatrelay.toml"];
const ENV_PREFIX: &str = "CHATRELAY_";

/// Where a configuration layer comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSourceKind {
    Explicit,
    Project,
    Global,
    Environment,
    Default,
}

impl ConfigSourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigSourceKind::Explicit => "explicit",
            ConfigSourceKind::Project => "project",
            ConfigSourceKind::Global => "global",
            ConfigSourceKind::Environment => "environment",
            ConfigSourceKind::Default => "default",
        }
    }
}

/// One configuration layer, for `config-sources`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigSource {
    pub kind: ConfigSourceKind,
    pub location: String,
    pub found: bool,
}

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `CHATRELAY_*` environment variables (`__` separates nested keys)
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./chatrelay.toml` or `./.chatrelay.toml`
    /// 4. Global: `~/.config/chatrelay/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&Path>) -> Result<FileConfig, Box<figment::Error>> {
        Self::layered(
            Self::global_config_path().as_deref(),
            Self::project_config_path().as_deref(),
            config_path,
        )
        .extract()
        .map_err(Box::new)
    }

    /// File layers plus `CHATRELAY_*` overrides on top.
    fn layered(global: Option<&Path>, project: Option<&Path>, explicit: Option<&Path>) -> Figment {
        Self::figment(global, project, explicit).merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// Snapshot of the process environment, taken once at startup.
    pub fn env_snapshot() -> EnvSettings {
        EnvSettings::from_vars(std::env::vars())
    }

    /// File layers only, lowest priority first.
    fn figment(global: Option<&Path>, project: Option<&Path>, explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        for path in [global, project].into_iter().flatten() {
            if path.exists() {
                debug!("Merging config file {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
        }

        // A missing explicit file is silently skipped by figment as well
        if let Some(path) = explicit {
            debug!("Merging explicit config file {}", path.display());
            figment = figment.merge(Toml::file(path));
        }

        figment
    }

    /// Get the global config file path
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("chatrelay").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        Self::project_config_in(Path::new("."))
    }

    fn project_config_in(dir: &Path) -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
    }

    /// Configuration layers in priority order, highest first.
    pub fn config_sources(config_path: Option<&Path>) -> Vec<ConfigSource> {
        let mut sources = Vec::new();

        if let Some(path) = config_path {
            sources.push(ConfigSource {
                kind: ConfigSourceKind::Explicit,
                location: path.display().to_string(),
                found: path.exists(),
            });
        }

        sources.push(match Self::project_config_path() {
            Some(path) => ConfigSource {
                kind: ConfigSourceKind::Project,
                location: path.display().to_string(),
                found: true,
            },
            None => ConfigSource {
                kind: ConfigSourceKind::Project,
                location: format!("./{} or ./{}", PROJECT_FILES[0], PROJECT_FILES[1]),
                found: false,
            },
        });

        if let Some(path) = Self::global_config_path() {
            sources.push(ConfigSource {
                kind: ConfigSourceKind::Global,
                location: path.display().to_string(),
                found: path.exists(),
            });
        }

        sources.push(ConfigSource {
            kind: ConfigSourceKind::Environment,
            location: format!("{}* variables", ENV_PREFIX),
            found: std::env::vars().any(|(k, _)| k.starts_with(ENV_PREFIX)),
        });
        sources.push(ConfigSource {
            kind: ConfigSourceKind::Default,
            location: "built-in defaults".to_string(),
            found: true,
        });

        sources
    }
}
