//! CLI command definitions

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::Value;
use std::path::PathBuf;

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Colored, human-readable output
    Pretty,
    /// JSON output
    Json,
}

/// CLI arguments for chatrelay
#[derive(Parser, Debug)]
#[command(name = "chatrelay")]
#[command(author, version, about = "Resolve provider credentials, client options and model catalogs")]
#[command(long_about = r#"
chatrelay decides, per chat request, which API key, base URL, headers and
model parameters a provider client should use, and aggregates the models
available across configured endpoints.

Configuration files are loaded from (in priority order):
1. CHATRELAY_* environment variables
2. --config <path>     Explicit config file
3. ./chatrelay.toml    Project-level config
4. ~/.config/chatrelay/config.toml   Global config

Provider credentials (OPENAI_API_KEY, LITELLM_URL, ...) are read from the
environment.

Example:
  chatrelay models
  chatrelay resolve azureOpenAI -m gpt-4-turbo --param temperature=0.2
  chatrelay resolve anthropic -m claude-3-7-sonnet-latest --view anthropic
  chatrelay guardrails --validate --authorization "Bearer $TOKEN"
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output format (defaults to the config file's, then pretty)
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// JSON file of stored user keys
    #[arg(long, value_name = "PATH", global = true)]
    pub user_keys: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the model catalog
    Models(ModelsArgs),
    /// Resolve the client configuration for one request
    Resolve(ResolveArgs),
    /// List the gateway's guardrails
    Guardrails(GuardrailsArgs),
    /// Show configuration file locations and validation issues
    ConfigSources,
}

/// The authenticated caller
#[derive(Args, Debug, Clone)]
pub struct CallerArgs {
    /// User id
    #[arg(long, default_value = "cli")]
    pub user: String,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub name: Option<String>,

    /// Authorization header of the caller (forwarded to gateways and OpenID endpoints)
    #[arg(long, value_name = "HEADER")]
    pub authorization: Option<String>,
}

#[derive(Args, Debug)]
pub struct ModelsArgs {
    #[command(flatten)]
    pub caller: CallerArgs,

    /// Ignore the cached catalog
    #[arg(long)]
    pub refresh: bool,

    /// Include the per-upstream fetch report
    #[arg(long)]
    pub report: bool,
}

/// What `resolve` prints
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ResolveView {
    /// Merged client options
    Client,
    /// Anthropic client configuration
    Anthropic,
    /// Agent run configuration
    Run,
}

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Endpoint wire name (openAI, azureOpenAI, anthropic, google, bedrock, or a custom name)
    pub endpoint: String,

    #[command(flatten)]
    pub caller: CallerArgs,

    /// Requested model
    #[arg(short, long)]
    pub model: Option<String>,

    /// Model parameter as KEY=VALUE; VALUE is parsed as JSON when possible
    #[arg(long = "param", value_name = "KEY=VALUE", value_parser = parse_param)]
    pub params: Vec<(String, Value)>,

    /// Force a model regardless of the request
    #[arg(long, value_name = "MODEL")]
    pub override_model: Option<String>,

    /// Expiry of the stored user key (RFC 3339)
    #[arg(long, value_name = "TIMESTAMP")]
    pub key_expires_at: Option<DateTime<Utc>>,

    #[arg(long, value_enum, default_value = "client")]
    pub view: ResolveView,

    /// Skip provider rerouting
    #[arg(long)]
    pub no_route: bool,
}

#[derive(Args, Debug)]
pub struct GuardrailsArgs {
    /// Authorization header forwarded to the gateway
    #[arg(long, value_name = "HEADER")]
    pub authorization: Option<String>,

    /// Check the configured required guardrails
    #[arg(long)]
    pub validate: bool,
}

/// Parse `KEY=VALUE`, keeping VALUE as a string when it isn't JSON.
pub fn parse_param(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty parameter name in '{}'", raw));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}
