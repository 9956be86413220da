//! CLI entrypoint for chatrelay
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Result, anyhow, bail};
use chatrelay_application::{
    AppConfig, ClientOptionsUseCase, CredentialError, GuardrailsUseCase, LoadModelsRequest,
    LoadModelsUseCase, PrepareRunUseCase, RequestRouter, ResolveCredentialsUseCase, UserKeyStore,
};
use chatrelay_domain::{
    ChatRequest, ConfigIssue, Endpoint, RequestUser, Severity, anthropic_llm_config,
};
use chatrelay_infrastructure::{
    ConfigLoader, FileConfig, FileOutputFormat, HttpModelSource, InMemoryConfigStore,
    InMemoryUserKeyStore,
};
use chatrelay_presentation::{
    CallerArgs, Cli, Command, ConfigSourceLine, GuardrailsArgs, ModelsArgs, OutputConfig,
    OutputFormat, OutputFormatter, ResolveArgs, ResolveView,
};
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting chatrelay");

    let file_config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };
    let issues = file_config.validate();

    let output = OutputConfig::resolve(
        cli.output,
        file_config.output.format.map(|format| match format {
            FileOutputFormat::Pretty => OutputFormat::Pretty,
            FileOutputFormat::Json => OutputFormat::Json,
        }),
        file_config.output.color,
    );
    if !output.color {
        colored::control::set_override(false);
    }
    let formatter = output.formatter();

    if let Command::ConfigSources = cli.command {
        let sources: Vec<ConfigSourceLine> = ConfigLoader::config_sources(cli.config.as_deref())
            .into_iter()
            .map(|source| ConfigSourceLine {
                kind: source.kind.as_str().to_string(),
                location: source.location,
                found: source.found,
            })
            .collect();
        println!("{}", formatter.config_sources(&sources, &issues));
        return Ok(ExitCode::SUCCESS);
    }

    report_issues(&issues);
    if ConfigIssue::has_errors(&issues) {
        bail!("Invalid configuration; run `chatrelay config-sources` for details");
    }

    // === Dependency Injection ===
    let config = Arc::new(to_app_config(&file_config));
    let source = Arc::new(HttpModelSource::new(config.behavior.timeout)?);
    let store = Arc::new(InMemoryConfigStore::new());
    let user_keys: Arc<dyn UserKeyStore> = match &cli.user_keys {
        Some(path) => Arc::new(InMemoryUserKeyStore::from_json_file(path).await?),
        None => Arc::new(InMemoryUserKeyStore::new()),
    };
    let models = Arc::new(LoadModelsUseCase::new(config.clone(), store, source.clone()));

    match cli.command {
        Command::Models(args) => run_models(&models, &args, formatter.as_ref()).await,
        Command::Resolve(args) => {
            let options =
                ClientOptionsUseCase::new(ResolveCredentialsUseCase::new(config, user_keys));
            run_resolve(models, options, args, formatter.as_ref()).await
        }
        Command::Guardrails(args) => {
            let guardrails = GuardrailsUseCase::new(config, source);
            run_guardrails(&guardrails, &args, formatter.as_ref()).await
        }
        Command::ConfigSources => Ok(ExitCode::SUCCESS),
    }
}

fn to_app_config(file_config: &FileConfig) -> AppConfig {
    file_config.to_app_config(ConfigLoader::env_snapshot())
}

fn report_issues(issues: &[ConfigIssue]) {
    for issue in issues {
        match issue.severity {
            Severity::Error => error!("{}", issue.message),
            Severity::Warning => warn!("{}", issue.message),
        }
    }
}

fn request_user(caller: &CallerArgs) -> RequestUser {
    let mut user = RequestUser::new(&caller.user);
    if let Some(email) = &caller.email {
        user = user.with_email(email);
    }
    if let Some(name) = &caller.name {
        user = user.with_name(name);
    }
    user
}

async fn run_models(
    models: &LoadModelsUseCase,
    args: &ModelsArgs,
    formatter: &dyn OutputFormatter,
) -> Result<ExitCode> {
    let mut request = LoadModelsRequest::new(request_user(&args.caller));
    if let Some(auth) = &args.caller.authorization {
        request = request.with_authorization(auth);
    }

    let (catalog, report) = if args.refresh {
        models.refresh(&request).await?
    } else {
        models.execute_with_report(&request).await?
    };
    info!("Loaded {} models", catalog.model_count());

    let report = args.report.then_some(&report);
    println!("{}", formatter.catalog(&catalog, report));
    Ok(ExitCode::SUCCESS)
}

async fn run_resolve(
    models: Arc<LoadModelsUseCase>,
    options: ClientOptionsUseCase,
    args: ResolveArgs,
    formatter: &dyn OutputFormatter,
) -> Result<ExitCode> {
    let mut request = ChatRequest::new(
        Endpoint::from(args.endpoint.as_str()),
        request_user(&args.caller),
    );
    if let Some(model) = &args.model {
        request = request.with_model(model);
    }
    for (key, value) in args.params {
        request = request.with_parameter(key, value);
    }
    if let Some(auth) = &args.caller.authorization {
        request = request.with_authorization(auth);
    }
    if let Some(expires_at) = args.key_expires_at {
        request = request.with_key_expiry(expires_at);
    }

    if !args.no_route {
        request = RequestRouter::new(models).route(request).await;
    }
    let override_model = args.override_model.as_deref();

    let rendered: Result<String, CredentialError> = match args.view {
        ResolveView::Client => options
            .build(&request, override_model)
            .await
            .map(|o| formatter.client_options(&o.redacted())),
        ResolveView::Anthropic => options
            .build(&request, override_model)
            .await
            .map(|o| formatter.anthropic(&anthropic_llm_config(&o.redacted()))),
        ResolveView::Run => {
            let cancellation = CancellationToken::new();
            let on_interrupt = cancellation.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    on_interrupt.cancel();
                }
            });

            let prepare = PrepareRunUseCase::new(options).with_cancellation(cancellation);
            match prepare.execute(&request, override_model).await {
                Ok(run) if run.is_cancelled() => {
                    warn!("Interrupted");
                    return Ok(ExitCode::from(130));
                }
                Ok(run) => Ok(formatter.run_config(&run.llm)),
                Err(e) => Err(e),
            }
        }
    };

    match rendered {
        Ok(text) => {
            println!("{}", text);
            Ok(ExitCode::SUCCESS)
        }
        Err(e @ CredentialError::UserKeys(_)) => Err(e.into()),
        Err(e) => {
            eprintln!("{}", formatter.credential_error(&e));
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn run_guardrails(
    guardrails: &GuardrailsUseCase,
    args: &GuardrailsArgs,
    formatter: &dyn OutputFormatter,
) -> Result<ExitCode> {
    let auth = args.authorization.as_deref();
    if args.validate {
        let validation = guardrails.validate(auth).await?;
        println!("{}", formatter.guardrail_validation(&validation));
        return Ok(if validation.is_valid {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }

    let list = guardrails.list(auth).await?;
    println!("{}", formatter.guardrails(&list));
    Ok(ExitCode::SUCCESS)
}
