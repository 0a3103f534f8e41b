use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tripcrew_cli::commands::{cli, init, tool};
use tripcrew_cli::{app, http, utils};
use tripcrew_core::api::{self as core_api, AppContext, CliError};
use tripcrew_plugins::services::PluginServicesFactory;

static LOG_GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
    std::sync::OnceLock::new();

#[tokio::main]
async fn main() {
    let exit = match real_main().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{e}");
            e.error_code().exit_code()
        }
    };

    std::process::exit(exit);
}

async fn real_main() -> Result<i32, CliError> {
    let args = cli::Args::parse();

    let command = match args.command {
        // init must work even when the existing config is broken.
        cli::Commands::Init(init_args) => {
            init::handle_init(init_args)?;
            return Ok(0);
        }
        other => other,
    };

    let mut cfg = core_api::load_default().map_err(|e| CliError::Config(format!("{e:#}")))?;
    let dotenv = utils::load_env_file(&cfg.env_file)?;
    core_api::apply_env_overrides(&mut cfg, |key| utils::env_lookup(&dotenv, key))
        .map_err(|e| CliError::Config(format!("{e:#}")))?;
    init_tracing(&cfg.logging).map_err(CliError::Command)?;

    let ctx = AppContext::new(cfg, Some(Arc::new(PluginServicesFactory)));
    dispatch(command, &ctx).await
}

async fn dispatch(cmd: cli::Commands, ctx: &AppContext) -> Result<i32, CliError> {
    match cmd {
        cli::Commands::Plan(plan_args) => app::run_plan(plan_args, ctx).await,
        cli::Commands::Serve(serve_args) => {
            http::handle_serve(serve_args, ctx).await?;
            Ok(0)
        }
        cli::Commands::Tool(tool_args) => tool::handle_tool(tool_args, ctx).await,
        cli::Commands::Init(init_args) => {
            init::handle_init(init_args)?;
            Ok(0)
        }
    }
}

fn init_tracing(logging: &core_api::LoggingConfig) -> Result<(), String> {
    if !logging.enabled {
        return Ok(());
    }

    let filter = match std::env::var("RUST_LOG") {
        Ok(v) if !v.trim().is_empty() => EnvFilter::from_default_env(),
        _ => EnvFilter::try_new(logging.level.clone()).map_err(|e| e.to_string())?,
    };

    let mut maybe_writer = None;

    if logging.file {
        let dir = match logging
            .directory
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            Some(d) => std::path::PathBuf::from(shellexpand::tilde(d).into_owned()),
            None => std::env::temp_dir().join("tripcrew"),
        };

        std::fs::create_dir_all(&dir).map_err(|e| format!("create log dir failed: {e}"))?;
        let file_name = format!("tripcrew.{}.log", std::process::id());
        let appender = tracing_appender::rolling::never(dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        let _ = LOG_GUARD.set(guard);
        maybe_writer = Some(non_blocking);
    }

    if !logging.console && maybe_writer.is_none() {
        return Err("logging disabled for both console and file".to_string());
    }

    let console_layer = logging.console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(atty::is(atty::Stream::Stderr))
    });

    let file_layer = maybe_writer.map(|w| {
        tracing_subscriber::fmt::layer()
            .with_writer(w)
            .with_ansi(false)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(())
}
