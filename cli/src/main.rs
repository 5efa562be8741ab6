use clap::Parser;
use mci_cli::commands::{cli, exec, runnable};
use mci_cli::http;
use mci_core::api::{AppContext, CliError, InMemoryTaskStore, LoggingConfig, PluginError};
use mci_plugins::factory::BuiltinPluginsFactory;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

static LOG_GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
    std::sync::OnceLock::new();

#[tokio::main]
async fn main() {
    let exit = match real_main().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{e}");
            exit_code_for_error(&e)
        }
    };

    std::process::exit(exit);
}

async fn real_main() -> Result<i32, CliError> {
    let args = cli::Args::parse();
    let cfg = mci_core::api::load_default().map_err(|e| CliError::Config(e.to_string()))?;
    init_tracing(&cfg.logging).map_err(CliError::Config)?;

    match args.command {
        cli::Commands::Runnable(runnable_args) => {
            runnable::handle_runnable(runnable_args, &cfg).await
        }
        cli::Commands::Exec(exec_args) => {
            let store = InMemoryTaskStore::from_json_file(&exec_args.tasks)?;
            let ctx = AppContext::new(cfg, Arc::new(store), &BuiltinPluginsFactory::default())?;
            exec::handle_exec(exec_args, &ctx).await
        }
        cli::Commands::Serve(serve_args) => {
            http::handle_serve(serve_args, cfg).await?;
            Ok(0)
        }
    }
}

fn exit_code_for_error(e: &CliError) -> i32 {
    // 0: success
    // 11: config error / bad input
    // 20: store, IO, output encoding or server error
    // 30: a command or remote process failed
    // 50: internal/uncategorized
    match e {
        CliError::Config(_) => 11,
        CliError::Plugin(pe) => match pe {
            PluginError::Duplicate(_) => 50,
            _ => 11,
        },
        CliError::Store(_) => 20,
        CliError::Io(_) => 20,
        CliError::Server(_) => 20,
        CliError::Json(_) => 20,
        CliError::Command(_) => 30,
        CliError::Remote(_) => 30,
        CliError::Anyhow(_) => 50,
    }
}

fn init_tracing(logging: &LoggingConfig) -> Result<(), String> {
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
            Some(d) => std::path::PathBuf::from(d),
            None => std::env::temp_dir().join("mci"),
        };

        std::fs::create_dir_all(&dir).map_err(|e| format!("create log dir failed: {e}"))?;
        let file_name = format!("mci.{}.log", std::process::id());
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
