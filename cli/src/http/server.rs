use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::middleware;
use mci_core::api::{get_mci_data_dir, AppConfig, AppContext, CliError, InMemoryTaskStore, Patch};
use mci_plugins::factory::BuiltinPluginsFactory;
use mci_plugins::patch::InMemoryPatchStore;
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{info, warn};
use uuid::Uuid;

use super::{
    middleware::{create_middleware_stack, request_logger},
    routes::create_router,
    AppState,
};
use crate::commands::cli::ServeArgs;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

fn get_servers_dir() -> Result<PathBuf, CliError> {
    let servers_dir = get_mci_data_dir()?.join("servers");
    fs::create_dir_all(&servers_dir)?;
    Ok(servers_dir)
}

fn write_state_file(session_id: &str, config: &ServerConfig) -> Result<PathBuf, CliError> {
    let state_file = get_servers_dir()?.join("mci.state");

    let state = serde_json::json!({
        "session_id": session_id,
        "port": config.port,
        "pid": std::process::id(),
        "url": format!("http://{}:{}", config.host, config.port),
        "started_at": chrono::Local::now().to_rfc3339()
    });
    let body = serde_json::to_string_pretty(&state)
        .map_err(|e| CliError::Server(format!("failed to encode state file: {e}")))?;
    fs::write(&state_file, body)?;

    info!("State file written to: {}", state_file.display());
    Ok(state_file)
}

fn load_patch_store(path: Option<&Path>) -> Result<InMemoryPatchStore, CliError> {
    let store = InMemoryPatchStore::new();
    if let Some(path) = path {
        let raw = fs::read_to_string(path)?;
        let patches: Vec<Patch> = serde_json::from_str(&raw)
            .map_err(|e| CliError::Config(format!("invalid patch file {}: {e}", path.display())))?;
        for patch in patches {
            store.insert_patch(patch);
        }
    }
    Ok(store)
}

/// `mci serve`: CLI flags win over the `http_server` config section.
pub async fn handle_serve(args: ServeArgs, cfg: AppConfig) -> Result<(), CliError> {
    let session_id = args
        .session_id
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let config = ServerConfig {
        host: args.host.unwrap_or_else(|| cfg.http_server.host.clone()),
        port: args.port.unwrap_or(cfg.http_server.port),
    };

    let tasks = match args.tasks.as_deref() {
        Some(path) => InMemoryTaskStore::from_json_file(path)?,
        None => InMemoryTaskStore::default(),
    };
    let patches = load_patch_store(args.patches.as_deref())?;
    let factory = BuiltinPluginsFactory::new(Arc::new(patches));
    let ctx = AppContext::new(cfg, Arc::new(tasks), &factory)?;

    let (shutdown_tx, _) = broadcast::channel(1);
    let state = AppState::new(session_id.clone(), ctx, shutdown_tx);

    let state_file = write_state_file(&session_id, &config)?;
    let result = start_server(session_id, config, state).await;

    if let Err(e) = fs::remove_file(&state_file) {
        warn!("Failed to remove state file: {}", e);
    }
    result
}

pub async fn start_server(
    session_id: String,
    config: ServerConfig,
    state: AppState,
) -> Result<(), CliError> {
    let router = create_router(state.clone());
    let app = router
        .layer(middleware::from_fn_with_state(state.clone(), request_logger))
        .layer(create_middleware_stack());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| CliError::Server(format!("invalid listen address: {e}")))?;

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(
        session_id = %session_id,
        "HTTP server listening on http://{}",
        addr
    );

    let mut shutdown_rx = state.shutdown_tx.subscribe();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::select! {
                _ = signal::ctrl_c() => {
                    info!("Received Ctrl+C signal");
                }
                _ = shutdown_rx.recv() => {
                    info!("Received shutdown signal from API");
                }
                _ = wait_for_sigterm() => {
                    info!("Received SIGTERM signal");
                }
            }
            info!("Starting graceful shutdown...");
        })
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

#[cfg(unix)]
async fn wait_for_sigterm() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            warn!("Failed to install SIGTERM handler: {}", e);
            std::future::pending::<()>().await
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_sigterm() {
    std::future::pending::<()>().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_file_loads_into_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patches.json");
        fs::write(&path, r#"[{"id": "p-1", "githash": "abc"}]"#).unwrap();
        assert!(load_patch_store(Some(&path)).is_ok());

        fs::write(&path, r#"{"id": "p-1"}"#).unwrap();
        assert!(matches!(
            load_patch_store(Some(&path)),
            Err(CliError::Config(_))
        ));
    }

    #[tokio::test]
    async fn api_shutdown_stops_the_server() {
        let ctx = AppContext::new(
            AppConfig::default(),
            Arc::new(InMemoryTaskStore::default()),
            &BuiltinPluginsFactory::default(),
        )
        .unwrap();
        let (shutdown_tx, _) = broadcast::channel(1);
        let state = AppState::new("s".into(), ctx, shutdown_tx.clone());
        let config = ServerConfig {
            host: "127.0.0.1".into(),
            port: 0,
        };

        let server = tokio::spawn(start_server("s".into(), config, state));
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        shutdown_tx.send(()).unwrap();

        let result = tokio::time::timeout(std::time::Duration::from_secs(5), server)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());
    }
}
