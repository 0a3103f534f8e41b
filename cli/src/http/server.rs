//! HTTP server lifecycle

use std::net::SocketAddr;

use axum::middleware;
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{info, warn};
use tripcrew_core::api::{AppContext, CliError};
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
    pub request_timeout_secs: u64,
}

/// CLI flags win over the `http_server` config section.
pub fn resolve_server_config(args: &ServeArgs, ctx: &AppContext) -> ServerConfig {
    let cfg = &ctx.cfg().http_server;
    ServerConfig {
        host: args.host.clone().unwrap_or_else(|| cfg.host.clone()),
        port: args.port.unwrap_or(cfg.port),
        request_timeout_secs: cfg.request_timeout_secs,
    }
}

pub async fn handle_serve(args: ServeArgs, ctx: &AppContext) -> Result<(), CliError> {
    let session_id = Uuid::new_v4().to_string();
    let config = resolve_server_config(&args, ctx);

    // Fail at startup, not on the first request, when the crew is misconfigured.
    let services = ctx.build_services().await?;
    let (shutdown_tx, _) = broadcast::channel(1);
    let state = AppState::new(session_id, ctx.clone(), services, shutdown_tx);
    state.build_pipeline()?;

    start_server(config, state)
        .await
        .map_err(|e: Box<dyn std::error::Error + Send + Sync>| CliError::Command(e.to_string()))
}

pub async fn start_server(
    config: ServerConfig,
    state: AppState,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = create_router(state.clone())
        .layer(middleware::from_fn(request_logger))
        .layer(create_middleware_stack(config.request_timeout_secs));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(
        session_id = %state.session_id,
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
            warn!("Failed to install SIGTERM handler: {e}");
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
    use tripcrew_core::api::AppConfig;

    #[test]
    fn test_flags_override_config() {
        let mut cfg = AppConfig::default();
        cfg.http_server.port = 9000;
        let ctx = AppContext::new(cfg, None);

        let from_cfg = resolve_server_config(&ServeArgs { host: None, port: None }, &ctx);
        assert_eq!(from_cfg.port, 9000);
        assert_eq!(from_cfg.host, "127.0.0.1");

        let from_flags = resolve_server_config(
            &ServeArgs {
                host: Some("0.0.0.0".into()),
                port: Some(7000),
            },
            &ctx,
        );
        assert_eq!((from_flags.host.as_str(), from_flags.port), ("0.0.0.0", 7000));
    }
}
