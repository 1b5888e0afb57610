use anyhow::Context;
use axum::{ServiceExt, extract::Request};
use server_http::{AppState, build_app};
use shared::config::{self, Config, EnvSource};
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    // Env files may set RUST_LOG, so they load before the subscriber
    let env_files = config::load_env_files();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    match run(env_files).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Server failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(env_files: shared::Result<EnvSource>) -> anyhow::Result<()> {
    info!("Starting Capsule HTTP Server...");

    match env_files? {
        EnvSource::System => warn!("{}", EnvSource::System),
        loaded => info!("{}", loaded),
    }

    let config = Config::from_env()?;

    let state = AppState::from_config(&config)
        .await
        .context("failed to initialize character store")?;

    let app = build_app(state, &config);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!("HTTP Server listening on http://{}", addr);
    info!(
        "Try: curl -X POST -H 'content-type: application/json' -d '{{\"name\":\"goku\"}}' http://localhost:{}/api/characters",
        config.http_port
    );

    // Graceful shutdown handler
    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received terminate signal");
        },
    }

    info!("Shutting down gracefully...");
}
