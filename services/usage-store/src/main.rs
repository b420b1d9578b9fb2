use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::serve;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use qx_usage_store::{create_router, ApiState, UsageDatabase, UsageStoreConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let config = UsageStoreConfig::from_env().context("failed to load configuration")?;
    init_tracing(&config);

    info!(
        addr = %config.listen_addr(),
        data_dir = %config.data_dir.display(),
        "starting usage-store service"
    );

    let database = Arc::new(
        UsageDatabase::new(config.data_dir.clone()).context("failed to open usage database")?,
    );
    let addr: SocketAddr = config
        .listen_addr()
        .parse()
        .context("invalid server bind address")?;

    let state = Arc::new(ApiState::new(database, config));
    let router = create_router(state);

    let listener = TcpListener::bind(addr)
        .await
        .context("failed to bind TCP listener")?;
    let local_addr = listener
        .local_addr()
        .context("failed to read bound address")?;
    info!(%local_addr, "usage-store listening");

    serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server encountered an unrecoverable error")?;

    info!("usage-store service shutting down");
    Ok(())
}

fn init_tracing(config: &UsageStoreConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install CTRL+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm =
            signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
