//! In-process usage store plus client wiring for end-to-end tests and
//! benchmarks.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use qx_quota_ledger::{ClientContext, LedgerConfig, ManualClock, DEFAULT_DAILY_LIMIT};
use qx_usage_store::{create_router, ApiState, UsageDatabase, UsageStoreConfig};
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tracing::debug;

pub fn day(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("valid date")
}

/// A usage-store service bound to a fixed local port that can be stopped and
/// restarted to simulate outages.
pub struct UsageStoreHarness {
    pub temp_dir: TempDir,
    pub database: Arc<UsageDatabase>,
    addr: SocketAddr,
    server: Option<RunningServer>,
}

struct RunningServer {
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl UsageStoreHarness {
    pub async fn start() -> Result<Self> {
        let temp_dir = TempDir::new().context("creating usage store tempdir")?;
        let database = Arc::new(UsageDatabase::new(temp_dir.path().join("store"))?);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("binding usage store listener")?;
        let addr = listener.local_addr()?;

        let mut harness = Self {
            temp_dir,
            database,
            addr,
            server: None,
        };
        harness.serve(listener);
        Ok(harness)
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn is_running(&self) -> bool {
        self.server.is_some()
    }

    pub async fn stop(&mut self) {
        if let Some(server) = self.server.take() {
            let _ = server.shutdown.send(());
            let mut handle = server.handle;
            if timeout(Duration::from_secs(2), &mut handle).await.is_err() {
                handle.abort();
            }
            debug!(addr = %self.addr, "usage store stopped");
        }
    }

    pub async fn restart(&mut self) -> Result<()> {
        self.stop().await;

        let mut attempts = 0;
        let listener = loop {
            match TcpListener::bind(self.addr).await {
                Ok(listener) => break listener,
                Err(err) if attempts < 20 => {
                    attempts += 1;
                    debug!(error = %err, "usage store port busy; retrying");
                    sleep(Duration::from_millis(50)).await;
                }
                Err(err) => return Err(err).context("rebinding usage store listener"),
            }
        };
        self.serve(listener);
        Ok(())
    }

    /// Client wiring for one device profile rooted at `device_dir`.
    pub fn client(&self, device_dir: PathBuf, clock: Arc<ManualClock>) -> Result<ClientContext> {
        let config = LedgerConfig {
            data_dir: device_dir,
            daily_limit: DEFAULT_DAILY_LIMIT,
            usage_store_url: Some(self.base_url()),
            request_timeout_secs: 2,
            log_level: "warn".to_string(),
        };
        config.validate()?;
        ClientContext::with_clock(&config, clock)
    }

    fn serve(&mut self, listener: TcpListener) {
        let config = UsageStoreConfig {
            server_host: self.addr.ip().to_string(),
            server_port: self.addr.port(),
            data_dir: self.database.data_dir().to_path_buf(),
            ..UsageStoreConfig::default()
        };
        let state = Arc::new(ApiState::new(Arc::clone(&self.database), config));
        let router = create_router(state);

        let (shutdown, signal) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            let result = axum::serve(listener, router.into_make_service())
                .with_graceful_shutdown(async move {
                    let _ = signal.await;
                })
                .await;
            if let Err(err) = result {
                tracing::error!(error = %err, "usage store harness server failed");
            }
        });
        self.server = Some(RunningServer { shutdown, handle });
    }
}

impl Drop for UsageStoreHarness {
    fn drop(&mut self) {
        if let Some(server) = self.server.take() {
            server.handle.abort();
        }
    }
}

/// Client wiring with no usage store configured.
pub fn offline_client(device_dir: PathBuf, clock: Arc<ManualClock>) -> Result<ClientContext> {
    let config = LedgerConfig {
        data_dir: device_dir,
        ..LedgerConfig::default()
    };
    ClientContext::with_clock(&config, clock)
}
