use std::sync::Arc;

use anyhow::Result;
use qx_quota_ledger::{LedgerPhase, ManualClock, RemoteSync, Reservation, SyncMode};
use qx_usage::test_support::{day, offline_client, UsageStoreHarness};
use tempfile::TempDir;

const TODAY: &str = "2026-10-19";

#[tokio::test(flavor = "multi_thread")]
async fn unconfigured_store_runs_local_only() -> Result<()> {
    let device_dir = TempDir::new()?;
    let clock = Arc::new(ManualClock::new(day(TODAY)));
    let client = offline_client(device_dir.path().to_path_buf(), Arc::clone(&clock))?;

    client.ledger.initialize().await;
    assert_eq!(client.ledger.phase(), LedgerPhase::Ready(SyncMode::LocalOnly));
    for _ in 0..4 {
        assert_eq!(client.ledger.commit().await.remote, RemoteSync::Skipped);
    }

    let reopened = offline_client(device_dir.path().to_path_buf(), clock)?;
    assert_eq!(reopened.ledger.initialize().await.used, 4);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn store_down_at_startup_degrades_gracefully() -> Result<()> {
    let mut store = UsageStoreHarness::start().await?;
    store.stop().await;

    let device_dir = TempDir::new()?;
    let clock = Arc::new(ManualClock::new(day(TODAY)));
    let client = store.client(device_dir.path().to_path_buf(), Arc::clone(&clock))?;

    client.ledger.initialize().await;
    assert_eq!(client.ledger.phase(), LedgerPhase::Ready(SyncMode::LocalOnly));
    assert_eq!(client.ledger.status_message(), "Usage sync error.");

    for _ in 0..10 {
        assert!(client.ledger.check_and_reserve().is_allowed());
        client.ledger.commit().await;
    }
    assert_eq!(client.ledger.check_and_reserve(), Reservation::LimitReached);

    // Once the store is back, a fresh session seeds today's row and keeps
    // the locally recorded count.
    store.restart().await?;
    let later = store.client(device_dir.path().to_path_buf(), clock)?;
    assert_eq!(later.ledger.initialize().await.used, 10);
    assert_eq!(later.ledger.phase(), LedgerPhase::Ready(SyncMode::Remote));

    let device = later.identity.get_or_create();
    let row = store.database.fetch_usage(device.as_str(), day(TODAY))?;
    assert_eq!(row.map(|row| row.count), Some(0));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn store_outage_mid_session_keeps_counting() -> Result<()> {
    let mut store = UsageStoreHarness::start().await?;
    let device_dir = TempDir::new()?;
    let clock = Arc::new(ManualClock::new(day(TODAY)));
    let client = store.client(device_dir.path().to_path_buf(), clock)?;
    let device = client.identity.get_or_create();

    client.ledger.initialize().await;
    client.ledger.commit().await;

    store.stop().await;
    let outcome = client.ledger.commit().await;
    assert_eq!(outcome.snapshot.used, 2);
    assert!(matches!(outcome.remote, RemoteSync::Failed(_)));
    assert_eq!(client.ledger.status_message(), "Usage update error.");

    store.restart().await?;
    let outcome = client.ledger.commit().await;
    assert_eq!(outcome.remote, RemoteSync::Synced);
    assert_eq!(client.ledger.status_message(), "");

    let row = store.database.fetch_usage(device.as_str(), day(TODAY))?;
    assert_eq!(row.map(|row| row.count), Some(3));
    Ok(())
}
