use std::sync::Arc;

use anyhow::Result;
use qx_quota_ledger::{LedgerPhase, ManualClock, RemoteSync, Reservation, SyncMode};
use qx_usage::test_support::{day, UsageStoreHarness};
use tempfile::TempDir;

const TODAY: &str = "2026-10-19";

#[tokio::test(flavor = "multi_thread")]
async fn commits_reach_the_usage_store() -> Result<()> {
    let store = UsageStoreHarness::start().await?;
    let device_dir = TempDir::new()?;
    let clock = Arc::new(ManualClock::new(day(TODAY)));
    let client = store.client(device_dir.path().to_path_buf(), clock)?;

    let snapshot = client.ledger.initialize().await;
    assert_eq!(snapshot.used, 0);
    assert_eq!(client.ledger.phase(), LedgerPhase::Ready(SyncMode::Remote));

    let device = client.identity.get_or_create();
    let seeded = store.database.fetch_usage(device.as_str(), day(TODAY))?;
    assert_eq!(seeded.map(|row| row.count), Some(0));

    for _ in 0..3 {
        let outcome = client.ledger.commit().await;
        assert_eq!(outcome.remote, RemoteSync::Synced);
    }

    let row = store
        .database
        .fetch_usage(device.as_str(), day(TODAY))?
        .expect("row stored");
    assert_eq!(row.count, 3);
    assert_eq!(client.ledger.status_message(), "");
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn new_session_adopts_remote_count() -> Result<()> {
    let store = UsageStoreHarness::start().await?;
    let device_dir = TempDir::new()?;
    let clock = Arc::new(ManualClock::new(day(TODAY)));

    let first = store.client(device_dir.path().to_path_buf(), Arc::clone(&clock))?;
    first.ledger.initialize().await;
    first.ledger.commit().await;
    first.ledger.commit().await;
    let device = first.identity.get_or_create();
    drop(first);

    // Another tab on the same profile pushed the row further.
    store.database.upsert_usage(device.as_str(), day(TODAY), 7)?;

    let second = store.client(device_dir.path().to_path_buf(), clock)?;
    assert_eq!(second.identity.get_or_create(), device);
    assert_eq!(second.ledger.initialize().await.used, 7);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_sessions_resolve_last_writer_wins() -> Result<()> {
    let store = UsageStoreHarness::start().await?;
    let device_dir = TempDir::new()?;
    let clock = Arc::new(ManualClock::new(day(TODAY)));

    let tab_a = store.client(device_dir.path().to_path_buf(), Arc::clone(&clock))?;
    let tab_b = store.client(device_dir.path().to_path_buf(), Arc::clone(&clock))?;
    let device = tab_a.identity.get_or_create();

    tab_a.ledger.initialize().await;
    tab_b.ledger.initialize().await;

    for _ in 0..4 {
        tab_a.ledger.commit().await;
    }
    tab_b.ledger.commit().await;

    let row = store
        .database
        .fetch_usage(device.as_str(), day(TODAY))?
        .expect("row stored");
    assert_eq!(row.count, 1);
    assert_eq!(store.database.list_device_usage(device.as_str())?.len(), 1);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn limit_is_enforced_and_reset_next_day() -> Result<()> {
    let store = UsageStoreHarness::start().await?;
    let device_dir = TempDir::new()?;
    let clock = Arc::new(ManualClock::new(day(TODAY)));
    let client = store.client(device_dir.path().to_path_buf(), Arc::clone(&clock))?;
    let device = client.identity.get_or_create();

    client.ledger.initialize().await;
    for _ in 0..10 {
        client.ledger.commit().await;
    }
    assert_eq!(client.ledger.check_and_reserve(), Reservation::LimitReached);

    clock.advance_days(1);
    let next_day = store.client(device_dir.path().to_path_buf(), clock)?;
    assert_eq!(next_day.ledger.initialize().await.used, 0);
    assert_eq!(next_day.ledger.check_and_reserve(), Reservation::Allowed);

    let history = store.database.list_device_usage(device.as_str())?;
    let counts: Vec<_> = history.iter().map(|row| (row.day, row.count)).collect();
    assert_eq!(counts, vec![(day("2026-10-20"), 0), (day(TODAY), 10)]);
    Ok(())
}
