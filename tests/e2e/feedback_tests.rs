use std::sync::Arc;

use anyhow::Result;
use qx_quota_ledger::{FeedbackStatus, ManualClock};
use qx_usage::test_support::{day, offline_client, UsageStoreHarness};
use tempfile::TempDir;

#[tokio::test(flavor = "multi_thread")]
async fn feedback_is_stored_with_device_id() -> Result<()> {
    let store = UsageStoreHarness::start().await?;
    let device_dir = TempDir::new()?;
    let clock = Arc::new(ManualClock::new(day("2026-10-19")));
    let client = store.client(device_dir.path().to_path_buf(), clock)?;

    let status = client.feedback.submit("  please add chemistry diagrams ").await;
    assert_eq!(status, FeedbackStatus::Submitted);

    let stored = store.database.recent_feedback(5)?;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].message, "please add chemistry diagrams");
    assert_eq!(
        stored[0].device_id.as_deref(),
        Some(client.identity.get_or_create().as_str())
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn feedback_is_acknowledged_without_store() -> Result<()> {
    let device_dir = TempDir::new()?;
    let clock = Arc::new(ManualClock::new(day("2026-10-19")));
    let client = offline_client(device_dir.path().to_path_buf(), clock)?;

    assert_eq!(
        client.feedback.submit("works offline?").await,
        FeedbackStatus::SavedLocally
    );
    assert_eq!(
        client.feedback.submit("   ").await,
        FeedbackStatus::EmptyMessage
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn oversized_feedback_is_rejected_by_store() -> Result<()> {
    let store = UsageStoreHarness::start().await?;
    let device_dir = TempDir::new()?;
    let clock = Arc::new(ManualClock::new(day("2026-10-19")));
    let client = store.client(device_dir.path().to_path_buf(), clock)?;

    let status = client.feedback.submit(&"a".repeat(5_000)).await;
    assert_eq!(status, FeedbackStatus::Rejected);
    assert!(store.database.recent_feedback(5)?.is_empty());
    Ok(())
}
