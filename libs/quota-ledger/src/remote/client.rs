use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};

use crate::identity::DeviceId;
use crate::usage::UsageRecord;

use super::{FeedbackEntry, FeedbackSink, RemoteCounterStore, RemoteError};

/// HTTP binding for the `daily_usage` and `feedback` tables served by
/// `qx-usage-store`.
pub struct UsageStoreClient {
    http_client: Client,
    base_url: Url,
}

impl UsageStoreClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build usage store client")?;
        let base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid usage store URL {base_url}"))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("Usage store URL {base_url} cannot carry a path");
        }

        Ok(Self {
            http_client,
            base_url,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn usage_endpoint(&self, device: &DeviceId, day: NaiveDate) -> Url {
        let day = day.format("%Y-%m-%d").to_string();
        self.endpoint(&["api", "daily_usage", device.as_str(), &day])
    }
}

#[async_trait]
impl RemoteCounterStore for UsageStoreClient {
    async fn fetch(
        &self,
        device: &DeviceId,
        day: NaiveDate,
    ) -> Result<Option<UsageRecord>, RemoteError> {
        let url = self.usage_endpoint(device, day);
        let response = self.http_client.get(url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let row: UsageRow = ensure_success(response).await?.json().await?;
        if row.day != day {
            return Err(RemoteError::InvalidPayload(format!(
                "requested day {day} but store returned {}",
                row.day
            )));
        }

        Ok(Some(UsageRecord::new(
            row.day,
            row.count.clamp(0, u32::MAX as i64) as u32,
        )))
    }

    async fn create_if_absent(
        &self,
        device: &DeviceId,
        day: NaiveDate,
    ) -> Result<(), RemoteError> {
        let url = self.endpoint(&["api", "daily_usage"]);
        let payload = CreateUsageRequest {
            device_id: device.as_str(),
            day,
        };

        let response = self.http_client.post(url).json(&payload).send().await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn upsert(&self, device: &DeviceId, day: NaiveDate, count: u32) -> Result<(), RemoteError> {
        let url = self.usage_endpoint(device, day);
        let payload = UpsertUsageRequest { count };

        let response = self.http_client.put(url).json(&payload).send().await?;
        ensure_success(response).await?;
        Ok(())
    }
}

#[async_trait]
impl FeedbackSink for UsageStoreClient {
    async fn submit(&self, entry: &FeedbackEntry) -> Result<(), RemoteError> {
        let url = self.endpoint(&["api", "feedback"]);
        let response = self.http_client.post(url).json(entry).send().await?;
        ensure_success(response).await?;
        Ok(())
    }
}

async fn ensure_success(response: Response) -> Result<Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "unable to read error body".to_string());
    Err(RemoteError::Rejected {
        status: status.as_u16(),
        body,
    })
}

#[derive(Debug, Deserialize)]
struct UsageRow {
    day: NaiveDate,
    count: i64,
}

#[derive(Debug, Serialize)]
struct CreateUsageRequest<'a> {
    device_id: &'a str,
    day: NaiveDate,
}

#[derive(Debug, Serialize)]
struct UpsertUsageRequest {
    count: u32,
}
