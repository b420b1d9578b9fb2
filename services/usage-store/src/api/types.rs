use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::storage::UsageRow;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUsageRequest {
    pub device_id: String,
    pub day: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUsageResponse {
    pub created: bool,
    pub usage: UsageRow,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertUsageRequest {
    pub count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageHistoryResponse {
    pub device_id: String,
    pub usage: Vec<UsageRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRequest {
    pub device_id: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackResponse {
    pub id: i64,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    pub details: Option<serde_json::Value>,
}
