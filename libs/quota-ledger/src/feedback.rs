use std::fmt;
use std::sync::Arc;

use tracing::{info, warn};

use crate::identity::DeviceIdentity;
use crate::remote::{FeedbackEntry, FeedbackSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackStatus {
    EmptyMessage,
    SavedLocally,
    Submitted,
    Rejected,
    Unreachable,
}

impl FeedbackStatus {
    pub fn message(self) -> &'static str {
        match self {
            Self::EmptyMessage => "Please write something before submitting.",
            Self::SavedLocally => "Saved locally (DB not configured).",
            Self::Submitted => "Thanks for your suggestion!",
            Self::Rejected => "Failed to submit (DB).",
            Self::Unreachable => "Failed to submit.",
        }
    }
}

impl fmt::Display for FeedbackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Fire-and-forget feedback submission. The user always gets an
/// acknowledgement; remote failures only change its wording.
pub struct FeedbackDesk {
    sink: Option<Arc<dyn FeedbackSink>>,
    identity: Arc<DeviceIdentity>,
}

impl FeedbackDesk {
    pub fn new(sink: Option<Arc<dyn FeedbackSink>>, identity: Arc<DeviceIdentity>) -> Self {
        Self { sink, identity }
    }

    pub async fn submit(&self, text: &str) -> FeedbackStatus {
        let message = text.trim();
        if message.is_empty() {
            return FeedbackStatus::EmptyMessage;
        }

        let Some(sink) = &self.sink else {
            info!("feedback received without a configured usage store");
            return FeedbackStatus::SavedLocally;
        };

        let entry = FeedbackEntry {
            device_id: Some(self.identity.get_or_create()),
            message: message.to_string(),
        };

        match sink.submit(&entry).await {
            Ok(()) => FeedbackStatus::Submitted,
            Err(err) => {
                warn!(error = %err, "failed to submit feedback");
                if err.is_backend_error() {
                    FeedbackStatus::Rejected
                } else {
                    FeedbackStatus::Unreachable
                }
            }
        }
    }
}
