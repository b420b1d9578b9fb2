//! UI-side state for one client window: form fields, the last answer and
//! the ask flow that gates requests on the quota ledger.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::ledger::{QuotaLedger, QuotaSnapshot, Reservation};
use crate::storage::{StorageProvider, THEME_KEY};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    #[default]
    Basic,
    Advanced,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerStyle {
    #[default]
    Detailed,
    Short,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    #[default]
    English,
    Hinglish,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub theme: Theme,
    pub level: Level,
    pub style: AnswerStyle,
    pub language: Language,
    pub question_text: String,
    pub answer_text: String,
    pub error_message: String,
    pub in_flight: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Question {
    Text(String),
    Image { file_name: String, bytes: Vec<u8> },
}

#[derive(Debug, Clone, Copy)]
pub struct SolveRequest<'a> {
    pub question: &'a Question,
    pub level: Level,
    pub style: AnswerStyle,
    pub language: Language,
}

#[derive(Debug, Error)]
pub enum SolveError {
    #[error("solving backend responded with {0}")]
    Status(u16),
    #[error("solving backend unreachable: {0}")]
    Unreachable(String),
}

/// The remote solving backend. How requests are encoded is up to the
/// implementation.
#[async_trait]
pub trait Solver: Send + Sync {
    async fn solve(&self, request: SolveRequest<'_>) -> Result<String, SolveError>;
}

#[async_trait]
impl<T: Solver + ?Sized> Solver for Arc<T> {
    async fn solve(&self, request: SolveRequest<'_>) -> Result<String, SolveError> {
        (**self).solve(request).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AskOutcome {
    Answered(QuotaSnapshot),
    Invalid,
    LimitReached,
    Failed,
}

pub struct Session<S> {
    state: SessionState,
    ledger: QuotaLedger,
    solver: S,
    storage: Arc<dyn StorageProvider>,
}

impl<S: Solver> Session<S> {
    pub fn new(ledger: QuotaLedger, solver: S, storage: Arc<dyn StorageProvider>) -> Self {
        let theme = load_theme(storage.as_ref());
        Self {
            state: SessionState {
                theme,
                ..SessionState::default()
            },
            ledger,
            solver,
            storage,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut SessionState {
        &mut self.state
    }

    pub fn ledger(&self) -> &QuotaLedger {
        &self.ledger
    }

    /// Usage line plus the ledger's sync status, if any.
    pub fn usage_line(&self) -> String {
        let snapshot = self.ledger.snapshot();
        match self.ledger.status_message() {
            status if status.is_empty() => snapshot.to_string(),
            status => format!("{snapshot} ({status})"),
        }
    }

    pub fn can_submit(&self) -> bool {
        !self.state.in_flight && self.ledger.check_and_reserve().is_allowed()
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.state.theme = self.state.theme.toggled();
        if let Err(err) = self.storage.set(THEME_KEY, self.state.theme.as_str()) {
            warn!(error = %err, "failed to persist theme");
        }
        self.state.theme
    }

    pub fn clear(&mut self) {
        self.state.question_text.clear();
        self.state.answer_text.clear();
        self.state.error_message.clear();
    }

    /// Sends one question. Quota is only consumed when the backend returns a
    /// non-empty answer.
    pub async fn ask(&mut self, question: Question) -> AskOutcome {
        self.state.error_message.clear();
        self.state.answer_text.clear();

        let question = match question {
            Question::Text(text) if text.trim().is_empty() => {
                self.state.error_message = "Please type a question first.".to_string();
                return AskOutcome::Invalid;
            }
            Question::Text(text) => Question::Text(text.trim().to_string()),
            Question::Image { bytes, .. } if bytes.is_empty() => {
                self.state.error_message = "Please select an image first.".to_string();
                return AskOutcome::Invalid;
            }
            image => image,
        };

        if self.ledger.check_and_reserve() == Reservation::LimitReached {
            self.state.error_message = format!(
                "Daily free limit of {} questions is over for today.",
                self.ledger.daily_limit()
            );
            return AskOutcome::LimitReached;
        }

        self.state.in_flight = true;
        let request = SolveRequest {
            question: &question,
            level: self.state.level,
            style: self.state.style,
            language: self.state.language,
        };
        let result = self.solver.solve(request).await;
        self.state.in_flight = false;

        match result {
            Ok(answer) if answer.trim().is_empty() => {
                self.state.error_message = "Empty response from backend.".to_string();
                AskOutcome::Failed
            }
            Ok(answer) => {
                self.state.answer_text = answer;
                let outcome = self.ledger.commit().await;
                debug!(used = outcome.snapshot.used, "answer recorded");
                AskOutcome::Answered(outcome.snapshot)
            }
            Err(SolveError::Status(status)) => {
                self.state.error_message = format!("Server error ({status}).");
                AskOutcome::Failed
            }
            Err(err @ SolveError::Unreachable(_)) => {
                warn!(error = %err, "solving backend unreachable");
                self.state.error_message =
                    "Unable to reach backend. Check if backend is running.".to_string();
                AskOutcome::Failed
            }
        }
    }
}

fn load_theme(storage: &dyn StorageProvider) -> Theme {
    match storage.get(THEME_KEY) {
        Ok(Some(saved)) => {
            if let Some(theme) = Theme::parse(&saved) {
                return theme;
            }
        }
        Ok(None) => {}
        Err(err) => {
            warn!(error = %err, "theme preference unavailable");
            return Theme::default();
        }
    }

    if let Err(err) = storage.set(THEME_KEY, Theme::default().as_str()) {
        warn!(error = %err, "failed to persist theme");
    }
    Theme::default()
}
