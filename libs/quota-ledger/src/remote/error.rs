use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("usage store unreachable: {0}")]
    Unreachable(String),
    #[error("usage store responded with {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("invalid usage store payload: {0}")]
    InvalidPayload(String),
}

impl RemoteError {
    /// True when the store answered but refused or garbled the request, as
    /// opposed to never answering at all.
    pub fn is_backend_error(&self) -> bool {
        matches!(self, Self::Rejected { .. } | Self::InvalidPayload(_))
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::InvalidPayload(err.to_string())
        } else {
            Self::Unreachable(err.to_string())
        }
    }
}
