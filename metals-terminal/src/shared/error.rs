use thiserror::Error;

/// All errors generated while talking to the metals backend.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum ApiError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("HTTP Error: {status}{}", .message.as_ref().map(|m| format!(" ({m})")).unwrap_or_default())]
    Http {
        status: u16,
        message: Option<String>,
    },

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("backend rejected request: {0}")]
    Rejected(String),

    #[error("backend reported success without data")]
    EmptyPayload,
}

impl ApiError {
    /// Determine if the error means the backend could not be reached or answered
    /// with a failing status, as opposed to a well-formed but unusable response.
    #[allow(clippy::match_like_matches_macro)]
    pub fn is_connectivity(&self) -> bool {
        match self {
            ApiError::Transport(_) | ApiError::Http { .. } => true,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            Self::Decode(value.to_string())
        } else {
            Self::Transport(value.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(value: serde_json::Error) -> Self {
        Self::Decode(value.to_string())
    }
}
