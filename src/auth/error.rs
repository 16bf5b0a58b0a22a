use thiserror::Error;

/// Errors from the auth subsystem client.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("auth request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The subsystem rejected the operation (bad credentials, policy).
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("failed to decode auth payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("no active session")]
    NoSession,
}

impl AuthError {
    /// Message suitable for direct display, per the `{ok, message}` action
    /// contract.
    pub fn user_message(&self) -> String {
        match self {
            AuthError::Rejected { message, .. } => message.clone(),
            AuthError::Transport(_) => "network error - please check your connection and try again".to_string(),
            AuthError::Decode(_) => "unexpected response from the auth service".to_string(),
            AuthError::NoSession => "no active session".to_string(),
        }
    }
}
