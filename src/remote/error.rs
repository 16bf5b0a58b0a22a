use thiserror::Error;

/// Errors surfaced by the hosted table API client.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("remote request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("remote returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("failed to decode remote payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("remote response carried no row count")]
    MissingCount,
}

/// Pull the human-readable message out of an error body. The hosted service
/// answers with one of a few JSON shapes depending on which layer rejected
/// the request.
pub(crate) fn api_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    for key in ["message", "msg", "error_description", "error"] {
        if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
            return Some(text.to_string());
        }
    }
    None
}
