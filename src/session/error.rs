use serde_json::Value;

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server returned {status}: {detail}")]
    Status { status: u16, detail: String },
    #[error("not authorized: {0}")]
    Unauthorized(String),
    #[error("could not decode response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("no credentials configured (PEER_PILOT_EMAIL / PEER_PILOT_PASSWORD)")]
    MissingCredentials,
}

impl ApiError {
    /// Builds an error from a non-success response body, preferring the
    /// backend's `detail` or `message` field over the raw text.
    pub fn from_body(status: u16, body: &str) -> Self {
        let detail = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|v| {
                v.get("detail")
                    .or_else(|| v.get("message"))
                    .map(|d| match d {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
            })
            .unwrap_or_else(|| body.trim().to_string());
        if status == 401 {
            ApiError::Unauthorized(detail)
        } else {
            ApiError::Status { status, detail }
        }
    }
}
