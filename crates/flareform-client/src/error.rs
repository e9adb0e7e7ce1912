//! Cloudflare API client error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("invalid base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("invalid value for header {header}")]
    InvalidHeader { header: &'static str },

    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    #[error("Cloudflare API error: {}", format_api_errors(.errors))]
    Api { status: u16, errors: Vec<ApiMessage> },

    #[error("unexpected HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no account id configured; set `account_id` on the resource or the provider")]
    MissingAccount,
}

impl ClientError {
    /// Whether the error came from assembling the client rather than using it.
    pub fn is_construction(&self) -> bool {
        matches!(
            self,
            ClientError::InvalidBaseUrl { .. } | ClientError::InvalidHeader { .. } | ClientError::Build(_)
        )
    }
}

/// One entry of the `errors` array in an API response.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub code: i64,
    pub message: String,
}

fn format_api_errors(errors: &[ApiMessage]) -> String {
    if errors.is_empty() {
        return "Unknown error".to_string();
    }
    errors
        .iter()
        .map(|e| format!("{} ({})", e.message, e.code))
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, ClientError>;
