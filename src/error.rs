use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::ParseError;

#[derive(Debug, Error)]
pub enum WcaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] ParseError),

    #[error("Fetch error (status: {status:?}): {message}")]
    Fetch {
        status: Option<StatusCode>,
        message: String,
    },

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid request: {0}")]
    Request(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unexpected error: {0}")]
    Unknown(String),
}

impl WcaError {
    pub fn fetch(status: Option<StatusCode>, message: impl Into<String>) -> Self {
        WcaError::Fetch {
            status,
            message: message.into(),
        }
    }

    pub fn to_payload(&self) -> ErrorPayload {
        match self {
            WcaError::Io(e) => ErrorPayload::new(
                ErrorCategory::Config,
                e.to_string(),
                "Check file paths/permissions.",
            ),
            WcaError::Network(e) => ErrorPayload::new(
                ErrorCategory::Network,
                e.to_string(),
                "Check connectivity/proxy/VPN and retry.",
            ),
            WcaError::InvalidUrl(e) => ErrorPayload::new(
                ErrorCategory::Request,
                e.to_string(),
                "Verify URL format (e.g., https://example.com/photo.jpg).",
            ),
            WcaError::Fetch { status, message } => ErrorPayload::new(
                ErrorCategory::Network,
                format!("Fetch error (status {:?}): {}", status, message),
                "Verify the image URL is reachable and returns a non-empty body.",
            ),
            WcaError::Image(e) => ErrorPayload::new(
                ErrorCategory::Image,
                e.to_string(),
                "Verify the image bytes are a supported format (png, jpeg, webp, gif, bmp, tiff).",
            ),
            WcaError::Serialization(e) => ErrorPayload::new(
                ErrorCategory::Config,
                e.to_string(),
                "Check JSON inputs; run with --verbose for details.",
            ),
            WcaError::Request(msg) => {
                let lower = msg.to_ascii_lowercase();
                if lower.contains("claim_id") {
                    ErrorPayload::new(
                        ErrorCategory::Request,
                        msg.to_string(),
                        "Provide a non-empty claim_id string in the request payload.",
                    )
                } else if lower.contains("loss_type") {
                    ErrorPayload::new(
                        ErrorCategory::Request,
                        msg.to_string(),
                        "Only loss_type \"wind\" is supported.",
                    )
                } else if lower.contains("image") {
                    ErrorPayload::new(
                        ErrorCategory::Request,
                        msg.to_string(),
                        "Provide 1 to 100 valid image URLs in the images array.",
                    )
                } else {
                    ErrorPayload::new(
                        ErrorCategory::Request,
                        msg.to_string(),
                        "Check the claim payload fields (claim_id, loss_type, images).",
                    )
                }
            }
            WcaError::Config(msg) => {
                let lower = msg.to_ascii_lowercase();
                if lower.contains("api key") || lower.contains("vision") {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "Set WCA_VISION_API_KEY (or OPENAI_API_KEY) before running assessments.",
                    )
                } else if lower.contains("concurrency") {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "Use a concurrency of at least 1.",
                    )
                } else {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "Check flags/paths and config file values.",
                    )
                }
            }
            WcaError::Unknown(msg) => ErrorPayload::new(
                ErrorCategory::Unknown,
                msg.to_string(),
                "Re-run with --verbose; file an issue if persistent.",
            ),
        }
    }
}

pub type Result<T> = std::result::Result<T, WcaError>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Config,
    Network,
    Request,
    Image,
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub category: ErrorCategory,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
}

impl ErrorPayload {
    pub fn new(category: ErrorCategory, message: String, remediation: impl Into<String>) -> Self {
        Self {
            category,
            message,
            remediation: Some(remediation.into()),
        }
    }
}
