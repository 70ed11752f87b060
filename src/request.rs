//! Claim request schema and validation.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, WcaError};

pub const MAX_IMAGES: usize = 100;

/// Only wind claims are supported; any other value fails deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LossType {
    Wind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimRequest {
    pub claim_id: String,
    pub loss_type: LossType,
    pub images: Vec<String>,
}

impl ClaimRequest {
    /// Parse and validate a request payload.
    pub fn from_json(raw: &str) -> Result<Self> {
        let request: ClaimRequest = serde_json::from_str(raw)
            .map_err(|e| WcaError::Request(format!("invalid claim payload: {e}")))?;
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> Result<()> {
        if self.claim_id.trim().is_empty() {
            return Err(WcaError::Request("claim_id is required".to_string()));
        }
        if self.images.is_empty() {
            return Err(WcaError::Request("images cannot be empty".to_string()));
        }
        if self.images.len() > MAX_IMAGES {
            return Err(WcaError::Request(format!(
                "at most {MAX_IMAGES} images per claim"
            )));
        }
        for image in &self.images {
            if Url::parse(image).is_err() {
                return Err(WcaError::Request(format!("invalid image URL: {image}")));
            }
        }
        Ok(())
    }
}
