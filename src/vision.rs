//! External damage classification via an OpenAI-compatible vision endpoint.
//!
//! The classifier contract is default-on-failure: a missing key, a transport
//! error, or a malformed response all yield [`Classification::neutral`],
//! never an error. The selector depends on that neutral result reading as
//! "related, not wind damage".

use std::future::Future;

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::config::VisionSettings;
use crate::error::{Result, WcaError};
use crate::types::{Area, Classification};

const DEFAULT_API_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const NOTES_MAX_CHARS: usize = 300;

const CLASSIFY_PROMPT: &str = "You are an insurance wind-damage assessor.\n\
Analyze the image and respond with STRICT JSON ONLY with these keys:\n\
is_wind_damage (boolean),\n\
area (\"roof\"|\"siding\"|\"garage\"|\"windows\"|\"doors\"|\"fences\"|\"gutters\"|\"solar_panels\"|\"chimney\"|\"porch\"|\"deck\"|\"pool_area\"|\"landscape\"|\"other\"),\n\
severity (integer 0..4),\n\
quality (float 0..1),\n\
unrelated_or_low_quality (boolean),\n\
notes (short string),\n\
confidence (float 0..1).\n\
No extra text, no markdown.";

/// Classifier seam consumed by the representative selector.
pub trait DamageClassifier: Sync {
    fn classify(&self, url: &str) -> impl Future<Output = Classification> + Send;
}

/// Configuration for the vision classifier.
#[derive(Debug, Clone)]
pub struct VisionConfig {
    /// OpenAI-compatible chat-completions endpoint.
    pub api_endpoint: String,
    /// Bearer token; `None` makes every classification return the neutral
    /// default without a network call.
    pub api_key: Option<String>,
    pub model: String,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            api_endpoint: DEFAULT_API_ENDPOINT.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl VisionConfig {
    /// Read settings from environment variables.
    pub fn from_env() -> Self {
        Self {
            api_endpoint: std::env::var("WCA_VISION_API_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_API_ENDPOINT.to_string()),
            api_key: std::env::var("WCA_VISION_API_KEY")
                .or_else(|_| std::env::var("OPENAI_API_KEY"))
                .ok()
                .filter(|key| !key.is_empty()),
            model: std::env::var("WCA_VISION_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
        }
    }

    /// Merge config-file settings with environment variables, file first.
    pub fn from_settings(settings: &VisionSettings) -> Self {
        let env = Self::from_env();
        Self {
            api_endpoint: settings.api_endpoint.clone().unwrap_or(env.api_endpoint),
            api_key: settings.api_key.clone().or(env.api_key),
            model: settings.model.clone().unwrap_or(env.model),
        }
    }
}

/// Vision classifier calling an OpenAI-compatible chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct VisionClient {
    config: VisionConfig,
    http: Client,
}

impl VisionClient {
    pub fn new(config: VisionConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(VisionConfig::from_env())
    }

    pub fn from_settings(settings: &VisionSettings) -> Self {
        Self::new(VisionConfig::from_settings(settings))
    }

    async fn request(&self, api_key: &str, url: &str) -> Result<Classification> {
        let payload = serde_json::json!({
            "model": self.config.model,
            "temperature": 0,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": CLASSIFY_PROMPT },
                    { "type": "image_url", "image_url": { "url": url } }
                ]
            }]
        });

        let response = self
            .http
            .post(&self.config.api_endpoint)
            .header("Authorization", format!("Bearer {api_key}"))
            .json(&payload)
            .send()
            .await
            .map_err(WcaError::Network)?;

        let status = response.status();
        if !status.is_success() {
            return Err(WcaError::fetch(
                Some(status),
                format!("classifier returned status {}", status.as_u16()),
            ));
        }

        let resp: ChatResponse = response.json().await.map_err(WcaError::Network)?;
        let content = resp
            .choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
            .ok_or_else(|| WcaError::Unknown("empty classifier response".to_string()))?;

        let value: Value = serde_json::from_str(content).map_err(WcaError::Serialization)?;
        Ok(parse_classification(&value))
    }
}

impl DamageClassifier for VisionClient {
    async fn classify(&self, url: &str) -> Classification {
        let Some(api_key) = self.config.api_key.clone() else {
            return Classification::neutral();
        };
        match self.request(&api_key, url).await {
            Ok(classification) => classification,
            Err(_) => Classification::neutral(),
        }
    }
}

/// Map a raw classifier JSON object onto a [`Classification`], clamping every
/// field into its contract range. Missing or mistyped fields fall back to the
/// neutral values.
fn parse_classification(value: &Value) -> Classification {
    Classification {
        is_wind_damage: value
            .get("is_wind_damage")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        area: value
            .get("area")
            .and_then(Value::as_str)
            .map(Area::resolve)
            .unwrap_or(Area::Other),
        severity: value
            .get("severity")
            .and_then(Value::as_f64)
            .map(|s| s.clamp(0.0, 4.0) as u8)
            .unwrap_or(0),
        quality: value
            .get("quality")
            .and_then(Value::as_f64)
            .unwrap_or(0.5)
            .clamp(0.0, 1.0),
        unrelated_or_low_quality: value
            .get("unrelated_or_low_quality")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        notes: value
            .get("notes")
            .and_then(Value::as_str)
            .map(|notes| notes.chars().take(NOTES_MAX_CHARS).collect())
            .unwrap_or_default(),
        confidence: value
            .get("confidence")
            .and_then(Value::as_f64)
            .unwrap_or(0.5)
            .clamp(0.0, 1.0),
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}
