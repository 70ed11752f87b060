//! Versioned output payloads for the CLI.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ErrorPayload;
use crate::types::{AreaEntry, AssessmentReport, SourceImagesMeta};

/// Schema version for output payloads.
pub const WCA_OUTPUT_VERSION: &str = "0.1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum WcaOutput {
    Assess(AssessmentOutput),
    Validate(ValidateOutput),
    Error(ErrorOutput),
}

/// Final assessment envelope: the core report plus claim identity and
/// provenance fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentOutput {
    pub version: String,
    pub claim_id: String,
    pub source_images: SourceImagesMeta,
    pub overall_damage_severity: f64,
    pub areas: Vec<AreaEntry>,
    pub data_gaps: Vec<String>,
    pub confidence: f64,
    pub generated_at: DateTime<Utc>,
}

impl AssessmentOutput {
    pub fn new(claim_id: impl Into<String>, report: AssessmentReport) -> Self {
        Self {
            version: WCA_OUTPUT_VERSION.to_string(),
            claim_id: claim_id.into(),
            source_images: report.source_images,
            overall_damage_severity: report.overall_damage_severity,
            areas: report.areas,
            data_gaps: report.data_gaps,
            confidence: report.confidence,
            generated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateOutput {
    pub version: String,
    pub valid: bool,
    pub claim_id: String,
    pub image_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorOutput {
    pub version: String,
    pub error: ErrorPayload,
}
