//! Wind Claim Assessor (WCA) Library
//!
//! A library for turning a batch of wind-damage claim photo URLs into a
//! structured per-area damage assessment. Near-duplicate shots are collapsed
//! via perceptual fingerprints, one representative per cluster is sent to an
//! external vision classifier, and the verdicts are propagated and scored.
//!
//! # Module Overview
//!
//! - [`fingerprint`] - dHash/pHash computation and Hamming distance
//! - [`quality`] - Basic usability scoring (darkness, blur, uniformity)
//! - [`cluster`] - Complete-linkage similarity clustering
//! - [`selector`] - Per-cluster representative selection
//! - [`aggregate`] - Label propagation, area grouping, and scoring
//! - [`pipeline`] - End-to-end orchestration with bounded concurrency
//! - [`fetcher`] / [`vision`] - External collaborator seams
//! - [`request`] / [`output`] - Claim request schema and output envelopes
//!
//! # Example
//!
//! ```no_run
//! use wca_lib::{assess_claim, HttpFetcher, PipelineOptions, VisionClient};
//!
//! # async fn example() -> wca_lib::Result<()> {
//! let urls = vec!["https://example.com/roof.jpg".to_string()];
//! let fetcher = HttpFetcher::new()?;
//! let classifier = VisionClient::from_env();
//! let report = assess_claim(&urls, &fetcher, &classifier, &PipelineOptions::default()).await;
//! println!("overall severity: {}", report.overall_damage_severity);
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod cluster;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod fingerprint;
pub mod output;
pub mod pipeline;
pub mod quality;
pub mod request;
pub mod selector;
pub mod types;
pub mod vision;

pub use aggregate::aggregate;
pub use cluster::{
    cluster_records, Clustering, DistanceMatrix, DEFAULT_DHASH_THRESHOLD, DEFAULT_PHASH_THRESHOLD,
};
pub use config::{Config, VisionSettings};
pub use error::{ErrorCategory, ErrorPayload, Result, WcaError};
pub use fetcher::{HttpFetcher, ImageFetcher, DEFAULT_FETCH_TIMEOUT};
pub use fingerprint::{dhash64, hamming_hex, phash64, MAX_DISTANCE};
pub use output::{
    AssessmentOutput, ErrorOutput, ValidateOutput, WcaOutput, WCA_OUTPUT_VERSION,
};
pub use pipeline::{assess_claim, PipelineOptions, DEFAULT_CONCURRENCY};
pub use quality::{assess as assess_quality, QualityReport};
pub use request::{ClaimRequest, LossType, MAX_IMAGES};
pub use selector::{select_representative, Representative, MAX_REP_CANDIDATES};
pub use types::{
    Area, AreaEntry, AssessmentReport, Classification, ImageRecord, PrimaryPeril,
    SourceImagesMeta,
};
pub use vision::{DamageClassifier, VisionClient, VisionConfig};
