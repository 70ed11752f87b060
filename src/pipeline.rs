//! End-to-end claim photo pipeline: fetch, fingerprint, cluster, classify,
//! aggregate.

use std::sync::Arc;

use sha2::{Digest, Sha256};
use tokio::sync::Semaphore;

use crate::aggregate::aggregate;
use crate::cluster::{cluster_records, DEFAULT_DHASH_THRESHOLD, DEFAULT_PHASH_THRESHOLD};
use crate::error::Result;
use crate::fetcher::ImageFetcher;
use crate::fingerprint::{dhash64, phash64};
use crate::quality;
use crate::selector::{select_representative, Representative, MAX_REP_CANDIDATES};
use crate::types::{AssessmentReport, ImageRecord};
use crate::vision::DamageClassifier;

pub const DEFAULT_CONCURRENCY: usize = 5;

/// Tunables for one pipeline run.
#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    /// Worker-pool size shared across fetch+analyze and per-cluster
    /// selection tasks.
    pub concurrency: usize,
    pub dhash_threshold: u32,
    pub phash_threshold: u32,
    pub max_candidates: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            dhash_threshold: DEFAULT_DHASH_THRESHOLD,
            phash_threshold: DEFAULT_PHASH_THRESHOLD,
            max_candidates: MAX_REP_CANDIDATES,
        }
    }
}

/// Run the full assessment for a list of image URLs.
///
/// Per-image fetch or decode failures drop that image and never fail the
/// batch; an invocation with zero surviving images still returns a
/// well-formed (empty) report. Analyze results land in input-order slots, so
/// the order-dependent clustering pass is reproducible for a given input
/// order regardless of task completion order.
pub async fn assess_claim<F, C>(
    urls: &[String],
    fetcher: &F,
    classifier: &C,
    options: &PipelineOptions,
) -> AssessmentReport
where
    F: ImageFetcher,
    C: DamageClassifier,
{
    let semaphore = Arc::new(Semaphore::new(options.concurrency.max(1)));

    let analyses = futures::future::join_all(urls.iter().map(|url| {
        let semaphore = Arc::clone(&semaphore);
        async move {
            let _permit = semaphore.acquire_owned().await.ok()?;
            analyze_image(fetcher, url).await.ok()
        }
    }))
    .await;
    let records: Vec<ImageRecord> = analyses.into_iter().flatten().collect();

    let clustering = cluster_records(&records, options.dhash_threshold, options.phash_threshold);

    let records_ref = &records;
    let representatives: Vec<Option<Representative>> =
        futures::future::join_all(clustering.clusters.iter().map(|cluster| {
            let semaphore = Arc::clone(&semaphore);
            async move {
                let _permit = semaphore.acquire_owned().await.ok()?;
                select_representative(records_ref, cluster, classifier, options.max_candidates)
                    .await
            }
        }))
        .await;

    aggregate(
        &records,
        &clustering.clusters,
        &representatives,
        urls.len(),
    )
}

/// Fetch, digest, decode and score one image.
async fn analyze_image<F: ImageFetcher>(fetcher: &F, url: &str) -> Result<ImageRecord> {
    let bytes = fetcher.fetch(url).await?;
    let content_digest = format!("{:x}", Sha256::digest(&bytes));
    let img = image::load_from_memory(&bytes)?;
    let report = quality::assess(&img);

    Ok(ImageRecord {
        url: url.to_string(),
        dhash: dhash64(&img),
        phash: phash64(&img),
        content_digest,
        quality: report.score,
        likely_unrelated: report.likely_unrelated,
        quality_notes: report.notes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_match_expected() {
        let options = PipelineOptions::default();
        assert_eq!(options.concurrency, 5);
        assert_eq!(options.dhash_threshold, 1);
        assert_eq!(options.phash_threshold, 8);
        assert_eq!(options.max_candidates, 3);
    }
}
