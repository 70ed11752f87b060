//! Per-cluster representative selection against the external classifier.

use std::cmp::Ordering;

use crate::types::{Classification, ImageRecord};
use crate::vision::DamageClassifier;

pub const MAX_REP_CANDIDATES: usize = 3;

/// Minimum severity for a classification to be accepted outright.
const ACCEPT_SEVERITY: u8 = 2;

/// A cluster's chosen representative with its classification attached.
#[derive(Debug, Clone)]
pub struct Representative {
    pub image_index: usize,
    pub classification: Classification,
}

/// Cluster members ranked by quality score descending (stable, so ties keep
/// cluster order), with `likely_unrelated` members removed, capped at `max`.
pub fn rank_candidates(records: &[ImageRecord], cluster: &[usize], max: usize) -> Vec<usize> {
    let mut ranked: Vec<usize> = cluster.to_vec();
    ranked.sort_by(|&a, &b| {
        records[b]
            .quality
            .partial_cmp(&records[a].quality)
            .unwrap_or(Ordering::Equal)
    });
    ranked.retain(|&i| !records[i].likely_unrelated);
    ranked.truncate(max);
    ranked
}

/// Classify ranked candidates one at a time until one satisfies the
/// acceptance tiers.
///
/// Tier 1: related, wind damage, severity at least 2 -- accepted
/// immediately, remaining candidates are never classified. Tier 2: the first
/// related wind-damage candidate. Tier 3: the first related candidate of any
/// kind. A cluster whose candidates are all unrelated yields no
/// representative and contributes nothing downstream.
pub async fn select_representative<C: DamageClassifier>(
    records: &[ImageRecord],
    cluster: &[usize],
    classifier: &C,
    max_candidates: usize,
) -> Option<Representative> {
    let mut wind_fallback: Option<Representative> = None;
    let mut related_fallback: Option<Representative> = None;

    for image_index in rank_candidates(records, cluster, max_candidates) {
        let classification = classifier.classify(&records[image_index].url).await;
        if !classification.is_related() {
            continue;
        }

        if classification.is_wind_damage && classification.severity >= ACCEPT_SEVERITY {
            return Some(Representative {
                image_index,
                classification,
            });
        }
        if classification.is_wind_damage && wind_fallback.is_none() {
            wind_fallback = Some(Representative {
                image_index,
                classification: classification.clone(),
            });
        }
        if related_fallback.is_none() {
            related_fallback = Some(Representative {
                image_index,
                classification,
            });
        }
    }

    wind_fallback.or(related_fallback)
}
