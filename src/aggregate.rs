//! Label propagation, area grouping, and claim-level scoring.

use crate::selector::Representative;
use crate::types::{
    Area, AreaEntry, AssessmentReport, ImageRecord, PrimaryPeril, SourceImagesMeta,
};

const NO_REPRESENTATIVE_CONFIDENCE: f64 = 0.4;
const CONFIRMATION_SEVERITY: u8 = 2;
const CONFIRMATION_COUNT: usize = 2;
const VOLUME_BOOST_CAP: f64 = 10.0;
const LOW_PHOTO_THRESHOLD: usize = 3;

/// A cluster member carrying labels copied from its representative.
#[derive(Debug, Clone)]
struct ExpandedImage {
    area: Area,
    severity: u8,
    is_wind: bool,
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Build the final assessment from analyzed records, their clustering, and
/// the per-cluster representative slots.
///
/// Representative classifications are expanded to every non-unrelated member
/// of their cluster as explicit copies; unrelated members stay out of
/// propagation but still count toward raw totals.
pub fn aggregate(
    records: &[ImageRecord],
    clusters: &[Vec<usize>],
    representatives: &[Option<Representative>],
    total_urls: usize,
) -> AssessmentReport {
    // Clusters whose best-quality member is itself unrelated were discarded
    // before classification.
    let discarded_low_quality = clusters
        .iter()
        .filter_map(|cluster| best_by_quality(records, cluster))
        .filter(|&i| records[i].likely_unrelated)
        .count();

    // Label propagation: one derived record per non-unrelated member of each
    // represented cluster.
    let mut expanded: Vec<ExpandedImage> = Vec::new();
    for (cluster, representative) in clusters.iter().zip(representatives) {
        let Some(rep) = representative else {
            continue;
        };
        for &member in cluster {
            if records[member].likely_unrelated {
                continue;
            }
            expanded.push(ExpandedImage {
                area: rep.classification.area,
                severity: rep.classification.severity,
                is_wind: rep.classification.is_wind_damage,
            });
        }
    }

    let related_reps: Vec<&Representative> = representatives
        .iter()
        .flatten()
        .filter(|rep| rep.classification.is_related())
        .collect();

    let mut areas = Vec::new();
    for area in Area::ALL {
        let expanded_here: Vec<&ExpandedImage> =
            expanded.iter().filter(|img| img.area == area).collect();
        let reps_here: Vec<&&Representative> = related_reps
            .iter()
            .filter(|rep| rep.classification.area == area)
            .collect();
        if reps_here.is_empty() {
            continue;
        }

        let evidence_count = expanded_here
            .iter()
            .filter(|img| img.severity >= CONFIRMATION_SEVERITY && img.is_wind)
            .count();
        let any_wind = expanded_here.iter().any(|img| img.is_wind);

        let avg_severity = round2(
            reps_here
                .iter()
                .map(|rep| f64::from(rep.classification.severity))
                .sum::<f64>()
                / reps_here.len() as f64,
        );

        let best_image = first_max_by(&reps_here, |rep| {
            0.5 * records[rep.image_index].quality + 0.5 * rep.classification.quality
        });
        let best_notes = first_max_by(&reps_here, |rep| rep.classification.confidence)
            .map(|rep| rep.classification.notes.clone())
            .unwrap_or_default();

        areas.push(AreaEntry {
            area,
            damage_confirmed: evidence_count >= CONFIRMATION_COUNT,
            primary_peril: if any_wind {
                PrimaryPeril::Wind
            } else {
                PrimaryPeril::NoWind
            },
            count: reps_here.len(),
            avg_severity,
            representative_images: best_image
                .map(|rep| vec![records[rep.image_index].url.clone()])
                .unwrap_or_default(),
            notes: best_notes,
        });
    }

    // Quality-weighted severity over every representative, not per-area
    // averages.
    let quality_sum: f64 = related_reps
        .iter()
        .map(|rep| rep.classification.quality)
        .sum();
    let weighted_severity: f64 = related_reps
        .iter()
        .map(|rep| f64::from(rep.classification.severity) * rep.classification.quality)
        .sum();
    let overall_damage_severity = if quality_sum > 0.0 {
        round2(weighted_severity / quality_sum)
    } else {
        0.0
    };

    // Mean confidence scaled by a volume boost: more corroborating
    // representatives increase trust, capped at ten.
    let mean_confidence = if related_reps.is_empty() {
        NO_REPRESENTATIVE_CONFIDENCE
    } else {
        related_reps
            .iter()
            .map(|rep| rep.classification.confidence)
            .sum::<f64>()
            / related_reps.len() as f64
    };
    let volume_boost = (related_reps.len() as f64 / VOLUME_BOOST_CAP).min(1.0);
    let confidence = round2(mean_confidence * (0.7 + 0.3 * volume_boost));

    let mut data_gaps = Vec::new();
    for (area, message) in [
        (Area::Roof, "No roof photos"),
        (Area::Siding, "No siding photos"),
        (Area::Garage, "No garage photos"),
    ] {
        if !expanded.iter().any(|img| img.area == area) {
            data_gaps.push(message.to_string());
        }
    }
    if expanded.len() < LOW_PHOTO_THRESHOLD {
        data_gaps.push("Low photo count".to_string());
    }

    AssessmentReport {
        source_images: SourceImagesMeta {
            total: total_urls,
            analyzed: records.len(),
            discarded_low_quality,
            clusters: clusters.len(),
        },
        areas,
        overall_damage_severity,
        data_gaps,
        confidence,
    }
}

/// Index of the cluster member with the highest quality score; the first
/// encountered wins on ties.
fn best_by_quality(records: &[ImageRecord], cluster: &[usize]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for &i in cluster {
        match best {
            Some(b) if records[i].quality <= records[b].quality => {}
            _ => best = Some(i),
        }
    }
    best
}

/// First element attaining the maximum key; ties keep encounter order.
fn first_max_by<'a, T, F>(items: &'a [T], key: F) -> Option<&'a T>
where
    F: Fn(&T) -> f64,
{
    let mut best: Option<(&T, f64)> = None;
    for item in items {
        let k = key(item);
        match best {
            Some((_, best_key)) if k <= best_key => {}
            _ => best = Some((item, k)),
        }
    }
    best.map(|(item, _)| item)
}
