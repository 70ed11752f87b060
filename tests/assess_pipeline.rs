use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Mutex;

use image::{DynamicImage, Rgba, RgbaImage};

use wca_lib::{
    assess_claim, Area, Classification, DamageClassifier, ImageFetcher, PipelineOptions,
    PrimaryPeril, Result, WcaError,
};

/// Serves canned image bytes per URL; unknown URLs fail like a dead link.
struct FixtureFetcher {
    images: HashMap<String, Vec<u8>>,
}

impl FixtureFetcher {
    fn new(images: Vec<(&str, Vec<u8>)>) -> Self {
        Self {
            images: images
                .into_iter()
                .map(|(url, bytes)| (url.to_string(), bytes))
                .collect(),
        }
    }
}

impl ImageFetcher for FixtureFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.images
            .get(url)
            .cloned()
            .ok_or_else(|| WcaError::fetch(None, format!("no fixture for {url}")))
    }
}

/// Replays canned verdicts per URL, neutral otherwise, and logs every call.
struct ScriptedClassifier {
    verdicts: HashMap<String, Classification>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedClassifier {
    fn new(verdicts: Vec<(&str, Classification)>) -> Self {
        Self {
            verdicts: verdicts
                .into_iter()
                .map(|(url, verdict)| (url.to_string(), verdict))
                .collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn neutral() -> Self {
        Self::new(Vec::new())
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl DamageClassifier for ScriptedClassifier {
    async fn classify(&self, url: &str) -> Classification {
        self.calls.lock().unwrap().push(url.to_string());
        self.verdicts
            .get(url)
            .cloned()
            .unwrap_or_else(Classification::neutral)
    }
}

fn png_bytes(img: &DynamicImage) -> Vec<u8> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageOutputFormat::Png)
        .expect("encode png");
    buf
}

/// Bright left-to-right ramp; sharp enough hashes, decent quality.
fn ramp_png(width: u32, height: u32) -> Vec<u8> {
    png_bytes(&DynamicImage::ImageRgba8(RgbaImage::from_fn(
        width,
        height,
        |x, _| {
            let value = (x * 255 / width.max(1)) as u8;
            Rgba([value, value, value, 255])
        },
    )))
}

/// Flat bright image; visually nothing like the ramp.
fn flat_png(width: u32, height: u32, value: u8) -> Vec<u8> {
    png_bytes(&DynamicImage::ImageRgba8(RgbaImage::from_pixel(
        width,
        height,
        Rgba([value, value, value, 255]),
    )))
}

fn verdict(area: Area, severity: u8, wind: bool) -> Classification {
    Classification {
        is_wind_damage: wind,
        area,
        severity,
        quality: 0.8,
        unrelated_or_low_quality: false,
        notes: "classifier notes".to_string(),
        confidence: 0.9,
    }
}

fn urls(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn near_identical_images_collapse_into_one_cluster() {
    let bytes = ramp_png(300, 200);
    let fetcher = FixtureFetcher::new(vec![
        ("https://claims.example/a.png", bytes.clone()),
        ("https://claims.example/b.png", bytes.clone()),
        ("https://claims.example/c.png", bytes),
    ]);
    let classifier = ScriptedClassifier::new(vec![(
        "https://claims.example/a.png",
        verdict(Area::Roof, 3, true),
    )]);

    let report = assess_claim(
        &urls(&[
            "https://claims.example/a.png",
            "https://claims.example/b.png",
            "https://claims.example/c.png",
        ]),
        &fetcher,
        &classifier,
        &PipelineOptions::default(),
    )
    .await;

    assert_eq!(report.source_images.total, 3);
    assert_eq!(report.source_images.analyzed, 3);
    assert_eq!(report.source_images.clusters, 1);
    // The severe wind verdict on the first candidate short-circuits the rest.
    assert_eq!(classifier.call_count(), 1);
    assert_eq!(report.areas.len(), 1);
    assert_eq!(report.areas[0].area, Area::Roof);
}

#[tokio::test]
async fn empty_batch_still_produces_a_well_formed_report() {
    let fetcher = FixtureFetcher::new(vec![]);
    let classifier = ScriptedClassifier::neutral();

    let report = assess_claim(
        &urls(&["https://claims.example/missing.png"]),
        &fetcher,
        &classifier,
        &PipelineOptions::default(),
    )
    .await;

    assert_eq!(report.source_images.total, 1);
    assert_eq!(report.source_images.analyzed, 0);
    assert_eq!(report.source_images.clusters, 0);
    assert!(report.areas.is_empty());
    assert_eq!(report.overall_damage_severity, 0.0);
    assert_eq!(report.confidence, 0.28);
    assert!(report.data_gaps.contains(&"Low photo count".to_string()));
    assert_eq!(classifier.call_count(), 0);
}

#[tokio::test]
async fn tiny_image_is_discarded_without_classification() {
    let fetcher = FixtureFetcher::new(vec![(
        "https://claims.example/thumb.png",
        flat_png(100, 100, 200),
    )]);
    let classifier = ScriptedClassifier::neutral();

    let report = assess_claim(
        &urls(&["https://claims.example/thumb.png"]),
        &fetcher,
        &classifier,
        &PipelineOptions::default(),
    )
    .await;

    assert_eq!(report.source_images.analyzed, 1);
    assert_eq!(report.source_images.clusters, 1);
    assert_eq!(report.source_images.discarded_low_quality, 1);
    assert!(report.areas.is_empty());
    assert_eq!(
        classifier.call_count(),
        0,
        "an entirely unrelated cluster is never classified"
    );
}

#[tokio::test]
async fn unrelated_verdicts_leave_the_cluster_unrepresented() {
    let bytes = ramp_png(300, 200);
    let unrelated = Classification {
        unrelated_or_low_quality: true,
        ..verdict(Area::Roof, 4, true)
    };
    let fetcher = FixtureFetcher::new(vec![
        ("https://claims.example/a.png", bytes.clone()),
        ("https://claims.example/b.png", bytes.clone()),
        ("https://claims.example/c.png", bytes),
    ]);
    let classifier = ScriptedClassifier::new(vec![
        ("https://claims.example/a.png", unrelated.clone()),
        ("https://claims.example/b.png", unrelated.clone()),
        ("https://claims.example/c.png", unrelated),
    ]);

    let report = assess_claim(
        &urls(&[
            "https://claims.example/a.png",
            "https://claims.example/b.png",
            "https://claims.example/c.png",
        ]),
        &fetcher,
        &classifier,
        &PipelineOptions::default(),
    )
    .await;

    assert!(report.areas.is_empty());
    assert_eq!(classifier.call_count(), 3, "all three candidates were tried");
    assert_eq!(report.source_images.clusters, 1);
}

#[tokio::test]
async fn corroborated_roof_damage_is_confirmed() {
    let bytes = ramp_png(300, 200);
    let fetcher = FixtureFetcher::new(vec![
        ("https://claims.example/roof1.png", bytes.clone()),
        ("https://claims.example/roof2.png", bytes),
    ]);
    let classifier = ScriptedClassifier::new(vec![
        (
            "https://claims.example/roof1.png",
            verdict(Area::Roof, 3, true),
        ),
        (
            "https://claims.example/roof2.png",
            verdict(Area::Roof, 3, true),
        ),
    ]);

    let report = assess_claim(
        &urls(&[
            "https://claims.example/roof1.png",
            "https://claims.example/roof2.png",
        ]),
        &fetcher,
        &classifier,
        &PipelineOptions::default(),
    )
    .await;

    assert_eq!(report.source_images.clusters, 1);
    assert_eq!(report.areas.len(), 1);
    let roof = &report.areas[0];
    assert_eq!(roof.area, Area::Roof);
    assert!(
        roof.damage_confirmed,
        "two expanded images at severity 3 confirm the damage"
    );
    assert_eq!(roof.primary_peril, PrimaryPeril::Wind);
    assert_eq!(roof.count, 1);
    assert_eq!(roof.avg_severity, 3.0);
    assert_eq!(report.overall_damage_severity, 3.0);
    // Single representative: 0.9 * (0.7 + 0.3 * 0.1) = 0.657.
    assert_eq!(report.confidence, 0.66);
    assert!(!report.data_gaps.contains(&"No roof photos".to_string()));
    assert!(report.data_gaps.contains(&"No siding photos".to_string()));
    assert!(report.data_gaps.contains(&"Low photo count".to_string()));
}

#[tokio::test]
async fn distinct_photos_form_separate_areas() {
    let fetcher = FixtureFetcher::new(vec![
        ("https://claims.example/roof.png", ramp_png(300, 200)),
        ("https://claims.example/siding.png", flat_png(300, 300, 220)),
    ]);
    let classifier = ScriptedClassifier::new(vec![
        (
            "https://claims.example/roof.png",
            verdict(Area::Roof, 3, true),
        ),
        (
            "https://claims.example/siding.png",
            verdict(Area::Siding, 1, false),
        ),
    ]);

    let report = assess_claim(
        &urls(&[
            "https://claims.example/roof.png",
            "https://claims.example/siding.png",
        ]),
        &fetcher,
        &classifier,
        &PipelineOptions::default(),
    )
    .await;

    assert_eq!(report.source_images.clusters, 2);
    let listed: Vec<Area> = report.areas.iter().map(|entry| entry.area).collect();
    assert_eq!(listed, vec![Area::Roof, Area::Siding]);
    assert!(!report.data_gaps.contains(&"No roof photos".to_string()));
    assert!(!report.data_gaps.contains(&"No siding photos".to_string()));
    assert!(report.data_gaps.contains(&"No garage photos".to_string()));
}

#[tokio::test]
async fn failed_fetches_drop_images_without_failing_the_batch() {
    let fetcher = FixtureFetcher::new(vec![(
        "https://claims.example/good.png",
        ramp_png(300, 200),
    )]);
    let classifier = ScriptedClassifier::new(vec![(
        "https://claims.example/good.png",
        verdict(Area::Roof, 2, true),
    )]);

    let report = assess_claim(
        &urls(&[
            "https://claims.example/gone.png",
            "https://claims.example/good.png",
            "https://claims.example/also-gone.png",
        ]),
        &fetcher,
        &classifier,
        &PipelineOptions::default(),
    )
    .await;

    assert_eq!(report.source_images.total, 3);
    assert_eq!(report.source_images.analyzed, 1);
    assert_eq!(report.source_images.clusters, 1);
    assert_eq!(report.areas.len(), 1);
}

#[tokio::test]
async fn corrupt_bytes_drop_the_image() {
    let fetcher = FixtureFetcher::new(vec![(
        "https://claims.example/corrupt.png",
        b"definitely not a png".to_vec(),
    )]);
    let classifier = ScriptedClassifier::neutral();

    let report = assess_claim(
        &urls(&["https://claims.example/corrupt.png"]),
        &fetcher,
        &classifier,
        &PipelineOptions::default(),
    )
    .await;

    assert_eq!(report.source_images.analyzed, 0);
    assert_eq!(report.source_images.clusters, 0);
}

#[tokio::test]
async fn report_is_reproducible_for_identical_input_order() {
    let fetcher = FixtureFetcher::new(vec![
        ("https://claims.example/one.png", ramp_png(300, 200)),
        ("https://claims.example/two.png", flat_png(300, 300, 220)),
        ("https://claims.example/three.png", ramp_png(300, 200)),
    ]);
    let classifier = ScriptedClassifier::new(vec![
        (
            "https://claims.example/one.png",
            verdict(Area::Roof, 3, true),
        ),
        (
            "https://claims.example/two.png",
            verdict(Area::Garage, 1, false),
        ),
    ]);
    let batch = urls(&[
        "https://claims.example/one.png",
        "https://claims.example/two.png",
        "https://claims.example/three.png",
    ]);

    let first = assess_claim(&batch, &fetcher, &classifier, &PipelineOptions::default()).await;
    let second = assess_claim(&batch, &fetcher, &classifier, &PipelineOptions::default()).await;

    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}
