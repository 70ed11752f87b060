//! Basic image usability scoring: darkness, blur, and uniformity checks.

use image::{DynamicImage, GenericImageView};

const MIN_AREA: u64 = 200 * 200;
const LOW_LIGHT_THRESHOLD: f64 = 60.0;
const BLUR_THRESHOLD: f64 = 12.0;
const VARIANCE_THRESHOLD: f64 = 300.0;

/// Usability verdict for a single photograph.
#[derive(Debug, Clone, PartialEq)]
pub struct QualityReport {
    /// Usability score in [0, 1].
    pub score: f64,
    pub is_low_light: bool,
    pub is_blurry: bool,
    pub low_variance: bool,
    /// Dark and featureless at the same time; almost certainly not a photo
    /// of the insured property.
    pub likely_unrelated: bool,
    pub notes: Vec<String>,
}

fn luminance(r: u8, g: u8, b: u8) -> f64 {
    0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b)
}

/// Score an image for usability.
///
/// Images smaller than 200x200 total area are scored 0.2 and flagged without
/// further analysis. Otherwise three sampled passes run over the pixels:
/// average luminance, a mean-gradient blur proxy, and intensity variance on a
/// coarser grid. Each triggered flag subtracts from a starting score of 1.0.
pub fn assess(img: &DynamicImage) -> QualityReport {
    let (width, height) = img.dimensions();

    if u64::from(width) * u64::from(height) < MIN_AREA {
        return QualityReport {
            score: 0.2,
            is_low_light: false,
            is_blurry: true,
            low_variance: false,
            likely_unrelated: true,
            notes: vec!["very low resolution".to_string()],
        };
    }

    let rgba = img.to_rgba8();
    let gray_at = |x: u32, y: u32| {
        let p = rgba.get_pixel(x, y);
        luminance(p[0], p[1], p[2])
    };

    // Average luminance over a downsampled grid; the stride keeps the
    // shorter dimension around 256 samples.
    let step = (width.min(height) / 256).max(1);
    let mut lum_sum = 0.0;
    let mut lum_count = 0u64;
    let mut y = 0;
    while y < height {
        let mut x = 0;
        while x < width {
            lum_sum += gray_at(x, y);
            lum_count += 1;
            x += step;
        }
        y += step;
    }
    let avg_lum = if lum_count > 0 {
        lum_sum / lum_count as f64
    } else {
        0.0
    };

    // Blur proxy: mean absolute gradient over the interior grid.
    let mut edge_sum = 0.0;
    let mut edge_count = 0u64;
    let mut y = 1;
    while y + 1 < height {
        let mut x = 1;
        while x + 1 < width {
            let gx = (gray_at(x + 1, y) - gray_at(x - 1, y)).abs();
            let gy = (gray_at(x, y + 1) - gray_at(x, y - 1)).abs();
            edge_sum += gx + gy;
            edge_count += 1;
            x += step;
        }
        y += step;
    }
    let edge_mean = if edge_count > 0 {
        edge_sum / edge_count as f64
    } else {
        0.0
    };

    // Uniformity: intensity variance against the average luminance, sampled
    // on a coarser grid.
    let var_step = (width.min(height) / 64).max(1);
    let mut variance_sum = 0.0;
    let mut variance_count = 0u64;
    let mut y = 0;
    while y < height {
        let mut x = 0;
        while x < width {
            let diff = gray_at(x, y) - avg_lum;
            variance_sum += diff * diff;
            variance_count += 1;
            x += var_step;
        }
        y += var_step;
    }
    let variance = if variance_count > 0 {
        variance_sum / variance_count as f64
    } else {
        0.0
    };

    let is_low_light = avg_lum < LOW_LIGHT_THRESHOLD;
    let is_blurry = edge_mean < BLUR_THRESHOLD;
    let low_variance = variance < VARIANCE_THRESHOLD;

    let mut notes = Vec::new();
    if is_low_light {
        notes.push("photo is very dark".to_string());
    }
    if is_blurry {
        notes.push("possible blur or out of focus".to_string());
    }
    if low_variance {
        notes.push("low texture, mostly uniform".to_string());
    }

    let mut score: f64 = 1.0;
    if is_low_light {
        score -= 0.4;
    }
    if is_blurry {
        score -= 0.4;
    }
    if low_variance {
        score -= 0.2;
    }
    let score = score.clamp(0.0, 1.0);

    QualityReport {
        score,
        is_low_light,
        is_blurry,
        low_variance,
        likely_unrelated: is_low_light && low_variance,
        notes,
    }
}
