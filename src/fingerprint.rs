//! Perceptual fingerprints and Hamming distance over hex-encoded hashes.
//!
//! Two independent 64-bit fingerprints per image: a difference hash over a
//! 9x8 grayscale grid and a DCT-based perceptual hash over a 32x32 grid.
//! Both are encoded as lowercase hex, zero-padded to 16 characters.

use std::f64::consts::PI;

use image::{imageops::FilterType, DynamicImage};

const DCT_SIZE: usize = 32;
const LOW_FREQ: usize = 8;

/// Sentinel distance returned when two fingerprints cannot be compared.
pub const MAX_DISTANCE: u32 = u32::MAX;

/// 64-bit difference hash: compares adjacent horizontal pixel intensities on
/// a 9x8 bilinear downscale, bit 1 where the left pixel is strictly darker.
/// Bits are packed row-major, first bit in the most significant position.
pub fn dhash64(img: &DynamicImage) -> String {
    let small = img
        .grayscale()
        .resize_exact(9, 8, FilterType::Triangle)
        .to_luma8();

    let mut bits = 0u64;
    for y in 0..8 {
        for x in 0..8 {
            let left = small.get_pixel(x, y)[0];
            let right = small.get_pixel(x + 1, y)[0];
            bits = (bits << 1) | u64::from(left < right);
        }
    }
    format!("{bits:016x}")
}

/// 64-bit perceptual hash from the low-frequency DCT coefficients of a 32x32
/// grayscale downscale.
///
/// Numeric policy: the separable DCT-II runs in f64 end-to-end, with the DC
/// basis scaled by 1/sqrt(2) and a final /4 factor. The top-left 8x8 block
/// minus the DC term gives 63 coefficients; the median is the element at
/// index 31 of their ascending sort, and a bit is set only when its
/// coefficient strictly exceeds the median. Bit 0 (the DC slot, the most
/// significant bit) is a reserved constant 0. Coefficients very close to the
/// median sit on a knife edge under a different numeric policy, so this
/// ordering and comparison must not change.
pub fn phash64(img: &DynamicImage) -> String {
    let small = img
        .grayscale()
        .resize_exact(DCT_SIZE as u32, DCT_SIZE as u32, FilterType::Triangle)
        .to_luma8();

    let n = DCT_SIZE;
    let mut mat = vec![0f64; n * n];
    for y in 0..n {
        for x in 0..n {
            mat[y * n + x] = f64::from(small.get_pixel(x as u32, y as u32)[0]);
        }
    }

    let mut cos_table = vec![0f64; n * n];
    for u in 0..n {
        for x in 0..n {
            cos_table[u * n + x] = ((2 * x + 1) as f64 * u as f64 * PI / (2.0 * n as f64)).cos();
        }
    }
    let mut scale = vec![1f64; n];
    scale[0] = 1.0 / 2f64.sqrt();

    // Row pass, then column pass over the row results.
    let mut rows = vec![0f64; n * n];
    for y in 0..n {
        for u in 0..n {
            let mut sum = 0.0;
            for x in 0..n {
                sum += mat[y * n + x] * cos_table[u * n + x];
            }
            rows[y * n + u] = sum * scale[u];
        }
    }
    let mut dct = vec![0f64; n * n];
    for v in 0..n {
        for u in 0..n {
            let mut sum = 0.0;
            for y in 0..n {
                sum += rows[y * n + u] * cos_table[v * n + y];
            }
            dct[v * n + u] = sum * scale[v] / 4.0;
        }
    }

    // Low-frequency block, skipping the DC term at (0,0).
    let mut low = Vec::with_capacity(LOW_FREQ * LOW_FREQ - 1);
    for v in 0..LOW_FREQ {
        for u in 0..LOW_FREQ {
            if u == 0 && v == 0 {
                continue;
            }
            low.push(dct[v * n + u]);
        }
    }

    let mut sorted = low.clone();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let median = sorted[sorted.len() / 2];

    // The implicit leading zero is the reserved DC bit.
    let mut bits = 0u64;
    for &coeff in &low {
        bits = (bits << 1) | u64::from(coeff > median);
    }
    format!("{bits:016x}")
}

/// Hamming distance between two hex-encoded fingerprints of equal length.
/// Returns [`MAX_DISTANCE`] when the encodings differ in length and cannot
/// be compared bit-for-bit.
pub fn hamming_hex(a: &str, b: &str) -> u32 {
    if a.len() != b.len() {
        return MAX_DISTANCE;
    }
    match (u64::from_str_radix(a, 16), u64::from_str_radix(b, 16)) {
        (Ok(x), Ok(y)) => (x ^ y).count_ones(),
        _ => MAX_DISTANCE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgba, RgbaImage};

    fn flat_image(width: u32, height: u32, value: u8) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            width,
            height,
            Rgba([value, value, value, 255]),
        ))
    }

    fn ramp_image(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |x, _| {
            let value = (x * 255 / width.max(1)) as u8;
            Rgba([value, value, value, 255])
        }))
    }

    #[test]
    fn dhash_is_deterministic() {
        let img = ramp_image(300, 200);
        assert_eq!(dhash64(&img), dhash64(&img));
    }

    #[test]
    fn phash_is_deterministic() {
        let img = ramp_image(300, 200);
        assert_eq!(phash64(&img), phash64(&img));
    }

    #[test]
    fn hashes_are_sixteen_lowercase_hex_chars() {
        let img = ramp_image(64, 64);
        for hash in [dhash64(&img), phash64(&img)] {
            assert_eq!(hash.len(), 16);
            assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
            assert_eq!(hash, hash.to_lowercase());
        }
    }

    #[test]
    fn dhash_of_flat_image_is_zero() {
        let img = flat_image(100, 100, 128);
        assert_eq!(dhash64(&img), "0000000000000000");
    }

    #[test]
    fn dhash_of_horizontal_ramp_sets_every_bit() {
        // Strictly increasing left to right in every row.
        let img = ramp_image(900, 80);
        assert_eq!(dhash64(&img), "ffffffffffffffff");
    }

    #[test]
    fn phash_reserves_the_dc_bit() {
        let img = ramp_image(300, 200);
        let bits = u64::from_str_radix(&phash64(&img), 16).unwrap();
        assert_eq!(bits >> 63, 0, "most significant bit is the reserved DC slot");
    }

    #[test]
    fn hamming_of_identical_hashes_is_zero() {
        let img = ramp_image(120, 90);
        let hash = phash64(&img);
        assert_eq!(hamming_hex(&hash, &hash), 0);
    }

    #[test]
    fn hamming_is_symmetric() {
        let a = dhash64(&ramp_image(300, 200));
        let b = dhash64(&flat_image(300, 200, 40));
        assert_eq!(hamming_hex(&a, &b), hamming_hex(&b, &a));
    }

    #[test]
    fn hamming_counts_differing_bits() {
        assert_eq!(hamming_hex("0000000000000000", "0000000000000001"), 1);
        assert_eq!(hamming_hex("0000000000000000", "ffffffffffffffff"), 64);
        assert_eq!(hamming_hex("00000000000000f0", "000000000000000f"), 8);
    }

    #[test]
    fn hamming_returns_sentinel_on_length_mismatch() {
        assert_eq!(hamming_hex("abcd", "abcdef"), MAX_DISTANCE);
    }

    #[test]
    fn distinct_content_produces_distant_hashes() {
        let ramp = ramp_image(300, 200);
        let flat = flat_image(300, 200, 40);
        assert!(hamming_hex(&dhash64(&ramp), &dhash64(&flat)) > 8);
    }
}
