//! Feature extraction: colour-indicator ratios, mean HSV and gradient
//! texture statistics packed into a fixed 11-value vector.

use image::RgbImage;
use serde::Serialize;

use super::preprocess::{rgb_to_gray, rgb_to_hsv};

/// Number of values in a feature vector.
pub const FEATURE_COUNT: usize = 11;
/// Colour features (5 ratios + 3 channel means) come first.
pub const COLOR_FEATURE_COUNT: usize = 8;

/// A named HSV range that proxies a visible symptom. Bounds are inclusive.
#[derive(Debug, Clone, Copy)]
pub struct DiseaseIndicator {
    pub name: &'static str,
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

impl DiseaseIndicator {
    fn contains(&self, hsv: [u8; 3]) -> bool {
        (0..3).all(|i| hsv[i] >= self.lower[i] && hsv[i] <= self.upper[i])
    }
}

/// Order matters: it fixes the first five feature positions.
pub const DISEASE_INDICATORS: [DiseaseIndicator; 5] = [
    DiseaseIndicator { name: "Brown spots", lower: [10, 100, 20], upper: [20, 255, 200] },
    DiseaseIndicator { name: "Yellow spots", lower: [20, 100, 100], upper: [30, 255, 255] },
    DiseaseIndicator { name: "Black spots", lower: [0, 0, 0], upper: [180, 255, 30] },
    DiseaseIndicator { name: "White powder", lower: [0, 0, 200], upper: [180, 30, 255] },
    DiseaseIndicator { name: "Rotting", lower: [0, 50, 10], upper: [15, 255, 100] },
];

/// Feature vector consumed by the classifier.
///
/// Layout: `[brown, yellow, black, white, rotting, mean_h, mean_s, mean_v,
/// edge_mean, edge_std, edge_p90]`, every value in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn from_values(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    pub fn from_parts(color: [f64; COLOR_FEATURE_COUNT], texture: [f64; 3]) -> Self {
        let mut values = [0.0; FEATURE_COUNT];
        values[..COLOR_FEATURE_COUNT].copy_from_slice(&color);
        values[COLOR_FEATURE_COUNT..].copy_from_slice(&texture);
        Self(values)
    }

    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.0
    }

    /// The five disease-indicator ratios.
    pub fn indicator_ratios(&self) -> &[f64] {
        &self.0[..DISEASE_INDICATORS.len()]
    }

    pub fn brown_ratio(&self) -> f64 {
        self.0[0]
    }

    pub fn yellow_ratio(&self) -> f64 {
        self.0[1]
    }

    pub fn black_ratio(&self) -> f64 {
        self.0[2]
    }

    pub fn white_ratio(&self) -> f64 {
        self.0[3]
    }

    /// Mean hue / 255. The classifier reads it as a greenness proxy.
    pub fn mean_hue(&self) -> f64 {
        self.0[5]
    }

    pub fn mean_value(&self) -> f64 {
        self.0[7]
    }

    pub fn edge_mean(&self) -> f64 {
        self.0[8]
    }

    pub fn edge_std(&self) -> f64 {
        self.0[9]
    }

    pub fn edge_p90(&self) -> f64 {
        self.0[10]
    }
}

/// Extract the full feature vector. Pure: same image, same vector.
pub fn extract_features(img: &RgbImage) -> FeatureVector {
    FeatureVector::from_parts(extract_color_features(img), extract_texture_features(img))
}

/// Indicator ratios followed by the mean of each HSV channel over 255.
pub fn extract_color_features(img: &RgbImage) -> [f64; COLOR_FEATURE_COUNT] {
    let total = (img.width() as u64 * img.height() as u64).max(1) as f64;

    let mut hits = [0u64; 5];
    let mut channel_sums = [0u64; 3];

    for pixel in img.pixels() {
        let hsv = rgb_to_hsv(pixel);
        for (count, indicator) in hits.iter_mut().zip(DISEASE_INDICATORS.iter()) {
            if indicator.contains(hsv) {
                *count += 1;
            }
        }
        for (sum, v) in channel_sums.iter_mut().zip(hsv) {
            *sum += v as u64;
        }
    }

    let mut features = [0.0; COLOR_FEATURE_COUNT];
    for (slot, count) in features.iter_mut().zip(hits) {
        *slot = count as f64 / total;
    }
    for (i, sum) in channel_sums.into_iter().enumerate() {
        features[5 + i] = sum as f64 / total / 255.0;
    }
    features
}

/// Mean, standard deviation and 90th percentile of the Sobel gradient
/// magnitude, normalized by its maximum (left as-is when the max is zero).
pub fn extract_texture_features(img: &RgbImage) -> [f64; 3] {
    let gray = rgb_to_gray(img);
    let (w, h) = (gray.width() as usize, gray.height() as usize);
    if w == 0 || h == 0 {
        return [0.0; 3];
    }

    let px: Vec<f64> = gray.pixels().map(|p| p.0[0] as f64).collect();
    let mut magnitude = sobel_magnitude(&px, w, h);

    let max = magnitude.iter().cloned().fold(0.0, f64::max);
    if max > 0.0 {
        for m in magnitude.iter_mut() {
            *m /= max;
        }
    }

    let n = magnitude.len() as f64;
    let mean = magnitude.iter().sum::<f64>() / n;
    let variance = magnitude.iter().map(|m| (m - mean).powi(2)).sum::<f64>() / n;

    [mean, variance.sqrt(), percentile(&mut magnitude, 90.0)]
}

/// Reflect-101 border: `-1 → 1`, `len → len - 2`.
fn reflect_101(i: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let last = len as isize - 1;
    let mut i = i;
    if i < 0 {
        i = -i;
    }
    if i > last {
        i = 2 * last - i;
    }
    i.clamp(0, last) as usize
}

/// 3×3 Sobel gradient magnitude over a row-major grayscale raster.
fn sobel_magnitude(img: &[f64], w: usize, h: usize) -> Vec<f64> {
    let mut out = vec![0.0; w * h];
    for r in 0..h {
        for c in 0..w {
            let g = |dr: isize, dc: isize| -> f64 {
                let rr = reflect_101(r as isize + dr, h);
                let cc = reflect_101(c as isize + dc, w);
                img[rr * w + cc]
            };
            let gx = -g(-1, -1) + g(-1, 1) - 2.0 * g(0, -1) + 2.0 * g(0, 1) - g(1, -1) + g(1, 1);
            let gy = -g(-1, -1) - 2.0 * g(-1, 0) - g(-1, 1) + g(1, -1) + 2.0 * g(1, 0) + g(1, 1);
            out[r * w + c] = (gx * gx + gy * gy).sqrt();
        }
    }
    out
}

/// Percentile with linear interpolation between closest ranks. Sorts in place.
fn percentile(values: &mut [f64], pct: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let rank = (values.len() - 1) as f64 * pct / 100.0;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    values[lo] + (values[hi] - values[lo]) * frac
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::Rgb;

    pub(crate) const BROWN: [u8; 3] = [150, 90, 30];
    pub(crate) const LEAF_GREEN: [u8; 3] = [40, 120, 40];
    /// Hue 108 of 180: above the 0.4 "greenness" cut, outside every indicator.
    pub(crate) const HEALTHY_HUE: [u8; 3] = [0, 100, 255];

    /// Vertical stripes three pixels wide alternating between two colours.
    pub(crate) fn striped(a: [u8; 3], b: [u8; 3]) -> RgbImage {
        RgbImage::from_fn(224, 224, |x, _| if (x / 3) % 2 == 0 { Rgb(a) } else { Rgb(b) })
    }

    #[test]
    fn vector_has_eleven_values_in_unit_range() {
        let img = RgbImage::from_fn(224, 224, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x * y) % 256) as u8])
        });
        let features = extract_features(&img);
        assert_eq!(features.values().len(), FEATURE_COUNT);
        for v in features.values() {
            assert!((0.0..=1.0).contains(v), "feature out of range: {v}");
        }
    }

    #[test]
    fn extraction_is_deterministic() {
        let img = striped(BROWN, LEAF_GREEN);
        assert_eq!(extract_features(&img), extract_features(&img));
    }

    #[test]
    fn solid_brown_is_all_brown() {
        let img = RgbImage::from_pixel(224, 224, Rgb(BROWN));
        let color = extract_color_features(&img);
        assert_eq!(color[0], 1.0);
        assert_eq!(color[1], 0.0);
        assert_eq!(color[2], 0.0);
        assert_eq!(color[3], 0.0);
        assert_eq!(color[4], 0.0);
        assert!((color[5] - 15.0 / 255.0).abs() < 1e-12);
        assert!((color[7] - 150.0 / 255.0).abs() < 1e-12);
    }

    #[test]
    fn white_and_black_indicators() {
        let white = extract_color_features(&RgbImage::from_pixel(10, 10, Rgb([250, 250, 250])));
        assert_eq!(white[3], 1.0);
        let black = extract_color_features(&RgbImage::from_pixel(10, 10, Rgb([5, 5, 5])));
        assert_eq!(black[2], 1.0);
    }

    #[test]
    fn uniform_image_has_no_texture() {
        let img = RgbImage::from_pixel(224, 224, Rgb(LEAF_GREEN));
        assert_eq!(extract_texture_features(&img), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn stripes_produce_strong_texture_variation() {
        let texture = extract_texture_features(&striped(BROWN, LEAF_GREEN));
        assert!(texture[1] > 0.2, "edge std was {}", texture[1]);
        assert!(texture[2] > 0.9);
        assert!(texture[0] > 0.5 && texture[0] < 0.8);
    }

    #[test]
    fn healthy_hue_fixture_clears_indicators() {
        let features = extract_features(&RgbImage::from_pixel(224, 224, Rgb(HEALTHY_HUE)));
        assert!(features.indicator_ratios().iter().all(|r| *r == 0.0));
        assert!(features.mean_hue() > 0.4);
    }

    #[test]
    fn from_parts_keeps_color_before_texture() {
        let v = FeatureVector::from_parts([0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8], [0.9, 0.95, 1.0]);
        assert_eq!(v.brown_ratio(), 0.1);
        assert_eq!(v.mean_value(), 0.8);
        assert_eq!(v.edge_mean(), 0.9);
        assert_eq!(v.edge_p90(), 1.0);
    }

    #[test]
    fn reflect_101_borders() {
        assert_eq!(reflect_101(-1, 5), 1);
        assert_eq!(reflect_101(5, 5), 3);
        assert_eq!(reflect_101(2, 5), 2);
        assert_eq!(reflect_101(-1, 1), 0);
    }

    #[test]
    fn percentile_interpolates() {
        let mut v = vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
        assert!((percentile(&mut v, 90.0) - 9.0).abs() < 1e-12);
        let mut v = vec![0.0, 1.0];
        assert!((percentile(&mut v, 90.0) - 0.9).abs() < 1e-12);
    }
}
