//! Image decoding and colour-space helpers for feature extraction.
//!
//! Conversions follow the 8-bit OpenCV conventions the thresholds were
//! tuned against: hue in `[0, 180)`, saturation and value in `[0, 255]`,
//! BT.601 luma for grayscale.

use std::path::Path;

use image::{GenericImageView, GrayImage, Luma, Rgb, RgbImage};
use tracing::debug;

use super::DetectionError;

/// Canonical square edge the extractor works on.
pub const CANONICAL_SIZE: u32 = 224;

/// Read, decode and normalize an image file to a 224×224 RGB grid.
pub fn load_image(path: &Path) -> Result<RgbImage, DetectionError> {
    let bytes = std::fs::read(path).map_err(|source| DetectionError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    decode_image(&bytes)
}

/// Decode in-memory bytes and normalize to a 224×224 RGB grid.
pub fn decode_image(bytes: &[u8]) -> Result<RgbImage, DetectionError> {
    let img = image::load_from_memory(bytes).map_err(|e| DetectionError::Decode(e.to_string()))?;

    let (w, h) = img.dimensions();
    if w == 0 || h == 0 {
        return Err(DetectionError::EmptyImage);
    }

    let rgb = img.to_rgb8();
    if w == CANONICAL_SIZE && h == CANONICAL_SIZE {
        return Ok(rgb);
    }

    debug!(width = w, height = h, "Resizing image to canonical size");
    Ok(resize_linear(&rgb, CANONICAL_SIZE, CANONICAL_SIZE))
}

/// Bilinear resize that samples only the 2×2 source neighbourhood, with
/// pixel centres aligned and edge coordinates clamped. No antialiasing
/// kernel is applied when downscaling.
pub fn resize_linear(src: &RgbImage, width: u32, height: u32) -> RgbImage {
    let x_taps: Vec<(u32, u32, f32)> = (0..width).map(|d| linear_tap(d, src.width(), width)).collect();
    let y_taps: Vec<(u32, u32, f32)> = (0..height).map(|d| linear_tap(d, src.height(), height)).collect();

    RgbImage::from_fn(width, height, |x, y| {
        let (x0, x1, fx) = x_taps[x as usize];
        let (y0, y1, fy) = y_taps[y as usize];
        let (p00, p10) = (src.get_pixel(x0, y0).0, src.get_pixel(x1, y0).0);
        let (p01, p11) = (src.get_pixel(x0, y1).0, src.get_pixel(x1, y1).0);

        let mut out = [0u8; 3];
        for c in 0..3 {
            let top = f32::from(p00[c]) * (1.0 - fx) + f32::from(p10[c]) * fx;
            let bottom = f32::from(p01[c]) * (1.0 - fx) + f32::from(p11[c]) * fx;
            out[c] = (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8;
        }
        Rgb(out)
    })
}

/// Source indices and weight of the second one for destination index `d`.
fn linear_tap(d: u32, src_len: u32, dst_len: u32) -> (u32, u32, f32) {
    let scale = src_len as f32 / dst_len as f32;
    let pos = (d as f32 + 0.5) * scale - 0.5;
    let last = src_len.saturating_sub(1);

    if pos <= 0.0 {
        return (0, 0, 0.0);
    }
    let i0 = pos.floor() as u32;
    if i0 >= last {
        return (last, last, 0.0);
    }
    (i0, i0 + 1, pos - i0 as f32)
}

/// Convert one RGB pixel to 8-bit HSV (`H` in `[0, 180)`).
pub fn rgb_to_hsv(pixel: &Rgb<u8>) -> [u8; 3] {
    let [r, g, b] = pixel.0.map(f32::from);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let s = if max > 0.0 { 255.0 * delta / max } else { 0.0 };

    let mut h = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * (g - b) / delta
    } else if max == g {
        120.0 + 60.0 * (b - r) / delta
    } else {
        240.0 + 60.0 * (r - g) / delta
    };
    if h < 0.0 {
        h += 360.0;
    }

    let mut h8 = (h / 2.0).round() as u16;
    if h8 >= 180 {
        h8 -= 180;
    }

    [h8 as u8, s.round() as u8, max as u8]
}

/// Convert an RGB image to grayscale using ITU-R BT.601 luminance.
pub fn rgb_to_gray(rgb: &RgbImage) -> GrayImage {
    let (w, h) = rgb.dimensions();
    let mut gray = GrayImage::new(w, h);
    for (x, y, p) in rgb.enumerate_pixels() {
        let luma = 0.299 * p.0[0] as f32 + 0.587 * p.0[1] as f32 + 0.114 * p.0[2] as f32;
        gray.put_pixel(x, y, Luma([luma.round().min(255.0) as u8]));
    }
    gray
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageOutputFormat};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb(color));
        let mut cursor = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut cursor, ImageOutputFormat::Png)
            .unwrap();
        cursor.into_inner()
    }

    #[test]
    fn decode_resizes_to_canonical() {
        let img = decode_image(&png_bytes(640, 480, [10, 200, 30])).unwrap();
        assert_eq!(img.dimensions(), (224, 224));
    }

    #[test]
    fn decode_keeps_canonical_pixels_untouched() {
        let img = decode_image(&png_bytes(224, 224, [12, 34, 56])).unwrap();
        assert_eq!(img.get_pixel(100, 100).0, [12, 34, 56]);
    }

    #[test]
    fn downscale_samples_two_by_two_neighbourhood() {
        // 4× horizontal shrink: each output column centres between source
        // columns 4k+1 and 4k+2, so only those two contribute.
        let src = RgbImage::from_fn(896, 224, |x, _| {
            if x % 4 == 1 || x % 4 == 2 {
                Rgb([255, 255, 255])
            } else {
                Rgb([0, 0, 0])
            }
        });
        let out = resize_linear(&src, 224, 224);
        assert_eq!(out.get_pixel(0, 0).0, [255, 255, 255]);
        assert_eq!(out.get_pixel(111, 100).0, [255, 255, 255]);
        assert_eq!(out.get_pixel(223, 223).0, [255, 255, 255]);
    }

    #[test]
    fn upscale_interpolates_and_clamps_edges() {
        let src = RgbImage::from_fn(2, 1, |x, _| if x == 0 { Rgb([0, 0, 0]) } else { Rgb([200, 200, 200]) });
        let out = resize_linear(&src, 4, 1);
        // centres map to -0.25, 0.25, 0.75, 1.25 in source space
        let row: Vec<u8> = (0..4).map(|x| out.get_pixel(x, 0).0[0]).collect();
        assert_eq!(row, vec![0, 50, 150, 200]);
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let err = decode_image(b"definitely not an image").unwrap_err();
        assert!(matches!(err, DetectionError::Decode(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_image(Path::new("/nonexistent/leaf.png")).unwrap_err();
        assert!(matches!(err, DetectionError::Io { .. }));
    }

    #[test]
    fn load_reads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leaf.png");
        std::fs::write(&path, png_bytes(50, 80, [0, 128, 0])).unwrap();
        let img = load_image(&path).unwrap();
        assert_eq!(img.dimensions(), (224, 224));
    }

    #[test]
    fn hsv_primary_colours() {
        assert_eq!(rgb_to_hsv(&Rgb([255, 0, 0])), [0, 255, 255]);
        assert_eq!(rgb_to_hsv(&Rgb([0, 255, 0])), [60, 255, 255]);
        assert_eq!(rgb_to_hsv(&Rgb([0, 0, 255])), [120, 255, 255]);
    }

    #[test]
    fn hsv_achromatic() {
        assert_eq!(rgb_to_hsv(&Rgb([255, 255, 255])), [0, 0, 255]);
        assert_eq!(rgb_to_hsv(&Rgb([0, 0, 0])), [0, 0, 0]);
        assert_eq!(rgb_to_hsv(&Rgb([128, 128, 128])), [0, 0, 128]);
    }

    #[test]
    fn hsv_brown_leaf_spot() {
        // 30° hue → 15 in the halved 8-bit scale
        assert_eq!(rgb_to_hsv(&Rgb([150, 90, 30])), [15, 204, 150]);
    }

    #[test]
    fn hsv_hue_near_full_circle_wraps_to_zero() {
        // 359.x° rounds to 180 and must wrap
        let [h, _, _] = rgb_to_hsv(&Rgb([255, 0, 1]));
        assert!(h < 180);
    }

    #[test]
    fn gray_uses_bt601_weights() {
        let img = RgbImage::from_pixel(2, 2, Rgb([150, 90, 30]));
        let gray = rgb_to_gray(&img);
        // 0.299*150 + 0.587*90 + 0.114*30 = 101.1
        assert_eq!(gray.get_pixel(0, 0).0[0], 101);
    }
}
