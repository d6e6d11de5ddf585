//! The 11-number descriptor computed from a decoded image.
//!
//! Every metric is a pure, deterministic function of the pixel contents:
//! the same buffer always produces the same vector, bit for bit.

use image::{GrayImage, ImageBuffer, Luma};
use imageproc::edges::canny;
use imageproc::filter::filter3x3;
use serde::{Deserialize, Serialize};

use crate::buffer::BgrImage;

/// Hysteresis thresholds for edge detection, on the 8-bit grayscale range.
const CANNY_LOW: f32 = 100.0;
const CANNY_HIGH: f32 = 200.0;

/// Additive smoothing inside the entropy log term. Keeps empty histogram
/// bins from producing log(0).
const ENTROPY_EPSILON: f64 = 1e-7;

/// Four-neighbor Laplacian kernel.
const LAPLACIAN_KERNEL: [f32; 9] = [0.0, 1.0, 0.0, 1.0, -4.0, 1.0, 0.0, 1.0, 0.0];

/// Fixed-order image descriptor consumed by the classifier.
///
/// The canonical order is the field order below; [`FeatureVector::to_array`]
/// yields exactly that order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Variance of the Laplacian response. Higher means more high-frequency
    /// detail, a proxy for focus quality.
    pub sharpness: f64,
    /// Mean grayscale value.
    pub brightness: f64,
    /// Standard deviation of grayscale values.
    pub noise: f64,
    pub mean_blue: f64,
    pub mean_green: f64,
    pub mean_red: f64,
    pub std_blue: f64,
    pub std_green: f64,
    pub std_red: f64,
    /// Shannon entropy of the 256-bin grayscale histogram, in bits.
    pub entropy: f64,
    /// Fraction of pixels the edge detector marks as edges.
    pub edge_density: f64,
}

impl FeatureVector {
    /// Number of features in the descriptor.
    pub const LEN: usize = 11;

    /// The descriptor in its canonical order.
    pub fn to_array(&self) -> [f64; Self::LEN] {
        [
            self.sharpness,
            self.brightness,
            self.noise,
            self.mean_blue,
            self.mean_green,
            self.mean_red,
            self.std_blue,
            self.std_green,
            self.std_red,
            self.entropy,
            self.edge_density,
        ]
    }

    /// True when every component is a finite number.
    pub fn is_finite(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite())
    }
}

/// Compute the descriptor for a decoded image.
pub fn extract_features(img: &BgrImage) -> FeatureVector {
    let gray = to_grayscale(img);

    let sharpness = laplacian_variance(&gray);
    let (brightness, noise) = mean_std(gray.as_raw());

    let (mean_blue, std_blue) = channel_mean_std(img, 0);
    let (mean_green, std_green) = channel_mean_std(img, 1);
    let (mean_red, std_red) = channel_mean_std(img, 2);

    let entropy = histogram_entropy(&gray);
    let edge_density = edge_fraction(&gray);

    FeatureVector {
        sharpness,
        brightness,
        noise,
        mean_blue,
        mean_green,
        mean_red,
        std_blue,
        std_green,
        std_red,
        entropy,
        edge_density,
    }
}

/// Rec. 601 luma of the blue-green-red buffer, rounded to 8 bits.
fn to_grayscale(img: &BgrImage) -> GrayImage {
    let mut luma = Vec::with_capacity(img.pixel_count());
    for px in img.pixels() {
        let (b, g, r) = (px[0] as f64, px[1] as f64, px[2] as f64);
        let y = 0.299 * r + 0.587 * g + 0.114 * b;
        luma.push(y.round().min(255.0) as u8);
    }
    GrayImage::from_raw(img.width(), img.height(), luma).expect("luma buffer matches dimensions")
}

/// Population mean and standard deviation of a byte slice.
fn mean_std(samples: &[u8]) -> (f64, f64) {
    let n = samples.len() as f64;
    let mean = samples.iter().map(|&v| v as f64).sum::<f64>() / n;
    let var = samples
        .iter()
        .map(|&v| {
            let d = v as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    (mean, var.sqrt())
}

/// Population mean and standard deviation of one color channel.
/// Channel index 0 is blue, 1 is green, 2 is red.
fn channel_mean_std(img: &BgrImage, channel: usize) -> (f64, f64) {
    let n = img.pixel_count() as f64;
    let mut sum = 0.0;
    for px in img.pixels() {
        sum += px[channel] as f64;
    }
    let mean = sum / n;

    let mut var = 0.0;
    for px in img.pixels() {
        let d = px[channel] as f64 - mean;
        var += d * d;
    }
    (mean, (var / n).sqrt())
}

/// Variance of the four-neighbor Laplacian response over the image.
fn laplacian_variance(gray: &GrayImage) -> f64 {
    let gray_f32: ImageBuffer<Luma<f32>, Vec<f32>> = ImageBuffer::from_raw(
        gray.width(),
        gray.height(),
        gray.as_raw().iter().map(|&v| v as f32).collect(),
    )
    .expect("luma buffer matches dimensions");

    let response: Vec<f32> = filter3x3(&gray_f32, &LAPLACIAN_KERNEL).into_raw();
    let n = response.len() as f64;
    let mean = response.iter().map(|&v| v as f64).sum::<f64>() / n;
    response
        .iter()
        .map(|&v| {
            let d = v as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n
}

/// Shannon entropy of the normalized 256-bin grayscale histogram.
fn histogram_entropy(gray: &GrayImage) -> f64 {
    let mut counts = [0u64; 256];
    for &v in gray.as_raw() {
        counts[v as usize] += 1;
    }
    let total = gray.as_raw().len() as f64;
    -counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total;
            p * (p + ENTROPY_EPSILON).log2()
        })
        .sum::<f64>()
}

/// Fraction of pixels marked by dual-threshold hysteresis edge detection.
fn edge_fraction(gray: &GrayImage) -> f64 {
    let edges = canny(gray, CANNY_LOW, CANNY_HIGH);
    let marked = edges.as_raw().iter().filter(|&&v| v > 0).count();
    marked as f64 / edges.as_raw().len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, bgr: [u8; 3]) -> BgrImage {
        let mut data = Vec::with_capacity(width as usize * height as usize * 3);
        for _ in 0..width * height {
            data.extend_from_slice(&bgr);
        }
        BgrImage::from_bgr(width, height, data).unwrap()
    }

    fn gradient(width: u32, height: u32) -> BgrImage {
        let mut data = Vec::with_capacity(width as usize * height as usize * 3);
        for y in 0..height {
            for x in 0..width {
                data.push(((x * 7 + y) % 256) as u8);
                data.push(((x * 3 + y * 5) % 256) as u8);
                data.push(((x + y * 11) % 256) as u8);
            }
        }
        BgrImage::from_bgr(width, height, data).unwrap()
    }

    #[test]
    fn test_solid_image_features() {
        let features = extract_features(&solid(32, 32, [128, 128, 128]));

        assert_eq!(features.brightness, 128.0);
        assert_eq!(features.noise, 0.0);
        assert_eq!(features.sharpness, 0.0);
        assert_eq!(features.edge_density, 0.0);
        assert_eq!(features.mean_blue, 128.0);
        assert_eq!(features.mean_green, 128.0);
        assert_eq!(features.mean_red, 128.0);
        assert_eq!(features.std_blue, 0.0);
        // Single occupied histogram bin: entropy collapses to ~0
        assert!(features.entropy.abs() < 1e-5);
        assert!(features.is_finite());
    }

    #[test]
    fn test_channel_stats_follow_bgr_order() {
        let features = extract_features(&solid(16, 16, [40, 120, 200]));

        assert_eq!(features.mean_blue, 40.0);
        assert_eq!(features.mean_green, 120.0);
        assert_eq!(features.mean_red, 200.0);
        assert_eq!(features.std_green, 0.0);

        // Luma of (r=200, g=120, b=40) is 134.8, rounded to 135
        assert_eq!(features.brightness, 135.0);
    }

    #[test]
    fn test_two_tone_image() {
        // Top half black, bottom half white
        let mut data = Vec::new();
        for y in 0..16u32 {
            let v = if y < 8 { 0u8 } else { 255u8 };
            for _ in 0..16u32 {
                data.extend_from_slice(&[v, v, v]);
            }
        }
        let img = BgrImage::from_bgr(16, 16, data).unwrap();
        let features = extract_features(&img);

        assert_eq!(features.brightness, 127.5);
        assert_eq!(features.noise, 127.5);
        // Two equally likely bins carry one bit of entropy
        assert!((features.entropy - 1.0).abs() < 1e-4);
        // The black/white boundary produces both Laplacian response and edges
        assert!(features.sharpness > 0.0);
        assert!(features.edge_density > 0.0);
        assert!(features.is_finite());
    }

    #[test]
    fn test_descriptor_has_11_finite_values() {
        let features = extract_features(&gradient(48, 32));
        let values = features.to_array();
        assert_eq!(values.len(), FeatureVector::LEN);
        assert!(values.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let img = gradient(64, 48);
        let first = extract_features(&img);
        let second = extract_features(&img);
        assert_eq!(first.to_array(), second.to_array());
    }
}
