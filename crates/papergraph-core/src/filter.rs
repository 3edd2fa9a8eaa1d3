use std::path::Path;

use image::GrayImage;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("Image decode failed: {0}")]
    Decode(#[from] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type FilterResult<T> = Result<T, FilterError>;

/// Default threshold for [`PixelCountScorer`], tuned against full-page
/// renders where placeholder images come out tiny.
pub const DEFAULT_PIXEL_THRESHOLD: f64 = 5000.0;

/// Default threshold for [`HistogramEntropyScorer`], in bits. A blank or
/// near-blank render sits well under one bit.
pub const DEFAULT_ENTROPY_THRESHOLD: f64 = 3.0;

/// A scalar signal over grayscale pixel data, monotonic with how visually
/// busy the image is. Higher means more worth keeping.
pub trait RelevanceScorer: Send + Sync {
    fn name(&self) -> &'static str;

    fn score(&self, image: &GrayImage) -> f64;
}

/// Scores by raw pixel count. Crude, but cheap, and it cleanly separates
/// thumbnail-sized placeholder renders from real page images.
pub struct PixelCountScorer;

impl RelevanceScorer for PixelCountScorer {
    fn name(&self) -> &'static str {
        "pixel_count"
    }

    fn score(&self, image: &GrayImage) -> f64 {
        f64::from(image.width()) * f64::from(image.height())
    }
}

/// Scores by the Shannon entropy of the 256-bin intensity histogram.
/// A uniform image scores 0; a noisy figure-dense page approaches 8.
pub struct HistogramEntropyScorer;

impl RelevanceScorer for HistogramEntropyScorer {
    fn name(&self) -> &'static str {
        "histogram_entropy"
    }

    fn score(&self, image: &GrayImage) -> f64 {
        let mut histogram = [0u64; 256];
        for pixel in image.pixels() {
            histogram[pixel.0[0] as usize] += 1;
        }

        let total = image.pixels().len() as f64;
        if total == 0.0 {
            return 0.0;
        }

        histogram
            .iter()
            .filter(|&&count| count > 0)
            .map(|&count| {
                let p = count as f64 / total;
                -p * p.log2()
            })
            .sum()
    }
}

/// Outcome of scoring one candidate image against the threshold.
#[derive(Debug, Clone, Copy)]
pub struct FilterDecision {
    pub score: f64,
    pub accepted: bool,
}

/// Threshold filter over a pluggable relevance signal.
pub struct RelevanceFilter {
    scorer: Box<dyn RelevanceScorer>,
    threshold: f64,
}

impl RelevanceFilter {
    #[must_use]
    pub fn new(scorer: Box<dyn RelevanceScorer>, threshold: f64) -> Self {
        Self { scorer, threshold }
    }

    #[must_use]
    pub fn pixel_count(threshold: f64) -> Self {
        Self::new(Box::new(PixelCountScorer), threshold)
    }

    #[must_use]
    pub fn histogram_entropy(threshold: f64) -> Self {
        Self::new(Box::new(HistogramEntropyScorer), threshold)
    }

    #[must_use]
    pub fn scorer_name(&self) -> &'static str {
        self.scorer.name()
    }

    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Load the image as 8-bit grayscale and score it. Accept iff the
    /// signal reaches the threshold. Decode failures are the caller's to
    /// treat as a reject; they never abort a run.
    pub fn evaluate(&self, path: &Path) -> FilterResult<FilterDecision> {
        let image = image::open(path)?.to_luma8();
        let score = self.scorer.score(&image);

        Ok(FilterDecision {
            score,
            accepted: score >= self.threshold,
        })
    }
}

impl Default for RelevanceFilter {
    fn default() -> Self {
        Self::pixel_count(DEFAULT_PIXEL_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn uniform_image(side: u32, value: u8) -> GrayImage {
        GrayImage::from_pixel(side, side, Luma([value]))
    }

    fn checkerboard_image(side: u32) -> GrayImage {
        GrayImage::from_fn(side, side, |x, y| {
            if (x + y) % 2 == 0 {
                Luma([0])
            } else {
                Luma([255])
            }
        })
    }

    #[test]
    fn test_entropy_monotonic_with_busyness() {
        let scorer = HistogramEntropyScorer;

        let flat = scorer.score(&uniform_image(64, 128));
        let busy = scorer.score(&checkerboard_image(64));

        assert!(flat < busy);
        assert!((flat - 0.0).abs() < f64::EPSILON);
        assert!((busy - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_pixel_count_scorer() {
        let scorer = PixelCountScorer;

        assert!((scorer.score(&uniform_image(10, 0)) - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_threshold_decision() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.png");
        checkerboard_image(100).save(&path).unwrap();

        let accepting = RelevanceFilter::pixel_count(5000.0);
        let decision = accepting.evaluate(&path).unwrap();
        assert!(decision.accepted);
        assert!((decision.score - 10000.0).abs() < f64::EPSILON);

        let rejecting = RelevanceFilter::pixel_count(20_000.0);
        assert!(!rejecting.evaluate(&path).unwrap().accepted);
    }

    #[test]
    fn test_entropy_filter_rejects_blank_page() {
        let dir = tempfile::tempdir().unwrap();

        let blank = dir.path().join("blank.png");
        uniform_image(100, 255).save(&blank).unwrap();

        let busy = dir.path().join("busy.png");
        checkerboard_image(100).save(&busy).unwrap();

        let filter = RelevanceFilter::histogram_entropy(0.5);
        assert!(!filter.evaluate(&blank).unwrap().accepted);
        assert!(filter.evaluate(&busy).unwrap().accepted);
    }

    #[test]
    fn test_unreadable_image_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrupt.png");
        std::fs::write(&path, b"not a png").unwrap();

        let filter = RelevanceFilter::default();
        assert!(filter.evaluate(&path).is_err());

        assert!(filter.evaluate(&dir.path().join("missing.png")).is_err());
    }
}
