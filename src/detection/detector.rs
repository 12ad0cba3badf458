//! Detection entry point.
//!
//! Only file-level I/O errors propagate. Anything that goes wrong after
//! the bytes are read (decode failure, empty image) is logged and
//! recovered with a random sample prediction.

use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use super::classifier::{classify, DetectionResult, DetectionSource};
use super::features::{extract_features, FeatureVector};
use super::preprocess::decode_image;
use super::rng::{RandomSource, RngSource};
use super::samples::SampleTable;
use super::DetectionError;

pub struct DiseaseDetector {
    sample_sources: Vec<PathBuf>,
}

impl DiseaseDetector {
    /// `sample_sources` are sample-table candidates, highest priority first.
    pub fn new(sample_sources: Vec<PathBuf>) -> Self {
        Self { sample_sources }
    }

    /// Detect with the thread-local random generator.
    pub fn detect(&self, image_path: &Path) -> Result<DetectionResult, DetectionError> {
        self.detect_with(image_path, &mut RngSource::thread())
    }

    pub fn detect_with(
        &self,
        image_path: &Path,
        rng: &mut dyn RandomSource,
    ) -> Result<DetectionResult, DetectionError> {
        let bytes = std::fs::read(image_path).map_err(|source| DetectionError::Io {
            path: image_path.to_path_buf(),
            source,
        })?;

        let features = match features_from_bytes(&bytes) {
            Ok(features) => features,
            Err(e) => {
                error!(path = %image_path.display(), error = %e, "Error detecting disease");
                let sample = SampleTable::load(&self.sample_sources).pick(rng);
                warn!(
                    label = %sample.label,
                    confidence = sample.confidence,
                    "Using fallback prediction due to error"
                );
                return Ok(DetectionResult {
                    label: sample.label,
                    confidence: sample.confidence,
                    source: DetectionSource::Fallback,
                });
            }
        };

        let samples = SampleTable::load(&self.sample_sources);
        let result = classify(&features, &samples, rng);

        match result.source {
            DetectionSource::Sample => info!(
                label = %result.label,
                confidence = result.confidence,
                "Using sample prediction"
            ),
            _ => info!(
                label = %result.label,
                confidence = result.confidence,
                "Classified using heuristic features"
            ),
        }
        Ok(result)
    }
}

fn features_from_bytes(bytes: &[u8]) -> Result<FeatureVector, DetectionError> {
    let img = decode_image(bytes)?;
    Ok(extract_features(&img))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::features::tests::{striped, BROWN, HEALTHY_HUE, LEAF_GREEN};
    use crate::detection::labels::ClassLabel;
    use crate::detection::rng::ScriptedRandom;
    use image::{Rgb, RgbImage};

    fn detector_without_samples(dir: &Path) -> DiseaseDetector {
        DiseaseDetector::new(vec![dir.join("no_samples_here.json")])
    }

    fn save(img: &RgbImage, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        img.save(&path).unwrap();
        path
    }

    #[test]
    fn missing_file_propagates_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let detector = detector_without_samples(dir.path());
        let err = detector.detect(&dir.path().join("absent.png")).unwrap_err();
        assert!(matches!(err, DetectionError::Io { .. }));
    }

    #[test]
    fn corrupt_image_recovers_with_sample() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"\x89PNG but not really").unwrap();

        let detector = detector_without_samples(dir.path());
        let mut rng = ScriptedRandom::new(vec![0.0]);
        let result = detector.detect_with(&path, &mut rng).unwrap();

        assert_eq!(result.source, DetectionSource::Fallback);
        assert_eq!(result.label, ClassLabel::AppleAppleScab);
        assert_eq!(result.confidence, 0.904);
    }

    #[test]
    fn healthy_looking_leaf_gets_healthy_label() {
        let dir = tempfile::tempdir().unwrap();
        let path = save(&RgbImage::from_pixel(224, 224, Rgb(HEALTHY_HUE)), dir.path(), "leaf.png");

        let detector = detector_without_samples(dir.path());
        // no substitution, first healthy label, midpoint confidence
        let mut rng = ScriptedRandom::new(vec![0.9, 0.0, 0.5]);
        let result = detector.detect_with(&path, &mut rng).unwrap();

        assert_eq!(result.source, DetectionSource::Heuristic);
        assert_eq!(result.label, ClassLabel::AppleHealthy);
        assert!((result.confidence - 0.825).abs() < 1e-9);
    }

    #[test]
    fn brown_rough_leaf_gets_apple_disease() {
        let dir = tempfile::tempdir().unwrap();
        let path = save(&striped(BROWN, LEAF_GREEN), dir.path(), "spotty.png");

        let detector = detector_without_samples(dir.path());
        let mut rng = ScriptedRandom::new(vec![0.9, 0.9, 0.0]);
        let result = detector.detect_with(&path, &mut rng).unwrap();

        assert_eq!(result.label, ClassLabel::AppleBlackRot);
        assert!((result.confidence - 0.6).abs() < 1e-9);
    }

    #[test]
    fn substitution_uses_loaded_sample_file() {
        let dir = tempfile::tempdir().unwrap();
        let samples = dir.path().join("detection_results.json");
        std::fs::write(&samples, r#"[{"prediction": "Squash_Powdery_mildew", "confidence": 0.71}]"#)
            .unwrap();
        let path = save(&RgbImage::from_pixel(64, 64, Rgb(LEAF_GREEN)), dir.path(), "leaf.png");

        let detector = DiseaseDetector::new(vec![samples]);
        let mut rng = ScriptedRandom::new(vec![0.1, 0.0]);
        let result = detector.detect_with(&path, &mut rng).unwrap();

        assert_eq!(result.source, DetectionSource::Sample);
        assert_eq!(result.label, ClassLabel::SquashPowderyMildew);
        assert_eq!(result.confidence, 0.71);
    }

    #[test]
    fn thread_rng_results_respect_invariants() {
        let dir = tempfile::tempdir().unwrap();
        let path = save(&striped(BROWN, LEAF_GREEN), dir.path(), "leaf.png");
        let detector = detector_without_samples(dir.path());
        for _ in 0..20 {
            let result = detector.detect(&path).unwrap();
            assert!(ClassLabel::ALL.contains(&result.label));
            assert!(result.confidence > 0.0 && result.confidence < 1.0);
        }
    }
}
