//! Threshold classifier over the 11-value feature vector.
//!
//! Rules are evaluated in order and the first match wins. Randomness
//! (tie-breaks, the sample blend, confidence) is drawn from the injected
//! `RandomSource`.

use serde::Serialize;

use super::features::FeatureVector;
use super::labels::{ClassLabel, HEALTHY_LABELS};
use super::rng::RandomSource;
use super::samples::SampleTable;

/// Probability of replacing the heuristic result with a sample prediction.
pub const SAMPLE_SUBSTITUTION_PROBABILITY: f64 = 0.3;

pub const HEALTHY_CONFIDENCE_RANGE: (f64, f64) = (0.7, 0.95);
pub const DISEASED_CONFIDENCE_RANGE: (f64, f64) = (0.6, 0.9);

const BROWN_SPOT_THRESHOLD: f64 = 0.15;
const EDGE_VARIATION_THRESHOLD: f64 = 0.2;
const YELLOW_SPOT_THRESHOLD: f64 = 0.2;
const WHITE_POWDER_THRESHOLD: f64 = 0.1;
const BLACK_SPOT_THRESHOLD: f64 = 0.12;
const LOW_SYMPTOM_THRESHOLD: f64 = 0.1;
const GREENNESS_THRESHOLD: f64 = 0.4;

/// Which path produced a detection result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionSource {
    /// Threshold rules plus generated confidence.
    Heuristic,
    /// Random blend with the sample table.
    Sample,
    /// Recovery after an internal detection error.
    Fallback,
}

/// Label plus confidence strictly inside `(0, 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DetectionResult {
    pub label: ClassLabel,
    pub confidence: f64,
    pub source: DetectionSource,
}

/// Which threshold rule fired. Exposed for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    BrownSpotsWithEdges,
    YellowSpots,
    WhitePowder,
    BlackSpots,
    MostlyGreen,
    Unknown,
}

/// Evaluate the ordered rules and return the first that matches.
pub fn match_rule(features: &FeatureVector) -> Rule {
    if features.brown_ratio() > BROWN_SPOT_THRESHOLD && features.edge_std() > EDGE_VARIATION_THRESHOLD
    {
        return Rule::BrownSpotsWithEdges;
    }
    if features.yellow_ratio() > YELLOW_SPOT_THRESHOLD {
        return Rule::YellowSpots;
    }
    if features.white_ratio() > WHITE_POWDER_THRESHOLD {
        return Rule::WhitePowder;
    }
    if features.black_ratio() > BLACK_SPOT_THRESHOLD {
        return Rule::BlackSpots;
    }

    let ratios = features.indicator_ratios();
    let mean_symptoms = ratios.iter().sum::<f64>() / ratios.len() as f64;
    if mean_symptoms < LOW_SYMPTOM_THRESHOLD && features.mean_hue() > GREENNESS_THRESHOLD {
        return Rule::MostlyGreen;
    }
    Rule::Unknown
}

/// Pick a label for the vector. Draws from `rng` only on random branches.
pub fn classify_label(features: &FeatureVector, rng: &mut dyn RandomSource) -> ClassLabel {
    match match_rule(features) {
        Rule::BrownSpotsWithEdges => {
            if rng.next_unit() > 0.5 {
                ClassLabel::AppleBlackRot
            } else {
                ClassLabel::AppleAppleScab
            }
        }
        Rule::YellowSpots => ClassLabel::TomatoEarlyBlight,
        Rule::WhitePowder => ClassLabel::CherryPowderyMildew,
        Rule::BlackSpots => ClassLabel::TomatoLateBlight,
        Rule::MostlyGreen => HEALTHY_LABELS[rng.pick_index(HEALTHY_LABELS.len())],
        Rule::Unknown => ClassLabel::ALL[rng.pick_index(ClassLabel::ALL.len())],
    }
}

/// Confidence drawn from the healthy or diseased range.
pub fn generate_confidence(label: ClassLabel, rng: &mut dyn RandomSource) -> f64 {
    let (low, high) = if label.is_healthy() {
        HEALTHY_CONFIDENCE_RANGE
    } else {
        DISEASED_CONFIDENCE_RANGE
    };
    rng.uniform(low, high)
}

/// Full classification: the sample blend draw first, then rules and confidence.
pub fn classify(
    features: &FeatureVector,
    samples: &SampleTable,
    rng: &mut dyn RandomSource,
) -> DetectionResult {
    if rng.next_unit() < SAMPLE_SUBSTITUTION_PROBABILITY {
        let sample = samples.pick(rng);
        return DetectionResult {
            label: sample.label,
            confidence: sample.confidence,
            source: DetectionSource::Sample,
        };
    }

    let label = classify_label(features, rng);
    DetectionResult {
        label,
        confidence: generate_confidence(label, rng),
        source: DetectionSource::Heuristic,
    }
}
