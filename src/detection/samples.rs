//! Canned sample predictions used for the random blend and as the last
//! resort when detection fails internally.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;
use tracing::{info, warn};

use super::labels::ClassLabel;
use super::rng::RandomSource;

/// One canned `(label, confidence)` pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplePrediction {
    pub label: ClassLabel,
    pub confidence: f64,
}

impl SamplePrediction {
    pub const fn new(label: ClassLabel, confidence: f64) -> Self {
        Self { label, confidence }
    }
}

/// Built-in table used when no candidate file yields entries.
pub const DEFAULT_SAMPLE_PREDICTIONS: [SamplePrediction; 5] = [
    SamplePrediction::new(ClassLabel::AppleAppleScab, 0.904),
    SamplePrediction::new(ClassLabel::TomatoLateBlight, 0.856),
    SamplePrediction::new(ClassLabel::PotatoHealthy, 0.736),
    SamplePrediction::new(ClassLabel::GrapeBlackRot, 0.892),
    SamplePrediction::new(ClassLabel::CornCommonRust, 0.817),
];

/// Non-empty table of sample predictions.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleTable {
    entries: Vec<SamplePrediction>,
}

impl SampleTable {
    pub fn builtin() -> Self {
        Self {
            entries: DEFAULT_SAMPLE_PREDICTIONS.to_vec(),
        }
    }

    /// Resolve the table from the first candidate file that exists and
    /// yields at least one valid entry; otherwise the built-in table.
    pub fn load(candidates: &[PathBuf]) -> Self {
        for path in candidates {
            if !path.exists() {
                continue;
            }
            match read_sample_file(path) {
                Ok(entries) if !entries.is_empty() => {
                    info!(count = entries.len(), path = %path.display(), "Loaded sample predictions");
                    return Self { entries };
                }
                Ok(_) => {
                    warn!(path = %path.display(), "Sample prediction file has no usable entries");
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to load sample predictions");
                }
            }
        }
        Self::builtin()
    }

    pub fn entries(&self) -> &[SamplePrediction] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Uniform pick.
    pub fn pick(&self, rng: &mut dyn RandomSource) -> SamplePrediction {
        self.entries[rng.pick_index(self.entries.len())]
    }
}

#[derive(Deserialize)]
struct RawSample {
    prediction: Option<String>,
    confidence: Option<serde_json::Value>,
}

#[derive(Debug, thiserror::Error)]
enum SampleFileError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

fn read_sample_file(path: &Path) -> Result<Vec<SamplePrediction>, SampleFileError> {
    let raw = std::fs::read_to_string(path)?;
    let items: Vec<RawSample> = serde_json::from_str(&raw)?;

    let mut entries = Vec::with_capacity(items.len());
    for item in items {
        let (Some(prediction), Some(confidence)) = (item.prediction, item.confidence) else {
            continue;
        };
        let Some(confidence) = parse_confidence(&confidence) else {
            warn!(prediction = %prediction, "Skipping sample with unusable confidence");
            continue;
        };
        match ClassLabel::from_str(&prediction) {
            Ok(label) => entries.push(SamplePrediction::new(label, confidence)),
            Err(_) => warn!(prediction = %prediction, "Skipping sample with unknown label"),
        }
    }
    Ok(entries)
}

/// Accepts numbers or numeric strings strictly inside `(0, 1)`.
fn parse_confidence(value: &serde_json::Value) -> Option<f64> {
    let c = match value {
        serde_json::Value::Number(n) => n.as_f64()?,
        serde_json::Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    (c > 0.0 && c < 1.0).then_some(c)
}
