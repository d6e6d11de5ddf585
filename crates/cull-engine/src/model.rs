//! Classifier capability and the bundled linear model.
//!
//! The pipeline only assumes "a batch of feature vectors in, one score per
//! vector out". How the model was trained or serialized is none of the
//! pipeline's business; anything implementing [`Classifier`] can drive a
//! culling run. The bundled implementation is a linear model with optional
//! per-feature standardization, stored as JSON next to the executable.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ClassifierError;
use crate::features::FeatureVector;

/// Batch scoring capability.
///
/// Implementations must return exactly one score per input vector, in input
/// order. Implementations are expected to be immutable after construction
/// so a single instance can serve many sequential culling runs.
pub trait Classifier {
    fn predict_batch(&self, batch: &[FeatureVector]) -> Result<Vec<f64>, ClassifierError>;
}

/// Per-feature standardization applied before the dot product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureScaling {
    pub mean: Vec<f64>,
    pub std: Vec<f64>,
}

/// Linear scoring model: `score = weights · features + bias`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearModel {
    weights: Vec<f64>,
    bias: f64,
    #[serde(default)]
    scaling: Option<FeatureScaling>,
}

impl LinearModel {
    /// Build a model, validating that every coefficient vector matches the
    /// feature count.
    pub fn new(
        weights: Vec<f64>,
        bias: f64,
        scaling: Option<FeatureScaling>,
    ) -> Result<Self, ClassifierError> {
        let model = Self {
            weights,
            bias,
            scaling,
        };
        model.validate()?;
        Ok(model)
    }

    /// Load a model from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ClassifierError> {
        let raw = fs::read_to_string(path).map_err(|source| ClassifierError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let model: Self = serde_json::from_str(&raw).map_err(|source| ClassifierError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> Result<(), ClassifierError> {
        if self.weights.len() != FeatureVector::LEN {
            return Err(ClassifierError::FeatureShape {
                expected: FeatureVector::LEN,
                got: self.weights.len(),
            });
        }
        if let Some(scaling) = &self.scaling {
            if scaling.mean.len() != FeatureVector::LEN {
                return Err(ClassifierError::FeatureShape {
                    expected: FeatureVector::LEN,
                    got: scaling.mean.len(),
                });
            }
            if scaling.std.len() != FeatureVector::LEN {
                return Err(ClassifierError::FeatureShape {
                    expected: FeatureVector::LEN,
                    got: scaling.std.len(),
                });
            }
        }
        Ok(())
    }

    fn score_one(&self, features: &FeatureVector) -> f64 {
        let values = features.to_array();
        let mut score = self.bias;
        for (i, &value) in values.iter().enumerate() {
            let value = match &self.scaling {
                // A zero spread would divide away the feature entirely;
                // center it and leave the magnitude alone.
                Some(s) if s.std[i] != 0.0 => (value - s.mean[i]) / s.std[i],
                Some(s) => value - s.mean[i],
                None => value,
            };
            score += self.weights[i] * value;
        }
        score
    }
}

impl Classifier for LinearModel {
    fn predict_batch(&self, batch: &[FeatureVector]) -> Result<Vec<f64>, ClassifierError> {
        Ok(batch.iter().map(|f| self.score_one(f)).collect())
    }
}

/// Well-known model artifact location: `model/culler_model.json` next to
/// the executable, falling back to the working directory.
pub fn default_model_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("model")
        .join("culler_model.json")
}
