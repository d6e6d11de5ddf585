//! Single-image scoring: decode, featurize, classify.

use std::path::Path;

use crate::decode::load_image;
use crate::error::{ClassifierError, ScoreError};
use crate::features::extract_features;
use crate::model::Classifier;

/// Score one file with the given classifier.
///
/// Classifiers expose a batch interface, so the single feature vector is
/// submitted as a batch of one and the sole result returned. Decode errors
/// propagate unchanged; classifier errors surface to the caller.
pub fn score_image<C: Classifier + ?Sized>(classifier: &C, path: &Path) -> Result<f64, ScoreError> {
    let img = load_image(path)?;
    let features = extract_features(&img);
    let scores = classifier.predict_batch(std::slice::from_ref(&features))?;
    if scores.len() != 1 {
        return Err(ScoreError::Classifier(ClassifierError::BatchShape {
            expected: 1,
            got: scores.len(),
        }));
    }
    Ok(scores[0])
}
