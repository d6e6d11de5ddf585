//! Image decoding, feature extraction, and scoring pipeline for PhotoCull.
//!
//! This crate takes a folder of photographs, turns each file into a canonical
//! pixel buffer (raw-sensor files are demosaiced, standard formats decoded
//! directly), computes an 11-number quality descriptor per image, scores it
//! with a pluggable classifier, and copies the keepers into a destination
//! folder.
//!
//! The pipeline is deliberately sequential: one file is decoded, featurized,
//! scored, and optionally copied at a time, and a corrupt file never stops
//! the rest of the batch.

pub mod buffer;
pub mod cull;
pub mod decode;
pub mod error;
pub mod features;
pub mod model;
pub mod score;

pub use buffer::BgrImage;
pub use cull::{cull, CullRequest, CullRun, CullSummary, FileOutcome, FileReport};
pub use decode::{is_image_path, load_image, RAW_EXTENSIONS, STANDARD_EXTENSIONS};
pub use error::{ClassifierError, DecodeError, PathError, ScoreError};
pub use features::{extract_features, FeatureVector};
pub use model::{default_model_path, Classifier, FeatureScaling, LinearModel};
pub use score::score_image;
