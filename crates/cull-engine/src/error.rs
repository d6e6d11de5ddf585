//! Error types for the culling pipeline.
//!
//! Each failure domain gets its own enum so callers can tell a per-file
//! problem (decode, classifier) from a batch-fatal one (directory access).

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A file could not be turned into a pixel buffer.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The path does not exist on disk.
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// The extension is in neither the raw-sensor nor the standard set.
    #[error("unrecognized image extension: {0}")]
    UnrecognizedExtension(PathBuf),

    /// The raw-sensor decoder rejected the file.
    #[error("raw decode failed for {path}: {reason}")]
    Raw { path: PathBuf, reason: String },

    /// The standard-format decoder rejected the file.
    #[error("decode failed for {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The decoder produced a buffer with no pixels.
    #[error("decoded image is empty: {0}")]
    Empty(PathBuf),
}

/// The classifier could not be loaded or could not score a batch.
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// Model file could not be read.
    #[error("failed to read model file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Model file is not valid JSON for the expected shape.
    #[error("failed to parse model file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A coefficient vector does not match the feature count.
    #[error("model expects {expected} features, got {got}")]
    FeatureShape { expected: usize, got: usize },

    /// The classifier returned the wrong number of scores for a batch.
    #[error("classifier returned {got} scores for a batch of {expected}")]
    BatchShape { expected: usize, got: usize },
}

/// Scoring a single file failed. Either the decode or the classifier broke.
#[derive(Debug, Error)]
pub enum ScoreError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Classifier(#[from] ClassifierError),
}

/// Directory-level problem that makes a whole batch impossible.
///
/// Raised before any file is touched; there is no per-file recovery here.
#[derive(Debug, Error)]
pub enum PathError {
    #[error("cannot read source directory {path}: {source}")]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot create destination directory {path}: {source}")]
    DestUncreatable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
