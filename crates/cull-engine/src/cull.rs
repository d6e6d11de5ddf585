//! Threshold-based batch culling with per-file failure isolation.
//!
//! A run is an iterator: each `next()` decodes, scores, and optionally
//! copies exactly one file. Every file boundary is therefore a safe
//! checkpoint; a caller that stops pulling leaves no partial copy behind.
//! One corrupt file never blocks culling the rest of the directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::decode::is_image_path;
use crate::error::PathError;
use crate::model::Classifier;
use crate::score::score_image;

/// One batch-culling job.
#[derive(Debug, Clone)]
pub struct CullRequest {
    pub source: PathBuf,
    pub dest: PathBuf,
    /// Inclusive keep threshold: a file is copied when `score >= threshold`.
    pub threshold: f64,
}

/// What happened to a single file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FileOutcome {
    /// Scored at or above the threshold and was copied.
    Copied { score: f64 },
    /// Scored below the threshold; left untouched in the source.
    Skipped { score: f64 },
    /// Decoding, scoring, or copying failed. The batch continues.
    Failed { reason: String },
}

/// Per-file progress report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub outcome: FileOutcome,
    /// Completion percentage after this file, 0 to 100.
    pub percent: u8,
}

/// Totals for a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CullSummary {
    pub total: usize,
    pub copied: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// An in-progress culling run, yielding one [`FileReport`] per file.
pub struct CullRun<'a, C: Classifier + ?Sized> {
    classifier: &'a C,
    dest: PathBuf,
    threshold: f64,
    files: std::vec::IntoIter<PathBuf>,
    total: usize,
    processed: usize,
}

impl<'a, C: Classifier + ?Sized> CullRun<'a, C> {
    /// Prepare a run: create the destination directory (idempotent, parents
    /// included) and enumerate matching files in the source.
    ///
    /// Fails before any file is touched when the source is unreadable or
    /// the destination cannot be created. An existing destination is fine.
    pub fn start(classifier: &'a C, request: &CullRequest) -> Result<Self, PathError> {
        fs::create_dir_all(&request.dest).map_err(|source| PathError::DestUncreatable {
            path: request.dest.clone(),
            source,
        })?;

        let entries =
            fs::read_dir(&request.source).map_err(|source| PathError::SourceUnreadable {
                path: request.source.clone(),
                source,
            })?;

        // Directory order is whatever the OS hands back; no sorting.
        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| PathError::SourceUnreadable {
                path: request.source.clone(),
                source,
            })?;
            let path = entry.path();
            if is_image_path(&path) {
                files.push(path);
            }
        }

        let total = files.len();
        Ok(Self {
            classifier,
            dest: request.dest.clone(),
            threshold: request.threshold,
            files: files.into_iter(),
            total,
            processed: 0,
        })
    }

    /// Number of files matched during enumeration.
    pub fn total(&self) -> usize {
        self.total
    }

    fn percent(&self) -> u8 {
        ((self.processed as f64 / self.total as f64) * 100.0).round() as u8
    }

    fn process(&mut self, path: PathBuf) -> FileReport {
        self.processed += 1;
        let outcome = match score_image(self.classifier, &path) {
            Ok(score) => {
                log::debug!("{} scored {:.4}", path.display(), score);
                if score >= self.threshold {
                    match copy_into(&path, &self.dest) {
                        Ok(()) => FileOutcome::Copied { score },
                        Err(err) => {
                            log::warn!("copy failed for {}: {}", path.display(), err);
                            FileOutcome::Failed {
                                reason: err.to_string(),
                            }
                        }
                    }
                } else {
                    FileOutcome::Skipped { score }
                }
            }
            Err(err) => {
                log::warn!("skipping {}: {}", path.display(), err);
                FileOutcome::Failed {
                    reason: err.to_string(),
                }
            }
        };
        FileReport {
            path,
            outcome,
            percent: self.percent(),
        }
    }
}

impl<'a, C: Classifier + ?Sized> Iterator for CullRun<'a, C> {
    type Item = FileReport;

    fn next(&mut self) -> Option<FileReport> {
        let path = self.files.next()?;
        Some(self.process(path))
    }
}

/// Copy `path` into the `dest` directory byte for byte, keeping the
/// filename. An existing file of the same name is overwritten.
fn copy_into(path: &Path, dest: &Path) -> io::Result<()> {
    let name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no filename"))?;
    fs::copy(path, dest.join(name))?;
    Ok(())
}

/// Run a whole batch, feeding every report to `on_report`.
///
/// Per-file failures are absorbed into `Failed` outcomes and logged; only
/// the directory-level problems in [`PathError`] abort the run, and those
/// surface before any file is processed. Returning from this function is
/// the terminal "done" signal.
pub fn cull<C, F>(
    classifier: &C,
    request: &CullRequest,
    mut on_report: F,
) -> Result<CullSummary, PathError>
where
    C: Classifier + ?Sized,
    F: FnMut(&FileReport),
{
    let run = CullRun::start(classifier, request)?;
    let mut summary = CullSummary {
        total: run.total(),
        ..CullSummary::default()
    };
    for report in run {
        match report.outcome {
            FileOutcome::Copied { .. } => summary.copied += 1,
            FileOutcome::Skipped { .. } => summary.skipped += 1,
            FileOutcome::Failed { .. } => summary.failed += 1,
        }
        on_report(&report);
    }
    Ok(summary)
}
