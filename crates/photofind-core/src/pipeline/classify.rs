//! Per-file worker: decode, check requirements, optionally copy.
//!
//! Every failure is converted into a ledger entry here. Nothing a single file
//! does can abort the walk or a sibling worker.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::PipelineError;
use crate::ledger::ResultLedger;
use crate::requirements::Requirements;

use super::probe::ImageProbe;
use super::transfer::{copy_with_metadata, ensure_dir};

/// What happened to one candidate file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    /// Could not be decoded; recorded as an error
    DecodeFailed,
    /// Decoded but did not satisfy the requirements; not recorded
    Mismatch,
    /// Matched, no destination configured
    Found,
    /// Matched and copied
    Copied,
    /// Matched, but the destination already had a file with that name
    NameCollision,
    /// Matched, but the copy itself failed
    CopyFailed,
    /// Matched, but the destination directory could not be created
    DestinationUncreatable,
}

/// One unit of work dispatched by the walker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifyTask {
    /// Candidate file
    pub path: PathBuf,
    /// Mirrored destination directory for the file's level, if copying
    pub destination: Option<PathBuf>,
}

/// Classifies candidate files and records the outcome.
///
/// Cheap to clone; clones share the probe, the requirements and the ledger.
#[derive(Clone)]
pub struct FileClassifier {
    probe: Arc<dyn ImageProbe>,
    requirements: Option<Arc<Requirements>>,
    ledger: Arc<ResultLedger>,
}

impl FileClassifier {
    pub fn new(
        probe: Arc<dyn ImageProbe>,
        requirements: Option<Arc<Requirements>>,
        ledger: Arc<ResultLedger>,
    ) -> Self {
        Self {
            probe,
            requirements,
            ledger,
        }
    }

    pub fn ledger(&self) -> &Arc<ResultLedger> {
        &self.ledger
    }

    /// Run one task to completion.
    pub fn run(&self, task: &ClassifyTask) -> FileOutcome {
        self.classify(&task.path, task.destination.as_deref())
    }

    /// Classify `path` and, on a match, copy it into `destination`.
    pub fn classify(&self, path: &Path, destination: Option<&Path>) -> FileOutcome {
        tracing::info!("Start check file {}", path.display());

        let meta = match self.probe.inspect(path) {
            Ok(meta) => meta,
            Err(e) => {
                tracing::error!("{}", e);
                self.ledger.record_error(e.to_string());
                return FileOutcome::DecodeFailed;
            }
        };

        if let Some(requirements) = &self.requirements {
            if !requirements.evaluate(&meta) {
                tracing::debug!(
                    "File {} does not match requirements ({} {} {}x{})",
                    path.display(),
                    meta.format,
                    meta.mode,
                    meta.width,
                    meta.height
                );
                return FileOutcome::Mismatch;
            }
        }

        self.ledger.record_found(path);
        tracing::info!("File {} matches requirements", path.display());

        match destination {
            Some(dir) => self.copy_into(path, dir),
            None => FileOutcome::Found,
        }
    }

    fn copy_into(&self, path: &Path, dir: &Path) -> FileOutcome {
        if !dir.exists() {
            if let Err(e) = ensure_dir(dir) {
                let err = PipelineError::DestinationUncreatable {
                    dir: dir.to_path_buf(),
                    path: path.to_path_buf(),
                    message: e.to_string(),
                };
                tracing::error!("{}", err);
                self.ledger.record_not_copied_error(path, err.to_string());
                return FileOutcome::DestinationUncreatable;
            }
        }

        let Some(file_name) = path.file_name() else {
            let err = PipelineError::CopyFailed {
                path: path.to_path_buf(),
                destination: dir.to_path_buf(),
                message: "source has no file name".to_string(),
            };
            self.ledger.record_not_copied_error(path, err.to_string());
            return FileOutcome::CopyFailed;
        };
        let target = dir.join(file_name);

        if target.exists() {
            return self.collision(path, dir);
        }

        match copy_with_metadata(path, &target) {
            Ok(()) => {
                self.ledger.record_copied(path);
                tracing::info!("File {} was copied in {}", path.display(), target.display());
                FileOutcome::Copied
            }
            // Another worker won the race for the same name
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => self.collision(path, dir),
            Err(e) => {
                let err = PipelineError::CopyFailed {
                    path: path.to_path_buf(),
                    destination: target,
                    message: e.to_string(),
                };
                tracing::error!("{}", err);
                self.ledger.record_not_copied_error(path, err.to_string());
                FileOutcome::CopyFailed
            }
        }
    }

    fn collision(&self, path: &Path, dir: &Path) -> FileOutcome {
        let warning = PipelineError::NameCollision {
            path: path.to_path_buf(),
            destination: dir.to_path_buf(),
        };
        tracing::warn!("{}", warning);
        self.ledger.record_not_copied_warning(path, warning.to_string());
        FileOutcome::NameCollision
    }
}
