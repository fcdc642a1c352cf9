//! Run orchestration: preconditions, worker pool, walk, join.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::error::PreconditionError;
use crate::ledger::ResultLedger;
use crate::requirements::Requirements;

use super::classify::{FileClassifier, FileOutcome};
use super::probe::{ImageProbe, StandardProbe};
use super::walker::TreeWalker;

/// Where to look and where to copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindRequest {
    /// Root of the source tree
    pub find_dir: PathBuf,
    /// Root of the destination tree; `None` means discovery only
    pub copy_dir: Option<PathBuf>,
    /// Descend into subdirectories
    pub recursive: bool,
}

impl FindRequest {
    /// Discovery-only request.
    pub fn search(find_dir: impl Into<PathBuf>, recursive: bool) -> Self {
        Self {
            find_dir: find_dir.into(),
            copy_dir: None,
            recursive,
        }
    }

    /// Discover-and-copy request.
    pub fn copy(find_dir: impl Into<PathBuf>, copy_dir: impl Into<PathBuf>, recursive: bool) -> Self {
        Self {
            find_dir: find_dir.into(),
            copy_dir: Some(copy_dir.into()),
            recursive,
        }
    }
}

/// Per-outcome tallies of one run, used for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub dispatched: usize,
    pub matched: usize,
    pub mismatched: usize,
    pub failed: usize,
}

impl RunStats {
    fn add(&mut self, outcome: FileOutcome) {
        match outcome {
            FileOutcome::Mismatch => self.mismatched += 1,
            FileOutcome::DecodeFailed => self.failed += 1,
            _ => self.matched += 1,
        }
    }
}

/// Finds images that satisfy a [`Requirements`] bundle and optionally copies them.
pub struct PhotoFinder {
    probe: Arc<dyn ImageProbe>,
    requirements: Option<Arc<Requirements>>,
    workers: usize,
}

impl Default for PhotoFinder {
    fn default() -> Self {
        Self::new()
    }
}

impl PhotoFinder {
    /// Finder using the `image`-crate probe and no requirements.
    pub fn new() -> Self {
        Self::with_probe(Arc::new(StandardProbe::new()))
    }

    /// Finder using a custom image probe.
    pub fn with_probe(probe: Arc<dyn ImageProbe>) -> Self {
        Self {
            probe,
            requirements: None,
            workers: default_workers(),
        }
    }

    /// Builder-style variant of [`set_requirements`](Self::set_requirements).
    pub fn with_requirements(mut self, requirements: Option<Requirements>) -> Self {
        self.set_requirements(requirements);
        self
    }

    /// Replace the requirement bundle used by later runs.
    ///
    /// Runs already in flight keep the bundle they started with.
    pub fn set_requirements(&mut self, requirements: Option<Requirements>) {
        self.requirements = requirements.map(Arc::new);
    }

    pub fn requirements(&self) -> Option<&Requirements> {
        self.requirements.as_deref()
    }

    #[cfg(test)]
    pub(crate) fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Check the request before any work starts.
    pub fn check_preconditions(request: &FindRequest) -> Vec<PreconditionError> {
        let mut failures = Vec::new();

        if !request.find_dir.exists() {
            failures.push(PreconditionError::SourceMissing(request.find_dir.clone()));
        } else if !request.find_dir.is_dir() {
            failures.push(PreconditionError::SourceNotDirectory(request.find_dir.clone()));
        }

        if let Some(copy_dir) = &request.copy_dir {
            if !copy_dir.exists() {
                failures.push(PreconditionError::DestinationMissing(copy_dir.clone()));
            } else if !copy_dir.is_dir() {
                failures.push(PreconditionError::DestinationNotDirectory(copy_dir.clone()));
            }
        }

        failures
    }

    /// Run one discovery (and copy) pass.
    ///
    /// Results are appended to `ledger` when one is given, otherwise to a fresh
    /// ledger. The returned ledger is complete: every dispatched file has been
    /// classified. If a precondition fails, nothing is walked and the ledger
    /// holds only the precondition errors.
    pub async fn run(
        &self,
        request: &FindRequest,
        ledger: Option<Arc<ResultLedger>>,
    ) -> Arc<ResultLedger> {
        let ledger = ledger.unwrap_or_default();

        let failures = Self::check_preconditions(request);
        if !failures.is_empty() {
            for failure in failures {
                tracing::error!("{}", failure);
                ledger.record_error(failure.to_string());
            }
            return ledger;
        }

        let classifier = FileClassifier::new(
            Arc::clone(&self.probe),
            self.requirements.clone(),
            Arc::clone(&ledger),
        );
        let permits = Arc::new(Semaphore::new(self.workers));
        let mut tasks = JoinSet::new();

        let walk_stats = TreeWalker::new(self.probe.as_ref(), &ledger, request.recursive).walk(
            &request.find_dir,
            request.copy_dir.as_deref(),
            |task| {
                let classifier = classifier.clone();
                let permits = Arc::clone(&permits);
                tasks.spawn(async move {
                    let _permit = permits.acquire_owned().await;
                    tokio::task::spawn_blocking(move || classifier.run(&task)).await
                });
            },
        );
        tracing::debug!(
            "Walked {} directories, dispatched {} files",
            walk_stats.directories,
            walk_stats.dispatched
        );

        let mut stats = RunStats {
            dispatched: walk_stats.dispatched,
            ..Default::default()
        };
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(outcome)) => stats.add(outcome),
                Ok(Err(e)) | Err(e) => {
                    stats.failed += 1;
                    let message = format!("Worker failed: {}", e);
                    tracing::error!("{}", message);
                    ledger.record_error(message);
                }
            }
        }

        tracing::info!(
            "Checked {} files: {} matched, {} did not match, {} failed; {} errors recorded",
            stats.dispatched,
            stats.matched,
            stats.mismatched,
            stats.failed,
            ledger.error_count()
        );
        ledger
    }

    /// Discovery-only convenience wrapper.
    pub async fn search(&self, find_dir: &Path, recursive: bool) -> Arc<ResultLedger> {
        self.run(&FindRequest::search(find_dir, recursive), None).await
    }

    /// Discover-and-copy convenience wrapper.
    pub async fn copy(&self, find_dir: &Path, copy_dir: &Path, recursive: bool) -> Arc<ResultLedger> {
        self.run(&FindRequest::copy(find_dir, copy_dir, recursive), None)
            .await
    }
}

/// Worker count used for classification: the host's available parallelism.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

/// Find images under `find_dir` and copy matches into `copy_dir` when given.
///
/// Pass an existing `ledger` to accumulate several runs into one report.
pub async fn discover_and_copy(
    find_dir: &Path,
    copy_dir: Option<&Path>,
    recursive: bool,
    requirements: Option<Requirements>,
    ledger: Option<Arc<ResultLedger>>,
) -> Arc<ResultLedger> {
    let request = FindRequest {
        find_dir: find_dir.to_path_buf(),
        copy_dir: copy_dir.map(Path::to_path_buf),
        recursive,
    };
    PhotoFinder::new()
        .with_requirements(requirements)
        .run(&request, ledger)
        .await
}
