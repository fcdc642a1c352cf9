//! Directory traversal that mirrors the source tree into the destination.
//!
//! The walk runs on the calling thread. Every candidate file is handed to a
//! dispatch callback as soon as it is seen; the walker never waits for the work
//! it dispatches.

use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::error::PipelineError;
use crate::ledger::ResultLedger;

use super::classify::ClassifyTask;
use super::probe::ImageProbe;

/// Counters for one walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    /// Directories entered, including the root
    pub directories: usize,
    /// Candidate files handed to the dispatcher
    pub dispatched: usize,
    /// Subtrees skipped because they are the destination
    pub skipped: usize,
}

/// Walks a source tree and emits one [`ClassifyTask`] per candidate image.
pub struct TreeWalker<'a> {
    probe: &'a dyn ImageProbe,
    ledger: &'a ResultLedger,
    recursive: bool,
}

impl<'a> TreeWalker<'a> {
    pub fn new(probe: &'a dyn ImageProbe, ledger: &'a ResultLedger, recursive: bool) -> Self {
        Self {
            probe,
            ledger,
            recursive,
        }
    }

    /// Walk `find_dir`, mirroring each level into `copy_dir` when one is given.
    ///
    /// A directory that resolves to the destination of its level, or to the
    /// destination root, is skipped with a warning together with its subtree.
    pub fn walk<F>(&self, find_dir: &Path, copy_dir: Option<&Path>, mut dispatch: F) -> WalkStats
    where
        F: FnMut(ClassifyTask),
    {
        let mut stats = WalkStats::default();
        tracing::info!("In directory {}", find_dir.display());

        if let Some(copy_dir) = copy_dir {
            if same_location(find_dir, copy_dir) {
                self.warn(format!(
                    "find_dir \"{}\" and copy_dir \"{}\" are the same, find_dir will be skipped",
                    find_dir.display(),
                    copy_dir.display()
                ));
                stats.skipped += 1;
                return stats;
            }
        }
        stats.directories += 1;

        let mirror = |dir: &Path| -> Option<PathBuf> {
            let copy_dir = copy_dir?;
            match dir.strip_prefix(find_dir) {
                Ok(relative) if !relative.as_os_str().is_empty() => Some(copy_dir.join(relative)),
                _ => Some(copy_dir.to_path_buf()),
            }
        };

        let max_depth = if self.recursive { usize::MAX } else { 1 };
        let mut skipped = 0;
        let walker = WalkDir::new(find_dir)
            .min_depth(1)
            .max_depth(max_depth)
            .follow_links(true)
            .into_iter()
            .filter_entry(|entry| {
                if !entry.file_type().is_dir() {
                    return true;
                }
                if !self.recursive {
                    return false;
                }
                let level_destination = entry.path().parent().and_then(mirror);
                match self.destination_clash(entry, level_destination.as_deref(), copy_dir) {
                    Some(destination) => {
                        self.warn(format!(
                            "Directory \"{}\" and copy_dir \"{}\" are the same, \
                             this directory will be skipped",
                            entry.path().display(),
                            destination.display()
                        ));
                        skipped += 1;
                        false
                    }
                    None => true,
                }
            });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| find_dir.to_path_buf());
                    let err = PipelineError::Walk {
                        path,
                        message: e.to_string(),
                    };
                    tracing::error!("{}", err);
                    self.ledger.record_error(err.to_string());
                    continue;
                }
            };

            if entry.file_type().is_dir() {
                tracing::info!("In directory {}", entry.path().display());
                stats.directories += 1;
                continue;
            }

            if entry.file_type().is_file() && self.probe.sniff(entry.path()) {
                let destination = entry.path().parent().and_then(mirror);
                dispatch(ClassifyTask {
                    path: entry.into_path(),
                    destination,
                });
                stats.dispatched += 1;
            }
        }

        stats.skipped += skipped;
        stats
    }

    fn destination_clash<'p>(
        &self,
        entry: &DirEntry,
        level_destination: Option<&'p Path>,
        copy_root: Option<&'p Path>,
    ) -> Option<&'p Path> {
        [level_destination, copy_root]
            .into_iter()
            .flatten()
            .find(|destination| same_location(entry.path(), destination))
    }

    fn warn(&self, message: String) {
        tracing::warn!("{}", message);
        self.ledger.record_warning(message);
    }
}

/// True when both paths resolve to the same filesystem location.
///
/// Paths that cannot be resolved (e.g. a destination level not created yet)
/// are compared as written.
pub fn same_location(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        (Err(_), Err(_)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::probe::StandardProbe;
    use image::RgbImage;
    use std::fs;

    fn png(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        RgbImage::new(2, 2).save(path).unwrap();
    }

    fn collect(
        find: &Path,
        copy: Option<&Path>,
        recursive: bool,
    ) -> (Vec<ClassifyTask>, WalkStats, ResultLedger) {
        let ledger = ResultLedger::new();
        let probe = StandardProbe::new();
        let mut tasks = Vec::new();
        let stats = TreeWalker::new(&probe, &ledger, recursive).walk(find, copy, |t| tasks.push(t));
        tasks.sort_by(|a, b| a.path.cmp(&b.path));
        (tasks, stats, ledger)
    }

    #[test]
    fn test_non_recursive_ignores_subdirectories() {
        let root = tempfile::tempdir().unwrap();
        png(&root.path().join("a.png"));
        png(&root.path().join("sub/b.png"));
        fs::write(root.path().join("notes.txt"), "text").unwrap();

        let (tasks, stats, ledger) = collect(root.path(), None, false);
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].path, root.path().join("a.png"));
        assert_eq!(tasks[0].destination, None);
        assert_eq!(stats.directories, 1);
        assert_eq!(ledger.snapshot().warnings.len(), 0);
    }

    #[test]
    fn test_recursive_mirrors_destination_per_level() {
        let root = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        png(&root.path().join("a.png"));
        png(&root.path().join("x/y/b.png"));

        let (tasks, stats, _) = collect(root.path(), Some(dest.path()), true);
        assert_eq!(stats.dispatched, 2);
        assert_eq!(stats.directories, 3);
        assert_eq!(tasks[0].destination.as_deref(), Some(dest.path()));
        assert_eq!(
            tasks[1].destination.as_deref(),
            Some(dest.path().join("x/y").as_path())
        );
    }

    #[test]
    fn test_same_root_is_skipped_with_warning() {
        let root = tempfile::tempdir().unwrap();
        png(&root.path().join("a.png"));

        let (tasks, stats, ledger) = collect(root.path(), Some(root.path()), true);
        assert!(tasks.is_empty());
        assert_eq!(stats.skipped, 1);
        let snap = ledger.snapshot();
        assert_eq!(snap.warnings.len(), 1);
        assert!(snap.errors.is_empty());
    }

    #[test]
    fn test_destination_inside_source_is_skipped() {
        let root = tempfile::tempdir().unwrap();
        let dest = root.path().join("out");
        png(&root.path().join("a.png"));
        png(&dest.join("old.png"));
        png(&root.path().join("keep/c.png"));

        let (tasks, stats, ledger) = collect(root.path(), Some(&dest), true);
        let paths: Vec<_> = tasks.iter().map(|t| t.path.clone()).collect();
        assert_eq!(
            paths,
            vec![root.path().join("a.png"), root.path().join("keep/c.png")]
        );
        assert_eq!(stats.skipped, 1);
        assert_eq!(ledger.snapshot().warnings.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_loop_is_an_error_and_siblings_still_dispatch() {
        let root = tempfile::tempdir().unwrap();
        png(&root.path().join("a.png"));
        png(&root.path().join("sub/b.png"));
        std::os::unix::fs::symlink(root.path(), root.path().join("sub/back")).unwrap();

        let (tasks, stats, ledger) = collect(root.path(), None, true);
        let paths: Vec<_> = tasks.iter().map(|t| t.path.clone()).collect();
        assert_eq!(
            paths,
            vec![root.path().join("a.png"), root.path().join("sub/b.png")]
        );
        assert_eq!(stats.dispatched, 2);

        let snap = ledger.snapshot();
        assert_eq!(snap.errors.len(), 1);
        assert!(snap.errors[0].contains("back"));
        assert!(snap.warnings.is_empty());
    }

    #[test]
    fn test_same_location_resolves_relative_segments() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir(root.path().join("a")).unwrap();
        assert!(same_location(&root.path().join("a/../a"), &root.path().join("a")));
        assert!(!same_location(&root.path().join("a"), root.path()));
        assert!(!same_location(&root.path().join("missing"), root.path()));
    }
}
