//! # Batch Runner
//!
//! Runs a single-file operation over every target of one user action and folds
//! the outcomes into a [`BatchResult`]. One file's failure never stops the
//! rest. A batch counts as a success when at least one file succeeded.
//!
//! Targets that do not exist are counted as failed without reaching the
//! engine. Between files the runner checks a [`CancelToken`]; once it is set
//! the remaining targets are counted as skipped.

use crate::model::{BatchResult, ErrorKind, FileOutcome, OpOutcome, TargetFile};
use crate::replace::FileOperations;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

/// Cooperative cancellation flag shared between a batch and whoever started it.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// How a batch treats targets that are not on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MissingPolicy {
    Fail,
    Skip,
}

pub struct BatchRunner<E: FileOperations> {
    engine: E,
}

impl<E: FileOperations> BatchRunner<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn replace_all(
        &self,
        source: &Path,
        targets: &[PathBuf],
        protection_enabled: bool,
    ) -> BatchResult {
        self.replace_all_with(source, targets, protection_enabled, &CancelToken::new(), |_| {})
    }

    pub fn replace_all_with<F: FnMut(&FileOutcome)>(
        &self,
        source: &Path,
        targets: &[PathBuf],
        protection_enabled: bool,
        cancel: &CancelToken,
        on_file: F,
    ) -> BatchResult {
        let result = self.run(targets, cancel, MissingPolicy::Fail, on_file, |t| {
            self.engine.replace(source, t, protection_enabled)
        });
        info!(
            succeeded = result.succeeded,
            failed = result.failed,
            skipped = result.skipped,
            "replace batch finished"
        );
        result
    }

    pub fn restore_all(&self, targets: &[PathBuf]) -> BatchResult {
        self.restore_all_with(targets, &CancelToken::new(), |_| {})
    }

    pub fn restore_all_with<F: FnMut(&FileOutcome)>(
        &self,
        targets: &[PathBuf],
        cancel: &CancelToken,
        on_file: F,
    ) -> BatchResult {
        let result = self.run(targets, cancel, MissingPolicy::Fail, on_file, |t| {
            self.engine.restore(t)
        });
        info!(
            succeeded = result.succeeded,
            failed = result.failed,
            skipped = result.skipped,
            "restore batch finished"
        );
        result
    }

    /// Removes protection from every listed path. The list usually comes from
    /// the settings registry, which may be stale, so vanished paths are skipped
    /// rather than failed.
    pub fn unprotect_all(&self, paths: &[PathBuf]) -> BatchResult {
        self.unprotect_all_with(paths, |_| {})
    }

    pub fn unprotect_all_with<F: FnMut(&FileOutcome)>(
        &self,
        paths: &[PathBuf],
        on_file: F,
    ) -> BatchResult {
        self.run(paths, &CancelToken::new(), MissingPolicy::Skip, on_file, |t| {
            self.engine.unprotect(t)
        })
    }

    fn run<F, Op>(
        &self,
        targets: &[PathBuf],
        cancel: &CancelToken,
        missing: MissingPolicy,
        mut on_file: F,
        op: Op,
    ) -> BatchResult
    where
        F: FnMut(&FileOutcome),
        Op: Fn(&Path) -> OpOutcome,
    {
        let mut result = BatchResult::new(targets.len());

        for (i, path) in targets.iter().enumerate() {
            if cancel.is_cancelled() {
                result.cancelled = true;
                result.skipped += targets.len() - i;
                break;
            }

            let target = TargetFile::new(path);
            let outcome = if target.exists() {
                op(target.path())
            } else {
                match missing {
                    MissingPolicy::Skip => {
                        result.skipped += 1;
                        continue;
                    }
                    MissingPolicy::Fail => OpOutcome::failure(
                        ErrorKind::NotFound,
                        format!("Target not found: {}", path.display()),
                    ),
                }
            };

            let file = FileOutcome { target, outcome };
            on_file(&file);
            result.record(file);
        }

        result
    }
}
