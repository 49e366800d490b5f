//! # Backup Store
//!
//! Timestamped copies of targets in one flat directory:
//!
//! ```text
//! backups/
//! ├── SplashScreen_20240101_120000.png
//! └── splash_default_bg_20240312_081502.png
//! ```
//!
//! There is no index. A target "has a backup" when any file in the directory
//! starts with `{stem}_`. The extension is always `.png`, whatever the target's
//! own extension is. Backups are taken once per stem and never deleted here.
//!
//! When several backups match a stem, restore sorts the matches by name and
//! takes the first. With the fixed timestamp layout that is the oldest copy,
//! i.e. the one taken before the first replacement. This is neither
//! "whichever match the directory listing yields first" (unordered, so not
//! reproducible) nor "the most recent backup" (which may itself be a
//! replacement image). Oldest-first always gets the vendor image back.

use crate::copy::copy_file;
use crate::error::{Result, SplashError};
use crate::model::{BackupRecord, ErrorKind, OpOutcome, TargetFile, BACKUP_TIMESTAMP_FORMAT};
use chrono::Local;
use std::fs;
#[cfg(any(test, feature = "test_utils"))]
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const BACKUP_EXTENSION: &str = "png";

/// A failure to inject into the backup copy.
#[cfg(any(test, feature = "test_utils"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupFault {
    /// Refused before anything is written.
    Denied,
    /// Fails after leaving an empty file under the backup name.
    Interrupted,
}

#[derive(Debug, Clone)]
pub struct BackupStore {
    dir: PathBuf,
    #[cfg(any(test, feature = "test_utils"))]
    fault: Option<BackupFault>,
}

impl BackupStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            #[cfg(any(test, feature = "test_utils"))]
            fault: None,
        }
    }

    /// Every later backup copy fails with `fault`.
    #[cfg(any(test, feature = "test_utils"))]
    pub fn with_fault(mut self, fault: BackupFault) -> Self {
        self.fault = Some(fault);
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir).map_err(|e| SplashError::from_io(&self.dir, e))?;
        }
        Ok(())
    }

    fn prefix(target: &TargetFile) -> String {
        format!("{}_", target.stem())
    }

    /// All backups for the target's stem, sorted by file name.
    pub fn list_backups(&self, target: &Path) -> Result<Vec<BackupRecord>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let prefix = Self::prefix(&TargetFile::new(target));
        let entries = fs::read_dir(&self.dir).map_err(|e| SplashError::from_io(&self.dir, e))?;

        let mut records = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| SplashError::from_io(&self.dir, e))?;
            if entry.file_name().to_string_lossy().starts_with(&prefix) {
                records.push(BackupRecord::from_path(entry.path()));
            }
        }
        records.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        Ok(records)
    }

    /// The backup restore would use.
    pub fn find_backup(&self, target: &Path) -> Result<Option<BackupRecord>> {
        Ok(self.list_backups(target)?.into_iter().next())
    }

    pub fn has_backup(&self, target: &Path) -> bool {
        matches!(self.find_backup(target), Ok(Some(_)))
    }

    /// Copies the target into the backup directory unless a backup for its
    /// stem already exists. Two backups of one stem within the same second
    /// share a name; the later copy overwrites the earlier.
    pub fn backup_original(&self, target: &Path) -> OpOutcome {
        if !target.exists() {
            return OpOutcome::failure(
                ErrorKind::NotFound,
                format!("Target file not found: {}", target.display()),
            );
        }
        if self.has_backup(target) {
            debug!(target = %target.display(), "backup exists, skipping");
            return OpOutcome::success("Existing backup found, backup skipped");
        }

        let target_file = TargetFile::new(target);
        let name = format!(
            "{}_{}.{}",
            target_file.stem(),
            Local::now().format(BACKUP_TIMESTAMP_FORMAT),
            BACKUP_EXTENSION
        );
        let dest = self.dir.join(&name);

        let result = self
            .ensure_dir()
            .and_then(|_| self.copy_backup(target, &dest));
        match result {
            Ok(_) => {
                info!(target = %target.display(), backup = %dest.display(), "backed up original");
                OpOutcome::success(format!("Backed up original: {}", name))
            }
            Err(e) => OpOutcome::from_error("Backup failed", &e),
        }
    }

    fn copy_backup(&self, target: &Path, dest: &Path) -> Result<u64> {
        if let Some(e) = self.injected_fault(dest) {
            return Err(e);
        }
        copy_file(target, dest)
    }

    #[cfg(any(test, feature = "test_utils"))]
    fn injected_fault(&self, dest: &Path) -> Option<SplashError> {
        let source = match self.fault? {
            BackupFault::Denied => io::Error::from(io::ErrorKind::PermissionDenied),
            BackupFault::Interrupted => {
                if let Err(e) = fs::write(dest, b"") {
                    debug!(dest = %dest.display(), error = %e, "could not leave partial backup");
                }
                io::Error::other("copy interrupted")
            }
        };
        Some(SplashError::from_io(dest, source))
    }

    #[cfg(not(any(test, feature = "test_utils")))]
    fn injected_fault(&self, _dest: &Path) -> Option<SplashError> {
        None
    }

    /// Copies the selected backup over the target. Attribute handling is the
    /// caller's job.
    pub fn restore_backup(&self, target: &Path) -> OpOutcome {
        let record = match self.find_backup(target) {
            Ok(Some(record)) => record,
            Ok(None) => {
                return OpOutcome::failure(
                    ErrorKind::NotFound,
                    format!("No backup found for {}", TargetFile::new(target).display_name()),
                )
            }
            Err(e) => return OpOutcome::from_error("Could not read backups", &e),
        };

        match copy_file(&record.path, target) {
            Ok(_) => {
                info!(target = %target.display(), backup = %record.path.display(), "restored backup");
                OpOutcome::success(format!("Restored from {}", record.file_name))
            }
            Err(e) => OpOutcome::from_error("Restore failed", &e),
        }
    }
}
