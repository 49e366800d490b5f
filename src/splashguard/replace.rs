//! # Replace Engine
//!
//! Single-file replace and restore. A source that resolves to the target
//! itself is refused before anything else happens. Each step short-circuits
//! on an unrecoverable failure:
//!
//! 1. unprotect the target if it is currently protected
//! 2. check write access by opening the target for append
//! 3. back up the original (skipped when a backup already exists)
//! 4. clear read-only if the target is still not writable
//! 5. copy the source over the target
//! 6. re-protect, when protection is enabled
//!
//! Step 5 is the point of no return. If the process dies between 5 and 6 the
//! target is replaced but unprotected; that state is valid, not corruption.
//!
//! Restore runs steps 1, 2 and 4, copies the backup over the target and never
//! re-protects: a restored target is always left writable.
//!
//! No locking is done here. Callers must not run two operations on the same
//! target concurrently.

use crate::attributes::AttributeController;
use crate::backup::BackupStore;
use crate::copy::{copy_file, same_file};
use crate::model::{ErrorKind, OpOutcome, TargetFile};
use crate::privilege::PrivilegeQuery;
use crate::protection::ProtectionManager;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The single-file operations a batch is made of.
pub trait FileOperations {
    fn replace(&self, source: &Path, target: &Path, protection_enabled: bool) -> OpOutcome;
    fn restore(&self, target: &Path) -> OpOutcome;
    fn unprotect(&self, target: &Path) -> OpOutcome;
}

impl<T: FileOperations + ?Sized> FileOperations for Arc<T> {
    fn replace(&self, source: &Path, target: &Path, protection_enabled: bool) -> OpOutcome {
        (**self).replace(source, target, protection_enabled)
    }

    fn restore(&self, target: &Path) -> OpOutcome {
        (**self).restore(target)
    }

    fn unprotect(&self, target: &Path) -> OpOutcome {
        (**self).unprotect(target)
    }
}

pub struct ReplaceEngine<A: AttributeController, P: PrivilegeQuery> {
    protection: ProtectionManager<A, P>,
    backups: BackupStore,
}

impl<A: AttributeController, P: PrivilegeQuery> ReplaceEngine<A, P> {
    pub fn new(protection: ProtectionManager<A, P>, backups: BackupStore) -> Self {
        Self {
            protection,
            backups,
        }
    }

    pub fn protection(&self) -> &ProtectionManager<A, P> {
        &self.protection
    }

    pub fn backups(&self) -> &BackupStore {
        &self.backups
    }

    /// Steps 1, 2 and 4: leave the target writable or explain why not.
    /// Returns whether the target was protected beforehand.
    fn make_writable(&self, target: &Path) -> Result<bool, OpOutcome> {
        let was_protected = self.protection.is_protected(target);
        if was_protected {
            debug!(target = %target.display(), "removing existing protection");
            let removed = self.protection.unprotect(target);
            if !removed.ok {
                return Err(OpOutcome::failure(
                    ErrorKind::Permission,
                    format!("Could not remove existing protection: {}", removed.message),
                ));
            }
        }

        if let Err(e) = self.protection.attributes().check_write(target) {
            if e.is_permission() {
                return Err(OpOutcome::failure(
                    ErrorKind::Permission,
                    "Permission denied, cannot write to target",
                ));
            }
            debug!(target = %target.display(), error = %e, "write check failed, continuing");
        }

        Ok(was_protected)
    }

    fn clear_read_only(&self, target: &Path) -> Result<(), OpOutcome> {
        let attrs = self.protection.attributes();
        match attrs.is_writable(target) {
            Ok(true) => Ok(()),
            Ok(false) => attrs.set_read_only(target, false).map_err(|e| {
                OpOutcome::failure(
                    ErrorKind::Permission,
                    format!("Could not clear read-only attribute: {}", e),
                )
            }),
            Err(e) => Err(OpOutcome::from_error("Could not read file attributes", &e)),
        }
    }
}

fn missing(what: &str, path: &Path) -> OpOutcome {
    OpOutcome::failure(
        ErrorKind::NotFound,
        format!("{} not found: {}", what, path.display()),
    )
}

impl<A: AttributeController, P: PrivilegeQuery> FileOperations for ReplaceEngine<A, P> {
    fn replace(&self, source: &Path, target: &Path, protection_enabled: bool) -> OpOutcome {
        if !source.exists() {
            return missing("Source image", source);
        }
        if !target.exists() {
            return missing("Target", target);
        }
        if same_file(source, target) {
            return OpOutcome::failure(
                ErrorKind::Io,
                format!("Source and target are the same file: {}", target.display()),
            );
        }

        if let Err(outcome) = self.make_writable(target) {
            return outcome;
        }

        let backup = self.backups.backup_original(target);
        let mut warnings = Vec::new();
        if !backup.ok {
            if !self.backups.has_backup(target) {
                return backup;
            }
            warn!(target = %target.display(), message = %backup.message, "backup failed but one exists");
            warnings.push(backup.message.clone());
        }

        if let Err(outcome) = self.clear_read_only(target) {
            return outcome;
        }

        if let Err(e) = copy_file(source, target) {
            return OpOutcome::from_error("Replace failed", &e);
        }
        info!(source = %source.display(), target = %target.display(), "replaced");

        let mut parts = vec!["Replaced".to_string(), backup.message];
        if protection_enabled {
            let report = self.protection.protect(target);
            if report.ok() {
                parts.push(report.outcome.message);
                warnings.extend(report.outcome.warnings);
            } else {
                parts.push(format!("Warning: {}", report.outcome.message));
                warnings.push(report.outcome.message);
            }
        } else {
            parts.push("Protection skipped (disabled)".to_string());
        }

        let mut outcome = OpOutcome::success(parts.join(" | "));
        outcome.warnings = warnings;
        outcome
    }

    fn restore(&self, target: &Path) -> OpOutcome {
        if !target.exists() {
            return missing("Target", target);
        }
        if !self.backups.has_backup(target) {
            return OpOutcome::failure(
                ErrorKind::NotFound,
                format!("No backup found for {}", TargetFile::new(target).display_name()),
            );
        }

        let was_protected = match self.make_writable(target) {
            Ok(was) => was,
            Err(outcome) => return outcome,
        };
        if let Err(outcome) = self.clear_read_only(target) {
            return outcome;
        }

        let restored = self.backups.restore_backup(target);
        if !restored.ok {
            return restored;
        }

        // The copied backup may carry attribute bits of its own.
        let mut warnings = Vec::new();
        if self.protection.is_protected(target) {
            let cleared = self.protection.unprotect(target);
            if !cleared.ok {
                warnings.push(cleared.message);
            }
        }

        let mut message = restored.message;
        if was_protected {
            message.push_str(" | Protection removed");
        }
        let mut outcome = OpOutcome::success(message);
        outcome.warnings = warnings;
        outcome
    }

    fn unprotect(&self, target: &Path) -> OpOutcome {
        self.protection.unprotect(target)
    }
}
