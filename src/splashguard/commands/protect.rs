use crate::attributes::AttributeController;
use crate::batch::BatchRunner;
use crate::commands::{file_message, summarize_batch, CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::{FileOutcome, TargetFile};
use crate::privilege::PrivilegeQuery;
use crate::protection::ProtectionManager;
use crate::replace::FileOperations;
use std::path::PathBuf;

pub fn protect<A: AttributeController, P: PrivilegeQuery>(
    manager: &ProtectionManager<A, P>,
    paths: &[PathBuf],
) -> Result<CmdResult> {
    let mut result = CmdResult::default();

    for path in paths {
        let target = TargetFile::new(path);
        if !target.exists() {
            result.add_message(CmdMessage::error(format!(
                "{}: File not found",
                target.display_name()
            )));
            continue;
        }
        let report = manager.protect(path);
        result.add_message(file_message(&FileOutcome {
            target,
            outcome: report.outcome,
        }));
    }

    Ok(result)
}

pub fn unprotect<A: AttributeController, P: PrivilegeQuery>(
    manager: &ProtectionManager<A, P>,
    paths: &[PathBuf],
) -> Result<CmdResult> {
    let mut result = CmdResult::default();

    for path in paths {
        let outcome = manager.unprotect(path);
        result.add_message(file_message(&FileOutcome {
            target: TargetFile::new(path),
            outcome,
        }));
    }

    Ok(result)
}

/// Unprotects every path in the registry. Vanished paths are skipped.
/// Per-file results go to `on_file`; only the summary lands in the messages.
pub fn unprotect_all<E: FileOperations, F: FnMut(&FileOutcome)>(
    runner: &BatchRunner<E>,
    registered: &[PathBuf],
    on_file: F,
) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    if registered.is_empty() {
        result.add_message(CmdMessage::info("No protected files are registered."));
        return Ok(result);
    }

    let batch = runner.unprotect_all_with(registered, on_file);
    for message in summarize_batch("Unprotected", &batch) {
        result.add_message(message);
    }
    Ok(result.with_batch(batch))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::memory::MemoryAttributes;
    use crate::backup::BackupStore;
    use crate::commands::MessageLevel;
    use crate::model::{ErrorKind, OpOutcome};
    use crate::privilege::FixedPrivilege;
    use crate::registry::{RegistryEvent, RegistryNotifier};
    use crate::replace::ReplaceEngine;
    use std::fs;
    use tempfile::TempDir;

    fn file(dir: &TempDir, name: &str) -> PathBuf {
        let p = dir.path().join(name);
        fs::write(&p, b"png").unwrap();
        p
    }

    #[test]
    fn protect_then_unprotect() {
        let dir = TempDir::new().unwrap();
        let a = file(&dir, "a.png");
        let (notifier, rx) = RegistryNotifier::channel();
        let manager = ProtectionManager::new(MemoryAttributes::new(), FixedPrivilege(true), notifier);

        let result = protect(&manager, &[a.clone()]).unwrap();
        assert!(!result.has_errors());
        assert!(result.messages[0].content.contains("Protection enabled"));
        assert!(manager.is_protected(&a));

        let result = unprotect(&manager, &[a.clone()]).unwrap();
        assert!(!result.has_errors());
        assert!(!manager.is_protected(&a));

        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            events,
            vec![RegistryEvent::Protected(a.clone()), RegistryEvent::Unprotected(a)]
        );
    }

    #[test]
    fn missing_paths_are_reported() {
        let dir = TempDir::new().unwrap();
        let manager = ProtectionManager::new(
            MemoryAttributes::new(),
            FixedPrivilege(false),
            RegistryNotifier::disabled(),
        );

        let result = protect(&manager, &[dir.path().join("gone.png")]).unwrap();
        assert_eq!(result.messages[0].level, MessageLevel::Error);
        let result = unprotect(&manager, &[dir.path().join("gone.png")]).unwrap();
        assert!(result.has_errors());
    }

    #[test]
    fn unprotect_all_skips_stale_registry_entries() {
        let dir = TempDir::new().unwrap();
        let a = file(&dir, "a.png");
        let engine = ReplaceEngine::new(
            ProtectionManager::new(
                MemoryAttributes::new(),
                FixedPrivilege(false),
                RegistryNotifier::disabled(),
            ),
            BackupStore::new(dir.path().join("backups")),
        );
        engine.protection().protect(&a);
        let runner = BatchRunner::new(engine);

        let mut seen = 0;
        let result =
            unprotect_all(&runner, &[a.clone(), dir.path().join("gone.png")], |_| seen += 1).unwrap();

        assert_eq!(seen, 1);

        let batch = result.batch.as_ref().unwrap();
        assert_eq!(batch.succeeded, 1);
        assert_eq!(batch.skipped, 1);
        assert!(!result.has_errors());
        assert!(!runner.engine().protection().is_protected(&a));
    }

    #[test]
    fn unprotect_all_with_empty_registry() {
        let dir = TempDir::new().unwrap();
        let engine = ReplaceEngine::new(
            ProtectionManager::new(
                MemoryAttributes::new(),
                FixedPrivilege(false),
                RegistryNotifier::disabled(),
            ),
            BackupStore::new(dir.path().join("backups")),
        );
        let result = unprotect_all(&BatchRunner::new(engine), &[], |_| {}).unwrap();
        assert!(result.batch.is_none());
        assert_eq!(result.messages[0].level, MessageLevel::Info);
    }

    /// Unprotect fails for stems starting with "locked".
    struct LockedOps;

    impl FileOperations for LockedOps {
        fn replace(&self, _: &std::path::Path, _: &std::path::Path, _: bool) -> OpOutcome {
            OpOutcome::success("Replaced")
        }

        fn restore(&self, _: &std::path::Path) -> OpOutcome {
            OpOutcome::success("Restored")
        }

        fn unprotect(&self, target: &std::path::Path) -> OpOutcome {
            if TargetFile::new(target).stem().starts_with("locked") {
                OpOutcome::failure(ErrorKind::Permission, "Access denied")
            } else {
                OpOutcome::success("Protection removed")
            }
        }
    }

    #[test]
    fn unprotect_all_partial_failure_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let a = file(&dir, "a.png");
        let locked = file(&dir, "locked.png");
        let runner = BatchRunner::new(LockedOps);

        let mut files = Vec::new();
        let result = unprotect_all(&runner, &[a, locked], |f| {
            files.push((f.target.display_name(), f.outcome.ok))
        })
        .unwrap();

        assert_eq!(
            files,
            vec![("a.png".to_string(), true), ("locked.png".to_string(), false)]
        );
        assert!(!result.has_errors());
        assert_eq!(result.messages[0].level, MessageLevel::Warning);
        assert_eq!(
            result.messages[0].content,
            "Unprotected 1 file(s), 1 failed: locked.png"
        );
    }
}
