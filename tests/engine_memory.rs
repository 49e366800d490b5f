//! Engine runs against the in-memory attribute layer, so the hidden/system and
//! access-control paths are covered on every host.
//!
//! Needs `--features test_utils`.

use splashguard::attributes::memory::{AttrBits, MemoryAttributes};
use splashguard::backup::BackupStore;
use splashguard::batch::BatchRunner;
use splashguard::privilege::FixedPrivilege;
use splashguard::protection::ProtectionManager;
use splashguard::registry::{RegistryEvent, RegistryNotifier};
use splashguard::replace::ReplaceEngine;
use splashguard::worker::{Job, Worker};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use tempfile::TempDir;

type Engine = ReplaceEngine<MemoryAttributes, FixedPrivilege>;

struct Setup {
    dir: TempDir,
    source: PathBuf,
    engine: Arc<Engine>,
    events: Receiver<RegistryEvent>,
}

impl Setup {
    fn new(elevated: bool) -> Self {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("logo.png");
        fs::write(&source, vec![7u8; 2048]).unwrap();

        let (notifier, events) = RegistryNotifier::channel();
        let protection =
            ProtectionManager::new(MemoryAttributes::new(), FixedPrivilege(elevated), notifier);
        let engine = Arc::new(ReplaceEngine::new(
            protection,
            BackupStore::new(dir.path().join("backups")),
        ));
        Self {
            dir,
            source,
            engine,
            events,
        }
    }

    fn target(&self, name: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, vec![1u8; 2048]).unwrap();
        path
    }

    fn bits(&self, path: &Path) -> AttrBits {
        self.engine.protection().attributes().bits(path)
    }
}

#[test]
fn elevated_replace_applies_every_mechanism() {
    let s = Setup::new(true);
    let a = s.target("a.png");
    let b = s.target("hdpi/a.png");
    let runner = BatchRunner::new(s.engine.clone());

    let result = runner.replace_all(&s.source, &[a.clone(), b.clone()], true);

    assert_eq!(result.succeeded, 2);
    for path in [&a, &b] {
        assert_eq!(
            s.bits(path),
            AttrBits {
                read_only: true,
                hidden: true,
                system: true,
                access_restricted: true,
            }
        );
    }
    assert!(result.files[0]
        .outcome
        .message
        .contains("read-only + hidden/system + access control"));
    let protected: Vec<_> = s
        .events
        .try_iter()
        .filter(|e| matches!(e, RegistryEvent::Protected(_)))
        .collect();
    assert_eq!(protected.len(), 2);

    // Both targets share a stem, so the second one reuses the first backup.
    assert_eq!(s.engine.backups().list_backups(&a).unwrap().len(), 1);
}

#[test]
fn without_elevation_access_control_is_left_off() {
    let s = Setup::new(false);
    let a = s.target("a.png");

    let result = BatchRunner::new(s.engine.clone()).replace_all(&s.source, &[a.clone()], true);

    assert_eq!(result.succeeded, 1);
    let bits = s.bits(&a);
    assert!(bits.read_only && bits.hidden && bits.system);
    assert!(!bits.access_restricted);
}

#[test]
fn worker_restore_clears_all_bits() {
    let s = Setup::new(true);
    let a = s.target("a.png");
    let worker = Worker::spawn(BatchRunner::new(s.engine.clone()));

    let replaced = worker
        .run(
            Job::ReplaceAll {
                source: s.source.clone(),
                targets: vec![a.clone()],
                protection_enabled: true,
            },
            |_| {},
        )
        .unwrap();
    assert_eq!(replaced.succeeded, 1);

    let mut seen = Vec::new();
    let restored = worker
        .run(Job::RestoreAll { targets: vec![a.clone()] }, |f| {
            seen.push(f.outcome.message.clone())
        })
        .unwrap();

    assert_eq!(restored.succeeded, 1);
    assert_eq!(seen.len(), 1);
    assert!(seen[0].contains("Protection removed"));
    assert_eq!(s.bits(&a), AttrBits::default());
    assert_eq!(fs::read(&a).unwrap(), vec![1u8; 2048]);
}

#[test]
fn source_listed_as_its_own_target_is_refused() {
    let s = Setup::new(false);
    let a = s.target("a.png");
    let runner = BatchRunner::new(s.engine.clone());

    let result = runner.replace_all(&s.source, &[a.clone(), s.source.clone()], true);

    assert_eq!(result.succeeded, 1);
    assert_eq!(result.failed, 1);
    assert_eq!(result.failed_names, vec!["logo.png".to_string()]);
    assert_eq!(fs::read(&s.source).unwrap(), vec![7u8; 2048]);
    assert_eq!(s.bits(&s.source), AttrBits::default());
}
