//! # API Facade
//!
//! The single entry point for every splashguard operation. It owns the engine,
//! the batch worker and the settings store, resolves which targets a call
//! applies to, and dispatches to `commands/*.rs`.
//!
//! The facade does no printing and holds no business logic. It is generic over
//! the attribute layer and the privilege query:
//! - Production: `SplashApi<FsAttributes, ProcessPrivilege>`
//! - Testing: `SplashApi<MemoryAttributes, FixedPrivilege>`
//!
//! ## Registry
//!
//! Protection changes reach the settings store as queued [`RegistryEvent`]s.
//! Every mutating call drains the queue before returning, so the registry is
//! current once the call completes even though the engine never waited on it.

use crate::attributes::AttributeController;
use crate::backup::BackupStore;
use crate::batch::{BatchRunner, CancelToken};
use crate::commands::{self, CmdResult};
use crate::error::Result;
use crate::model::FileOutcome;
use crate::privilege::PrivilegeQuery;
use crate::protection::ProtectionManager;
use crate::registry::{apply_pending, RegistryEvent, RegistryNotifier};
use crate::replace::ReplaceEngine;
use crate::settings::{JsonSettings, SettingsStore};
use crate::targets::{provider_for, ExplicitPaths, PathProvider, SplashDirectory};
use crate::worker::Worker;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use tracing::debug;

pub use crate::commands::config::ConfigAction;
pub use crate::commands::target::TargetAction;
pub use crate::commands::{CmdMessage, MessageLevel, TargetStatus};

/// Where a command's targets come from when none are named explicitly.
#[derive(Debug, Clone, Default)]
pub struct TargetSelection {
    pub paths: Vec<PathBuf>,
    pub dir: Option<PathBuf>,
}

impl TargetSelection {
    pub fn new(paths: Vec<PathBuf>, dir: Option<PathBuf>) -> Self {
        Self { paths, dir }
    }
}

type SharedEngine<A, P> = Arc<ReplaceEngine<A, P>>;

pub struct SplashApi<A, P>
where
    A: AttributeController + Send + Sync + 'static,
    P: PrivilegeQuery + Send + Sync + 'static,
{
    runner: BatchRunner<SharedEngine<A, P>>,
    worker: Worker,
    settings: JsonSettings,
    registry: Receiver<RegistryEvent>,
}

impl<A, P> SplashApi<A, P>
where
    A: AttributeController + Send + Sync + 'static,
    P: PrivilegeQuery + Send + Sync + 'static,
{
    pub fn new(attrs: A, privilege: P, settings: JsonSettings) -> Self {
        let (notifier, registry) = RegistryNotifier::channel();
        let protection = ProtectionManager::new(attrs, privilege, notifier);
        let backups = BackupStore::new(settings.backup_dir());
        let engine = Arc::new(ReplaceEngine::new(protection, backups));

        Self {
            runner: BatchRunner::new(engine.clone()),
            worker: Worker::spawn(BatchRunner::new(engine)),
            settings,
            registry,
        }
    }

    fn engine(&self) -> &ReplaceEngine<A, P> {
        self.runner.engine()
    }

    pub fn settings(&self) -> &JsonSettings {
        &self.settings
    }

    /// Token for cancelling the batch currently on the worker.
    pub fn cancel_token(&self) -> CancelToken {
        self.worker.cancel_token()
    }

    /// Explicit paths win, then a splash directory, then the saved target.
    pub fn resolve_targets(&self, selection: &TargetSelection) -> Vec<PathBuf> {
        if !selection.paths.is_empty() {
            return ExplicitPaths(selection.paths.clone()).target_paths();
        }
        if let Some(dir) = &selection.dir {
            return SplashDirectory(dir.clone()).target_paths();
        }
        match &self.settings.settings().target_path {
            Some(saved) => provider_for(saved).target_paths(),
            None => Vec::new(),
        }
    }

    /// `protection` overrides the saved "protection enabled" flag.
    pub fn replace<F: FnMut(&FileOutcome)>(
        &mut self,
        source: &Path,
        selection: &TargetSelection,
        protection: Option<bool>,
        on_file: F,
    ) -> Result<CmdResult> {
        let targets = self.resolve_targets(selection);
        let enabled = protection.unwrap_or_else(|| self.settings.file_protection_enabled());
        let result = commands::replace::run(&self.worker, source, targets, enabled, on_file);
        self.sync_registry();
        result
    }

    pub fn restore<F: FnMut(&FileOutcome)>(
        &mut self,
        selection: &TargetSelection,
        on_file: F,
    ) -> Result<CmdResult> {
        let targets = self.resolve_targets(selection);
        let result = commands::restore::run(&self.worker, targets, on_file);
        self.sync_registry();
        result
    }

    pub fn protect(&mut self, paths: &[PathBuf]) -> Result<CmdResult> {
        let result = commands::protect::protect(self.engine().protection(), paths);
        self.sync_registry();
        result
    }

    pub fn unprotect(&mut self, paths: &[PathBuf]) -> Result<CmdResult> {
        let result = commands::protect::unprotect(self.engine().protection(), paths);
        self.sync_registry();
        result
    }

    /// Unprotects every registered file plus any protected file under the
    /// saved target path, which may have been protected outside this tool.
    pub fn unprotect_all<F: FnMut(&FileOutcome)>(&mut self, on_file: F) -> Result<CmdResult> {
        let mut paths = self.settings.protected_files();
        let protection = self.engine().protection();
        for path in self.resolve_targets(&TargetSelection::default()) {
            if protection.is_protected(&path) && !paths.contains(&path) {
                paths.push(path);
            }
        }

        let result = commands::protect::unprotect_all(&self.runner, &paths, on_file);
        self.sync_registry();
        result
    }

    pub fn status(&self, selection: &TargetSelection) -> Result<CmdResult> {
        commands::status::run(self.engine(), &self.resolve_targets(selection))
    }

    pub fn backups(&self, selection: &TargetSelection) -> Result<CmdResult> {
        commands::backups::run(self.engine().backups(), &self.resolve_targets(selection))
    }

    pub fn target(&mut self, action: TargetAction) -> Result<CmdResult> {
        commands::target::run(&mut self.settings, action)
    }

    pub fn config(&mut self, action: ConfigAction) -> Result<CmdResult> {
        commands::config::run(&mut self.settings, action)
    }

    fn sync_registry(&mut self) {
        let applied = apply_pending(&self.registry, &mut self.settings);
        if applied > 0 {
            debug!(applied, "protected-file registry updated");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::memory::MemoryAttributes;
    use crate::privilege::FixedPrivilege;
    use std::fs;
    use tempfile::TempDir;

    struct Harness {
        dir: TempDir,
        api: SplashApi<MemoryAttributes, FixedPrivilege>,
    }

    impl Harness {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let settings = JsonSettings::load(dir.path().join("home"));
            let api = SplashApi::new(MemoryAttributes::new(), FixedPrivilege(false), settings);
            Self { dir, api }
        }

        fn file(&self, name: &str, len: usize) -> PathBuf {
            let p = self.dir.path().join(name);
            fs::create_dir_all(p.parent().unwrap()).unwrap();
            fs::write(&p, vec![1u8; len]).unwrap();
            p
        }
    }

    #[test]
    fn explicit_paths_take_precedence() {
        let h = Harness::new();
        let a = h.file("splash/a.png", 10);
        h.file("splash/b.png", 10);

        let selection = TargetSelection::new(vec![a.clone()], Some(h.dir.path().join("splash")));
        assert_eq!(h.api.resolve_targets(&selection), vec![a]);
    }

    #[test]
    fn falls_back_to_saved_target_directory() {
        let mut h = Harness::new();
        let a = h.file("splash/a.png", 10);
        let hdpi = h.file("splash/hdpi/a.png", 10);
        h.api
            .target(TargetAction::Set(h.dir.path().join("splash")))
            .unwrap();

        assert_eq!(
            h.api.resolve_targets(&TargetSelection::default()),
            vec![a, hdpi]
        );
    }

    #[test]
    fn replace_registers_protected_files() {
        let mut h = Harness::new();
        let source = h.file("logo.png", 2048);
        let target = h.file("splash/a.png", 2048);

        let result = h
            .api
            .replace(
                &source,
                &TargetSelection::new(vec![target.clone()], None),
                None,
                |_| {},
            )
            .unwrap();

        assert!(!result.has_errors());
        assert_eq!(h.api.settings().protected_files(), vec![target.clone()]);
        assert_eq!(
            JsonSettings::load(h.dir.path().join("home")).protected_files(),
            vec![target]
        );
    }

    #[test]
    fn protection_override_skips_protect() {
        let mut h = Harness::new();
        let source = h.file("logo.png", 2048);
        let target = h.file("a.png", 2048);

        let result = h
            .api
            .replace(
                &source,
                &TargetSelection::new(vec![target.clone()], None),
                Some(false),
                |_| {},
            )
            .unwrap();

        let batch = result.batch.unwrap();
        assert!(batch.files[0].outcome.message.contains("Protection skipped"));
        assert!(h.api.settings().protected_files().is_empty());
    }

    #[test]
    fn restore_deregisters() {
        let mut h = Harness::new();
        let source = h.file("logo.png", 2048);
        let target = h.file("a.png", 2048);
        let selection = TargetSelection::new(vec![target.clone()], None);

        h.api.replace(&source, &selection, Some(true), |_| {}).unwrap();
        assert_eq!(h.api.settings().protected_files().len(), 1);

        let result = h.api.restore(&selection, |_| {}).unwrap();
        assert!(!result.has_errors());
        assert!(h.api.settings().protected_files().is_empty());
        assert_eq!(fs::read(&target).unwrap(), vec![1u8; 2048]);
    }

    #[test]
    fn unprotect_all_clears_registry_and_saved_target() {
        let mut h = Harness::new();
        let registered = h.file("a.png", 2048);
        let unregistered = h.file("splash/b.png", 2048);
        h.api.protect(&[registered.clone()]).unwrap();
        h.api.engine().protection().protect(&unregistered);
        // The direct call above bypassed the facade; drop its queued event.
        h.api.registry.try_iter().for_each(drop);
        h.api
            .target(TargetAction::Set(h.dir.path().join("splash")))
            .unwrap();

        let mut reported = Vec::new();
        let result = h
            .api
            .unprotect_all(|f| reported.push(f.target.display_name()))
            .unwrap();

        reported.sort();
        assert_eq!(reported, vec!["a.png", "b.png"]);

        assert_eq!(result.batch.unwrap().succeeded, 2);
        assert!(h.api.settings().protected_files().is_empty());
        assert!(!h.api.engine().protection().is_protected(&unregistered));
    }

    #[test]
    fn empty_selection_is_nothing_to_do() {
        let mut h = Harness::new();
        let source = h.file("logo.png", 2048);

        let result = h
            .api
            .replace(&source, &TargetSelection::default(), None, |_| {})
            .unwrap();
        assert!(!result.has_errors());
        assert!(result.batch.unwrap().is_empty());
    }
}
