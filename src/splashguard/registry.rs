//! Protected-file registry notifications.
//!
//! The protection manager emits these and moves on; whoever owns the settings
//! store drains them later. A full or closed channel never fails the
//! operation that produced the event.

use crate::settings::SettingsStore;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryEvent {
    Protected(PathBuf),
    Unprotected(PathBuf),
}

#[derive(Debug, Clone, Default)]
pub struct RegistryNotifier {
    tx: Option<Sender<RegistryEvent>>,
}

impl RegistryNotifier {
    /// A notifier plus the receiving end to drain with [`apply_pending`].
    pub fn channel() -> (Self, Receiver<RegistryEvent>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// Drops every event.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub fn notify(&self, event: RegistryEvent) {
        if let Some(tx) = &self.tx {
            if tx.send(event).is_err() {
                debug!("registry receiver gone; event dropped");
            }
        }
    }
}

/// Applies every queued event to `store`. Store failures are logged and
/// skipped. Returns the number of events applied successfully.
pub fn apply_pending<S: SettingsStore>(rx: &Receiver<RegistryEvent>, store: &mut S) -> usize {
    let mut applied = 0;
    for event in rx.try_iter() {
        let result = match &event {
            RegistryEvent::Protected(path) => store.add_protected_file(path),
            RegistryEvent::Unprotected(path) => store.remove_protected_file(path),
        };
        match result {
            Ok(()) => applied += 1,
            Err(e) => warn!(error = %e, ?event, "could not update protected-file registry"),
        }
    }
    applied
}
