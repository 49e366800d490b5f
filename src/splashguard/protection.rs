//! # Protection
//!
//! Applies and removes the composite "protected" state on a target:
//!
//! 1. read-only attribute: required, its failure fails the call
//! 2. hidden + system attributes: best effort, where the host supports them
//! 3. deny-write access control: best effort, only in an elevated session
//!
//! Protection state is never stored. [`ProtectionManager::is_protected`] asks the
//! attribute layer every time, and the settings registry is only a hint used for
//! bulk cleanup. Successful transitions emit a [`RegistryEvent`] without waiting
//! for anyone to consume it.

use crate::attributes::AttributeController;
use crate::model::{describe_mechanisms, ErrorKind, Mechanism, OpOutcome, ProtectionState};
use crate::privilege::PrivilegeQuery;
use crate::registry::{RegistryEvent, RegistryNotifier};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, info, warn};

/// Result of [`ProtectionManager::protect`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectReport {
    pub outcome: OpOutcome,
    pub mechanisms: BTreeSet<Mechanism>,
}

impl ProtectReport {
    pub fn ok(&self) -> bool {
        self.outcome.ok
    }
}

pub struct ProtectionManager<A: AttributeController, P: PrivilegeQuery> {
    attrs: A,
    privilege: P,
    registry: RegistryNotifier,
}

impl<A: AttributeController, P: PrivilegeQuery> ProtectionManager<A, P> {
    pub fn new(attrs: A, privilege: P, registry: RegistryNotifier) -> Self {
        Self {
            attrs,
            privilege,
            registry,
        }
    }

    pub fn attributes(&self) -> &A {
        &self.attrs
    }

    pub fn protect(&self, path: &Path) -> ProtectReport {
        let mut mechanisms = BTreeSet::new();

        if let Err(e) = self.attrs.set_read_only(path, true) {
            warn!(path = %path.display(), error = %e, "read-only protection failed");
            return ProtectReport {
                outcome: OpOutcome::from_error("Protection failed", &e),
                mechanisms,
            };
        }
        mechanisms.insert(Mechanism::ReadOnly);

        let caps = self.attrs.capabilities();
        let mut warnings = Vec::new();

        if caps.hidden_system {
            match self.attrs.set_hidden_system(path, true) {
                Ok(()) => {
                    mechanisms.insert(Mechanism::HiddenSystem);
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "hidden/system protection skipped");
                    warnings.push(format!("hidden/system not applied: {}", e));
                }
            }
        }

        if caps.access_control && self.privilege.is_elevated() {
            match self.attrs.restrict_access(path, true) {
                Ok(()) => {
                    mechanisms.insert(Mechanism::AccessControl);
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "access-control protection skipped");
                    warnings.push(format!("access control not applied: {}", e));
                }
            }
        }

        let mut message = format!("Protection enabled: {}", describe_mechanisms(&mechanisms));
        if !caps.hidden_system {
            message.push_str(" (host has no hidden/system attributes)");
        }

        info!(path = %path.display(), mechanisms = %describe_mechanisms(&mechanisms), "protected");
        self.registry
            .notify(RegistryEvent::Protected(path.to_path_buf()));

        let mut outcome = OpOutcome::success(message);
        outcome.warnings = warnings;
        ProtectReport {
            outcome,
            mechanisms,
        }
    }

    pub fn unprotect(&self, path: &Path) -> OpOutcome {
        if !path.exists() {
            return OpOutcome::failure(
                ErrorKind::NotFound,
                format!("File not found: {}", path.display()),
            );
        }

        let caps = self.attrs.capabilities();
        let mut warnings = Vec::new();

        // A deny-write entry also blocks attribute changes, so it goes first.
        if caps.access_control {
            if let Err(e) = self.attrs.restrict_access(path, false) {
                debug!(path = %path.display(), error = %e, "access control not restored");
                warnings.push(format!("access control not restored: {}", e));
            }
        }

        if let Err(e) = self.attrs.set_read_only(path, false) {
            warn!(path = %path.display(), error = %e, "could not clear read-only");
            return OpOutcome::from_error("Could not remove protection", &e);
        }

        if caps.hidden_system {
            if let Err(e) = self.attrs.set_hidden_system(path, false) {
                warn!(path = %path.display(), error = %e, "hidden/system not cleared");
                warnings.push(format!("hidden/system not cleared: {}", e));
            }
        }

        info!(path = %path.display(), "unprotected");
        self.registry
            .notify(RegistryEvent::Unprotected(path.to_path_buf()));

        let mut outcome = OpOutcome::success("Protection removed");
        outcome.warnings = warnings;
        outcome
    }

    /// True iff the path exists and is currently not writable.
    pub fn is_protected(&self, path: &Path) -> bool {
        path.exists() && matches!(self.attrs.is_writable(path), Ok(false))
    }

    pub fn state(&self, path: &Path) -> ProtectionState {
        if self.is_protected(path) {
            ProtectionState::Protected
        } else {
            ProtectionState::Unprotected
        }
    }
}
