use super::{AttributeController, Capabilities};
use crate::error::{Result, SplashError};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttrBits {
    pub read_only: bool,
    pub hidden: bool,
    pub system: bool,
    pub access_restricted: bool,
}

/// Which primitive a fault should be injected into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttrOp {
    ReadOnly,
    HiddenSystem,
    RestrictAccess,
    /// The write-access check before a copy. Never recorded in `calls`.
    WriteCheck,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    Permission,
    Attribute(i32),
}

/// Ignores poisoning.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Attribute bits kept in memory for files that exist on disk.
///
/// Behaves like a host with every mechanism available unless told otherwise.
/// Existence is still checked against the real filesystem so the engine's
/// NotFound paths are exercised.
#[derive(Debug)]
pub struct MemoryAttributes {
    bits: Mutex<HashMap<PathBuf, AttrBits>>,
    faults: Mutex<HashMap<AttrOp, Fault>>,
    calls: Mutex<Vec<(AttrOp, PathBuf, bool)>>,
    capabilities: Capabilities,
}

impl Default for MemoryAttributes {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryAttributes {
    pub fn new() -> Self {
        Self {
            bits: Mutex::new(HashMap::new()),
            faults: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            capabilities: Capabilities {
                hidden_system: true,
                access_control: true,
            },
        }
    }

    /// A host without hidden/system bits or ACLs.
    pub fn read_only_host() -> Self {
        Self {
            capabilities: Capabilities {
                hidden_system: false,
                access_control: false,
            },
            ..Self::new()
        }
    }

    pub fn preset(&self, path: &Path, bits: AttrBits) {
        lock(&self.bits).insert(path.to_path_buf(), bits);
    }

    pub fn bits(&self, path: &Path) -> AttrBits {
        lock(&self.bits).get(path).copied().unwrap_or_default()
    }

    pub fn fail(&self, op: AttrOp, fault: Fault) {
        lock(&self.faults).insert(op, fault);
    }

    pub fn clear_faults(&self) {
        lock(&self.faults).clear();
    }

    /// Every setter call made so far, in order.
    pub fn calls(&self) -> Vec<(AttrOp, PathBuf, bool)> {
        lock(&self.calls).clone()
    }

    fn apply(&self, op: AttrOp, path: &Path, on: bool) -> Result<()> {
        if !path.exists() {
            return Err(SplashError::NotFound(path.to_path_buf()));
        }
        lock(&self.calls).push((op, path.to_path_buf(), on));
        self.check_fault(op, path)?;

        let mut map = lock(&self.bits);
        let entry = map.entry(path.to_path_buf()).or_default();
        match op {
            AttrOp::ReadOnly => entry.read_only = on,
            AttrOp::HiddenSystem => {
                if self.capabilities.hidden_system {
                    entry.hidden = on;
                    entry.system = on;
                }
            }
            AttrOp::RestrictAccess => {
                if self.capabilities.access_control {
                    entry.access_restricted = on;
                }
            }
            AttrOp::WriteCheck => {}
        }
        Ok(())
    }

    fn check_fault(&self, op: AttrOp, path: &Path) -> Result<()> {
        match lock(&self.faults).get(&op).copied() {
            None => Ok(()),
            Some(Fault::Permission) => Err(SplashError::PermissionDenied {
                path: path.to_path_buf(),
                source: io::Error::from(io::ErrorKind::PermissionDenied),
            }),
            Some(Fault::Attribute(code)) => Err(SplashError::Attribute {
                path: path.to_path_buf(),
                code,
            }),
        }
    }
}

impl AttributeController for MemoryAttributes {
    fn is_writable(&self, path: &Path) -> Result<bool> {
        if !path.exists() {
            return Err(SplashError::NotFound(path.to_path_buf()));
        }
        let bits = self.bits(path);
        Ok(!bits.read_only && !bits.access_restricted)
    }

    fn set_read_only(&self, path: &Path, on: bool) -> Result<()> {
        self.apply(AttrOp::ReadOnly, path, on)
    }

    fn set_hidden_system(&self, path: &Path, on: bool) -> Result<()> {
        self.apply(AttrOp::HiddenSystem, path, on)
    }

    fn restrict_access(&self, path: &Path, on: bool) -> Result<()> {
        self.apply(AttrOp::RestrictAccess, path, on)
    }

    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn check_write(&self, path: &Path) -> Result<()> {
        self.check_fault(AttrOp::WriteCheck, path)?;
        crate::copy::check_write(path)
    }
}
