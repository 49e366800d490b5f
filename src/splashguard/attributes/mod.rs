//! # Attribute Layer
//!
//! The lowest layer of the engine: reading and flipping the filesystem attribute
//! bits that make up "protection". Everything above this module talks to the
//! [`AttributeController`] trait, never to the OS directly.
//!
//! ## Implementations
//!
//! - [`fs::FsAttributes`]: the host implementation.
//!   - Windows: `FILE_ATTRIBUTE_READONLY`, `_HIDDEN`, `_SYSTEM` through Win32, and
//!     a deny-write ACE for Everyone through `icacls`.
//!   - Other hosts: read-only through permission bits. Hidden/system and access
//!     control are reported as unsupported via [`Capabilities`], and their setters
//!     are no-ops that succeed, so callers above degrade without branching.
//!
//! - `memory::MemoryAttributes` (tests and the `test_utils` feature): attribute
//!   bits held in memory for files that really exist on disk, with fault
//!   injection for each primitive.
//!
//! ## Writability
//!
//! `is_writable` answers from the attribute state, not from the effective access
//! of the current principal, so the answer is the same for an administrator or
//! root as for a regular user.

use crate::error::Result;
use std::path::Path;

pub mod fs;
#[cfg(any(test, feature = "test_utils"))]
pub mod memory;

/// Which optional attribute mechanisms a controller can really apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub hidden_system: bool,
    pub access_control: bool,
}

/// Platform file-attribute primitive.
///
/// Every method fails with `SplashError::NotFound` when the path does not exist,
/// and with `SplashError::Attribute` (carrying the OS code) when the OS rejects
/// the call for a reason other than permissions.
pub trait AttributeController {
    /// False when the read-only attribute is set.
    fn is_writable(&self, path: &Path) -> Result<bool>;

    fn set_read_only(&self, path: &Path, on: bool) -> Result<()>;

    /// Hidden + system bits together. A no-op success where unsupported.
    fn set_hidden_system(&self, path: &Path, on: bool) -> Result<()>;

    /// Deny writes through the access-control list. A no-op success where
    /// unsupported. Callers gate this on elevated privileges.
    fn restrict_access(&self, path: &Path, on: bool) -> Result<()>;

    fn capabilities(&self) -> Capabilities;

    /// Opens the file for writing without changing it. Fails with
    /// `SplashError::PermissionDenied` when the OS refuses write access.
    fn check_write(&self, path: &Path) -> Result<()> {
        crate::copy::check_write(path)
    }
}
