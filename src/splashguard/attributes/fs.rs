use super::{AttributeController, Capabilities};
use crate::error::{Result, SplashError};
use std::fs;
use std::path::Path;

/// Host attribute controller.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsAttributes;

impl FsAttributes {
    pub fn new() -> Self {
        Self
    }
}

fn ensure_exists(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(SplashError::NotFound(path.to_path_buf()))
    }
}

impl AttributeController for FsAttributes {
    fn is_writable(&self, path: &Path) -> Result<bool> {
        let meta = fs::metadata(path).map_err(|e| SplashError::from_io(path, e))?;
        Ok(!meta.permissions().readonly())
    }

    fn set_read_only(&self, path: &Path, on: bool) -> Result<()> {
        ensure_exists(path)?;
        platform::set_read_only(path, on)
    }

    fn set_hidden_system(&self, path: &Path, on: bool) -> Result<()> {
        ensure_exists(path)?;
        platform::set_hidden_system(path, on)
    }

    fn restrict_access(&self, path: &Path, on: bool) -> Result<()> {
        ensure_exists(path)?;
        platform::restrict_access(path, on)
    }

    fn capabilities(&self) -> Capabilities {
        platform::CAPABILITIES
    }
}

#[cfg(windows)]
mod platform {
    use super::Capabilities;
    use crate::error::{Result, SplashError};
    use std::path::Path;
    use std::process::Command;
    use windows::core::PCWSTR;
    use windows::Win32::Storage::FileSystem::{
        GetFileAttributesW, SetFileAttributesW, FILE_ATTRIBUTE_HIDDEN, FILE_ATTRIBUTE_NORMAL,
        FILE_ATTRIBUTE_READONLY, FILE_ATTRIBUTE_SYSTEM, FILE_FLAGS_AND_ATTRIBUTES,
        INVALID_FILE_ATTRIBUTES,
    };

    pub const CAPABILITIES: Capabilities = Capabilities {
        hidden_system: true,
        access_control: true,
    };

    /// Well-known SID for Everyone.
    const EVERYONE_SID: &str = "*S-1-1-0";

    fn to_wide(path: &Path) -> Vec<u16> {
        use std::os::windows::ffi::OsStrExt;
        path.as_os_str().encode_wide().chain(Some(0)).collect()
    }

    fn read_attrs(path: &Path) -> Result<u32> {
        let wide = to_wide(path);
        let attrs = unsafe { GetFileAttributesW(PCWSTR(wide.as_ptr())) };
        if attrs == INVALID_FILE_ATTRIBUTES {
            return Err(SplashError::from_attribute_io(
                path,
                std::io::Error::last_os_error(),
            ));
        }
        Ok(attrs)
    }

    fn update_attrs(path: &Path, mask: u32, on: bool) -> Result<()> {
        let current = read_attrs(path)?;
        let mut next = if on { current | mask } else { current & !mask };
        if next == 0 {
            next = FILE_ATTRIBUTE_NORMAL.0;
        }
        if next == current {
            return Ok(());
        }
        let wide = to_wide(path);
        unsafe { SetFileAttributesW(PCWSTR(wide.as_ptr()), FILE_FLAGS_AND_ATTRIBUTES(next)) }
            .map_err(|_| SplashError::from_attribute_io(path, std::io::Error::last_os_error()))
    }

    pub fn set_read_only(path: &Path, on: bool) -> Result<()> {
        update_attrs(path, FILE_ATTRIBUTE_READONLY.0, on)
    }

    pub fn set_hidden_system(path: &Path, on: bool) -> Result<()> {
        update_attrs(
            path,
            FILE_ATTRIBUTE_HIDDEN.0 | FILE_ATTRIBUTE_SYSTEM.0,
            on,
        )
    }

    pub fn restrict_access(path: &Path, on: bool) -> Result<()> {
        let mut cmd = Command::new("icacls");
        cmd.arg(path);
        if on {
            cmd.args(["/deny", &format!("{}:(W,D,WDAC,WO)", EVERYONE_SID)]);
        } else {
            cmd.args(["/remove:d", EVERYONE_SID]);
        }
        let output = cmd.output().map_err(|e| SplashError::from_io(path, e))?;
        if output.status.success() {
            Ok(())
        } else {
            Err(SplashError::Attribute {
                path: path.to_path_buf(),
                code: output.status.code().unwrap_or(-1),
            })
        }
    }
}

#[cfg(not(windows))]
mod platform {
    use super::Capabilities;
    use crate::error::{Result, SplashError};
    use std::fs;
    use std::path::Path;

    pub const CAPABILITIES: Capabilities = Capabilities {
        hidden_system: false,
        access_control: false,
    };

    pub fn set_read_only(path: &Path, on: bool) -> Result<()> {
        let meta = fs::metadata(path).map_err(|e| SplashError::from_io(path, e))?;
        let mut perms = meta.permissions();
        if perms.readonly() == on {
            return Ok(());
        }
        if on {
            perms.set_readonly(true);
        } else {
            // Owner write only; `set_readonly(false)` would make the file world-writable.
            use std::os::unix::fs::PermissionsExt;
            perms.set_mode(perms.mode() | 0o200);
        }
        fs::set_permissions(path, perms).map_err(|e| SplashError::from_attribute_io(path, e))
    }

    pub fn set_hidden_system(_path: &Path, _on: bool) -> Result<()> {
        Ok(())
    }

    pub fn restrict_access(_path: &Path, _on: bool) -> Result<()> {
        Ok(())
    }
}
