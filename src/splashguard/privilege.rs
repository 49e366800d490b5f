//! Elevated-session check, injected rather than called as a global so callers
//! (and tests) decide whether the strongest protection layer is attempted.

pub trait PrivilegeQuery {
    fn is_elevated(&self) -> bool;
}

/// Asks the OS about the current process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessPrivilege;

impl PrivilegeQuery for ProcessPrivilege {
    fn is_elevated(&self) -> bool {
        platform::is_elevated()
    }
}

/// A fixed answer, for tests and for callers that already know.
#[derive(Debug, Clone, Copy)]
pub struct FixedPrivilege(pub bool);

impl PrivilegeQuery for FixedPrivilege {
    fn is_elevated(&self) -> bool {
        self.0
    }
}

#[cfg(windows)]
mod platform {
    use windows::Win32::Foundation::{CloseHandle, HANDLE};
    use windows::Win32::Security::{
        GetTokenInformation, TokenElevation, TOKEN_ELEVATION, TOKEN_QUERY,
    };
    use windows::Win32::System::Threading::{GetCurrentProcess, OpenProcessToken};

    pub fn is_elevated() -> bool {
        unsafe {
            let mut token = HANDLE::default();
            if OpenProcessToken(GetCurrentProcess(), TOKEN_QUERY, &mut token).is_err() {
                return false;
            }

            let mut elevation = TOKEN_ELEVATION::default();
            let mut return_length = 0u32;
            let result = GetTokenInformation(
                token,
                TokenElevation,
                Some(&mut elevation as *mut _ as *mut _),
                std::mem::size_of::<TOKEN_ELEVATION>() as u32,
                &mut return_length,
            );

            let _ = CloseHandle(token);
            result.is_ok() && elevation.TokenIsElevated != 0
        }
    }
}

#[cfg(not(windows))]
mod platform {
    /// Access control is only applied on Windows, so other hosts never report
    /// an elevated session to the engine.
    pub fn is_elevated() -> bool {
        false
    }
}
