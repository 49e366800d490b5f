use crate::model::ErrorKind;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SplashError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Permission denied: {}: {source}", path.display())]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Attribute change rejected for {} (os error {code})", path.display())]
    Attribute { path: PathBuf, code: i32 },

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Api Error: {0}")]
    Api(String),
}

impl SplashError {
    /// Classify an OS error raised while touching `path`.
    pub fn from_io(path: impl AsRef<Path>, source: io::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        match source.kind() {
            io::ErrorKind::NotFound => SplashError::NotFound(path),
            io::ErrorKind::PermissionDenied => SplashError::PermissionDenied { path, source },
            _ => SplashError::Io { path, source },
        }
    }

    /// Like [`SplashError::from_io`], but anything that is not a missing file or a
    /// permission problem is reported as a rejected attribute call.
    pub fn from_attribute_io(path: impl AsRef<Path>, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => {
                Self::from_io(path, source)
            }
            _ => SplashError::Attribute {
                path: path.as_ref().to_path_buf(),
                code: source.raw_os_error().unwrap_or(-1),
            },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            SplashError::NotFound(_) => ErrorKind::NotFound,
            SplashError::PermissionDenied { .. } => ErrorKind::Permission,
            SplashError::Attribute { .. } => ErrorKind::Attribute,
            SplashError::Io { .. }
            | SplashError::Settings(_)
            | SplashError::Serialization(_)
            | SplashError::Api(_) => ErrorKind::Io,
        }
    }

    pub fn is_permission(&self) -> bool {
        self.kind() == ErrorKind::Permission
    }
}

pub type Result<T> = std::result::Result<T, SplashError>;
