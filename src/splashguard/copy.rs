use crate::error::{Result, SplashError};
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;
use tracing::debug;

/// Copies bytes and permissions from `src` onto `dst`, then carries over the
/// modification time when the destination can be opened for it.
pub fn copy_file(src: &Path, dst: &Path) -> Result<u64> {
    if !src.exists() {
        return Err(SplashError::NotFound(src.to_path_buf()));
    }
    // fs::copy onto itself truncates the file to zero bytes
    if same_file(src, dst) {
        return Err(SplashError::from_io(
            dst,
            io::Error::new(io::ErrorKind::InvalidInput, "source and destination are the same file"),
        ));
    }
    let bytes = fs::copy(src, dst).map_err(|e| {
        // fs::copy does not say which side failed
        if e.kind() == io::ErrorKind::NotFound {
            SplashError::NotFound(dst.to_path_buf())
        } else {
            SplashError::from_io(dst, e)
        }
    })?;

    if let Ok(modified) = fs::metadata(src).and_then(|m| m.modified()) {
        let result = OpenOptions::new()
            .write(true)
            .open(dst)
            .and_then(|f| f.set_modified(modified));
        if let Err(e) = result {
            debug!(dst = %dst.display(), error = %e, "modification time not preserved");
        }
    }

    Ok(bytes)
}

/// True when both paths resolve to the same file. Paths that cannot be
/// resolved never match.
pub fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Opens `path` for appending and closes it again without writing.
pub fn check_write(path: &Path) -> Result<()> {
    OpenOptions::new()
        .append(true)
        .open(path)
        .map(|_: File| ())
        .map_err(|e| SplashError::from_io(path, e))
}
