//! Where target paths come from.
//!
//! Locating vendor installations is not done here; a provider just hands the
//! engine a list, and an empty list means there is nothing to do.

use crate::error::{Result, SplashError};
use std::fs;
use std::path::{Path, PathBuf};

/// Splash images smaller than this are almost certainly not the real thing.
pub const MIN_TARGET_BYTES: u64 = 1024;

const HIGH_DPI_SUBDIR: &str = "hdpi";

pub trait PathProvider {
    fn target_paths(&self) -> Vec<PathBuf>;
}

/// A fixed list, returned as given.
#[derive(Debug, Clone, Default)]
pub struct ExplicitPaths(pub Vec<PathBuf>);

impl PathProvider for ExplicitPaths {
    fn target_paths(&self) -> Vec<PathBuf> {
        self.0.clone()
    }
}

/// Every `.png` directly inside a splash directory and its `hdpi/` subfolder.
#[derive(Debug, Clone)]
pub struct SplashDirectory(pub PathBuf);

impl PathProvider for SplashDirectory {
    fn target_paths(&self) -> Vec<PathBuf> {
        let mut paths = png_files(&self.0);
        paths.extend(png_files(&self.0.join(HIGH_DPI_SUBDIR)));
        paths
    }
}

fn is_png(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
}

fn png_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && is_png(p))
        .collect();
    files.sort();
    files
}

/// Picks a provider for a saved target: a directory is a splash directory,
/// anything else a single file.
pub fn provider_for(path: &Path) -> Box<dyn PathProvider> {
    if path.is_dir() {
        Box::new(SplashDirectory(path.to_path_buf()))
    } else {
        Box::new(ExplicitPaths(vec![path.to_path_buf()]))
    }
}

/// Checks that `path` looks like a splash image worth replacing.
pub fn validate_target(path: &Path) -> Result<()> {
    let invalid = |reason: &str| Err(SplashError::Api(format!("{}: {}", reason, path.display())));

    if path.as_os_str().is_empty() {
        return Err(SplashError::Api("Target path is empty".into()));
    }
    if !path.exists() {
        return Err(SplashError::NotFound(path.to_path_buf()));
    }
    if !path.is_file() {
        return invalid("Not a file");
    }
    if !is_png(path) {
        return invalid("Not a PNG file");
    }
    let meta = fs::metadata(path).map_err(|e| SplashError::from_io(path, e))?;
    if meta.len() < MIN_TARGET_BYTES {
        return invalid("File too small to be a splash image");
    }
    Ok(())
}
