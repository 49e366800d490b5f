use crate::error::{Result, SplashError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

const SETTINGS_FILENAME: &str = "config.json";
const DEFAULT_BACKUP_DIRNAME: &str = "backups";
const MAX_PATH_HISTORY: usize = 5;

/// What the engine needs from persisted settings.
///
/// Writes are best-effort from the engine's point of view: callers log and
/// drop errors rather than failing a protect/unprotect/replace.
pub trait SettingsStore {
    fn file_protection_enabled(&self) -> bool;
    fn protected_files(&self) -> Vec<PathBuf>;
    fn add_protected_file(&mut self, path: &Path) -> Result<()>;
    fn remove_protected_file(&mut self, path: &Path) -> Result<()>;
}

/// Settings stored in `<settings dir>/config.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Settings {
    #[serde(default = "default_true")]
    pub file_protection_enabled: bool,

    #[serde(default)]
    pub protected_files: Vec<PathBuf>,

    /// Last-used target: a single image or a splash directory.
    #[serde(default)]
    pub target_path: Option<PathBuf>,

    /// Most recent first.
    #[serde(default)]
    pub target_path_history: Vec<PathBuf>,

    /// Overrides `<settings dir>/backups`.
    #[serde(default)]
    pub backup_dir: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            file_protection_enabled: true,
            protected_files: Vec::new(),
            target_path: None,
            target_path_history: Vec::new(),
            backup_dir: None,
        }
    }
}

impl Settings {
    pub fn set_target_path(&mut self, path: Option<PathBuf>) {
        if let Some(path) = &path {
            self.target_path_history.retain(|p| p != path);
            self.target_path_history.insert(0, path.clone());
            self.target_path_history.truncate(MAX_PATH_HISTORY);
        }
        self.target_path = path;
    }

    pub fn set_file_protection_enabled(&mut self, enabled: bool) {
        self.file_protection_enabled = enabled;
    }

    pub fn path_history(&self) -> &[PathBuf] {
        &self.target_path_history
    }

    /// Drops history entries that no longer exist. Returns how many were removed.
    pub fn clear_invalid_history(&mut self) -> usize {
        let before = self.target_path_history.len();
        self.target_path_history.retain(|p| p.exists());
        before - self.target_path_history.len()
    }

    fn register(&mut self, path: &Path) {
        if !self.protected_files.iter().any(|p| p == path) {
            self.protected_files.push(path.to_path_buf());
        }
    }

    fn deregister(&mut self, path: &Path) {
        self.protected_files.retain(|p| p != path);
    }
}

/// JSON-file backed settings. Every mutation is written through immediately.
#[derive(Debug, Clone)]
pub struct JsonSettings {
    dir: PathBuf,
    settings: Settings,
}

impl JsonSettings {
    /// Load settings from `dir`, or start from defaults if the file is missing
    /// or unreadable.
    pub fn load<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref().to_path_buf();
        let settings = match read_settings(&dir) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(error = %e, dir = %dir.display(), "could not load settings, using defaults");
                Settings::default()
            }
        };
        Self { dir, settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn backup_dir(&self) -> PathBuf {
        self.settings
            .backup_dir
            .clone()
            .unwrap_or_else(|| self.dir.join(DEFAULT_BACKUP_DIRNAME))
    }

    pub fn update<F: FnOnce(&mut Settings)>(&mut self, f: F) -> Result<()> {
        f(&mut self.settings);
        self.save()
    }

    pub fn save(&self) -> Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir).map_err(|e| SplashError::from_io(&self.dir, e))?;
        }
        let path = self.dir.join(SETTINGS_FILENAME);
        let content = serde_json::to_string_pretty(&self.settings)?;
        fs::write(&path, content).map_err(|e| SplashError::from_io(&path, e))?;
        Ok(())
    }
}

fn read_settings(dir: &Path) -> Result<Settings> {
    let path = dir.join(SETTINGS_FILENAME);
    if !path.exists() {
        return Ok(Settings::default());
    }
    let content = fs::read_to_string(&path).map_err(|e| SplashError::from_io(&path, e))?;
    Ok(serde_json::from_str(&content)?)
}

impl SettingsStore for JsonSettings {
    fn file_protection_enabled(&self) -> bool {
        self.settings.file_protection_enabled
    }

    fn protected_files(&self) -> Vec<PathBuf> {
        self.settings.protected_files.clone()
    }

    fn add_protected_file(&mut self, path: &Path) -> Result<()> {
        self.update(|s| s.register(path))
    }

    fn remove_protected_file(&mut self, path: &Path) -> Result<()> {
        self.update(|s| s.deregister(path))
    }
}

/// Non-persistent settings for tests; can be told to reject writes.
#[derive(Debug, Clone, Default)]
pub struct MemorySettings {
    pub settings: Settings,
    pub fail_writes: bool,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes {
            return Err(SplashError::Settings("settings are read-only".into()));
        }
        Ok(())
    }
}

impl SettingsStore for MemorySettings {
    fn file_protection_enabled(&self) -> bool {
        self.settings.file_protection_enabled
    }

    fn protected_files(&self) -> Vec<PathBuf> {
        self.settings.protected_files.clone()
    }

    fn add_protected_file(&mut self, path: &Path) -> Result<()> {
        self.check_writable()?;
        self.settings.register(path);
        Ok(())
    }

    fn remove_protected_file(&mut self, path: &Path) -> Result<()> {
        self.check_writable()?;
        self.settings.deregister(path);
        Ok(())
    }
}
