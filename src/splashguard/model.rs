use crate::error::SplashError;
use chrono::NaiveDateTime;
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// Timestamp layout embedded in backup file names.
pub const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Failed file names kept in a [`BatchResult`] for display.
pub const MAX_REPORTED_FAILURES: usize = 5;

/// A candidate replacement destination. Existence is checked on demand, never cached.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetFile {
    path: PathBuf,
}

impl TargetFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// File name without its extension; the backup grouping key.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtectionState {
    Unprotected,
    Protected,
}

/// One layer of the composite "protected" state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Mechanism {
    ReadOnly,
    HiddenSystem,
    AccessControl,
}

impl fmt::Display for Mechanism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Mechanism::ReadOnly => "read-only",
            Mechanism::HiddenSystem => "hidden/system",
            Mechanism::AccessControl => "access control",
        };
        f.write_str(label)
    }
}

pub fn describe_mechanisms(mechanisms: &BTreeSet<Mechanism>) -> String {
    mechanisms
        .iter()
        .map(|m| m.to_string())
        .collect::<Vec<_>>()
        .join(" + ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorKind {
    #[default]
    None,
    Permission,
    NotFound,
    Attribute,
    Io,
}

/// Tagged result of every public engine operation.
///
/// `ok` with a non-empty `warnings` list is a success-with-warning (for example the
/// file was replaced but protection could not be re-applied).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpOutcome {
    pub ok: bool,
    pub message: String,
    pub kind: ErrorKind,
    pub warnings: Vec<String>,
}

impl OpOutcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
            kind: ErrorKind::None,
            warnings: Vec::new(),
        }
    }

    pub fn failure(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            kind,
            warnings: Vec::new(),
        }
    }

    /// Failure built from an error, prefixed with what was being attempted.
    pub fn from_error(context: &str, err: &SplashError) -> Self {
        Self::failure(err.kind(), format!("{}: {}", context, err))
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn is_permission_issue(&self) -> bool {
        self.kind == ErrorKind::Permission
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// A timestamped copy of a target, named `{stem}_{YYYYMMDD_HHMMSS}.png`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupRecord {
    pub path: PathBuf,
    pub file_name: String,
    pub created_at: Option<NaiveDateTime>,
}

impl BackupRecord {
    pub fn from_path(path: PathBuf) -> Self {
        let file_name = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let created_at = parse_backup_timestamp(&file_name);
        Self {
            path,
            file_name,
            created_at,
        }
    }
}

/// Reads the trailing timestamp out of a backup name. Stems may contain
/// underscores themselves, so the timestamp is taken from the end.
fn parse_backup_timestamp(file_name: &str) -> Option<NaiveDateTime> {
    let base = match file_name.rfind('.') {
        Some(dot) => &file_name[..dot],
        None => file_name,
    };
    // YYYYMMDD_HHMMSS
    let ts_len = 15;
    if base.len() <= ts_len || !base.is_char_boundary(base.len() - ts_len) {
        return None;
    }
    let (head, ts) = base.split_at(base.len() - ts_len);
    if !head.ends_with('_') {
        return None;
    }
    NaiveDateTime::parse_from_str(ts, BACKUP_TIMESTAMP_FORMAT).ok()
}

/// Outcome for one target within a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    pub target: TargetFile,
    pub outcome: OpOutcome,
}

/// Aggregate of a batch call. Overall success means at least one file succeeded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub failed_names: Vec<String>,
    pub permission_issue: bool,
    pub cancelled: bool,
    pub files: Vec<FileOutcome>,
}

impl BatchResult {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    pub fn record(&mut self, file: FileOutcome) {
        if file.outcome.ok {
            self.succeeded += 1;
        } else {
            self.failed += 1;
            if self.failed_names.len() < MAX_REPORTED_FAILURES {
                self.failed_names.push(file.target.display_name());
            }
            if file.outcome.is_permission_issue() {
                self.permission_issue = true;
            }
        }
        self.files.push(file);
    }

    pub fn is_success(&self) -> bool {
        self.succeeded > 0
    }

    /// Nothing was handed to the batch at all.
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    pub fn unreported_failures(&self) -> usize {
        self.failed.saturating_sub(self.failed_names.len())
    }
}
