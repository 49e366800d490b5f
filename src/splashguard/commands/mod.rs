use crate::model::{BackupRecord, BatchResult, FileOutcome, ProtectionState};
use crate::settings::Settings;
use std::path::PathBuf;

pub mod backups;
pub mod config;
pub mod protect;
pub mod replace;
pub mod restore;
pub mod status;
pub mod target;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

/// Protection and backup state of one target, for `status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetStatus {
    pub path: PathBuf,
    pub exists: bool,
    pub state: ProtectionState,
    pub backup: Option<BackupRecord>,
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub batch: Option<BatchResult>,
    pub statuses: Vec<TargetStatus>,
    pub backups: Vec<BackupRecord>,
    pub target_paths: Vec<PathBuf>,
    pub settings: Option<Settings>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_batch(mut self, batch: BatchResult) -> Self {
        self.batch = Some(batch);
        self
    }

    pub fn with_statuses(mut self, statuses: Vec<TargetStatus>) -> Self {
        self.statuses = statuses;
        self
    }

    pub fn with_backups(mut self, backups: Vec<BackupRecord>) -> Self {
        self.backups = backups;
        self
    }

    pub fn with_target_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.target_paths = paths;
        self
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn has_errors(&self) -> bool {
        self.messages
            .iter()
            .any(|m| m.level == MessageLevel::Error)
    }
}

/// One line per file: failures as errors, success-with-warning as warnings.
pub fn file_message(file: &FileOutcome) -> CmdMessage {
    let text = format!("{}: {}", file.target.display_name(), file.outcome.message);
    if !file.outcome.ok {
        CmdMessage::error(text)
    } else if file.outcome.has_warnings() {
        CmdMessage::warning(format!(
            "{} ({})",
            text,
            file.outcome.warnings.join("; ")
        ))
    } else {
        CmdMessage::success(text)
    }
}

/// Summary lines for a finished batch. `verb` is past tense, e.g. "Replaced".
pub fn summarize_batch(verb: &str, batch: &BatchResult) -> Vec<CmdMessage> {
    let mut messages = Vec::new();

    if batch.is_empty() {
        messages.push(CmdMessage::info("No target files to process."));
        return messages;
    }

    let mut failures = batch.failed_names.join(", ");
    if batch.unreported_failures() > 0 {
        failures.push_str(&format!(" and {} more", batch.unreported_failures()));
    }

    if batch.failed == 0 && batch.succeeded > 0 {
        messages.push(CmdMessage::success(format!(
            "{} {} file(s).",
            verb, batch.succeeded
        )));
    } else if batch.succeeded > 0 {
        messages.push(CmdMessage::warning(format!(
            "{} {} file(s), {} failed: {}",
            verb, batch.succeeded, batch.failed, failures
        )));
    } else if batch.failed > 0 {
        messages.push(CmdMessage::error(format!(
            "All {} file(s) failed: {}",
            batch.failed, failures
        )));
    }

    if batch.cancelled {
        messages.push(CmdMessage::warning(format!(
            "Cancelled; {} file(s) not processed.",
            batch.skipped
        )));
    } else if batch.skipped > 0 {
        messages.push(CmdMessage::info(format!(
            "{} file(s) no longer exist and were skipped.",
            batch.skipped
        )));
    }

    if batch.permission_issue {
        messages.push(CmdMessage::info(
            "Some files could not be written; try again with administrator rights.",
        ));
    }

    messages
}
