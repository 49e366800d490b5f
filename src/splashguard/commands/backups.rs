use crate::backup::BackupStore;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::TargetFile;
use std::path::PathBuf;

/// Backups for each target, in restore order.
pub fn run(store: &BackupStore, targets: &[PathBuf]) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    let mut records = Vec::new();

    for target in targets {
        let found = store.list_backups(target)?;
        if found.is_empty() {
            result.add_message(CmdMessage::info(format!(
                "No backups for {}",
                TargetFile::new(target).display_name()
            )));
        }
        records.extend(found);
    }

    if targets.is_empty() {
        result.add_message(CmdMessage::info("No target files to inspect."));
    }

    Ok(result.with_backups(records))
}
