use crate::attributes::AttributeController;
use crate::commands::{CmdMessage, CmdResult, TargetStatus};
use crate::error::Result;
use crate::privilege::PrivilegeQuery;
use crate::replace::ReplaceEngine;
use std::path::PathBuf;

pub fn run<A: AttributeController, P: PrivilegeQuery>(
    engine: &ReplaceEngine<A, P>,
    targets: &[PathBuf],
) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    if targets.is_empty() {
        result.add_message(CmdMessage::info("No target files to inspect."));
        return Ok(result);
    }

    let mut statuses = Vec::with_capacity(targets.len());
    for path in targets {
        let backup = engine.backups().find_backup(path)?;
        statuses.push(TargetStatus {
            path: path.clone(),
            exists: path.exists(),
            state: engine.protection().state(path),
            backup,
        });
    }

    Ok(result.with_statuses(statuses))
}
