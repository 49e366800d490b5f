use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::settings::JsonSettings;
use crate::targets::{provider_for, validate_target};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub enum TargetAction {
    Show,
    Set(PathBuf),
    History,
    ClearInvalid,
}

pub fn run(settings: &mut JsonSettings, action: TargetAction) -> Result<CmdResult> {
    let mut result = CmdResult::default();

    match action {
        TargetAction::Show => match settings.settings().target_path.clone() {
            Some(path) => {
                let resolved = provider_for(&path).target_paths();
                if resolved.is_empty() {
                    result.add_message(CmdMessage::warning(format!(
                        "No images found at {}",
                        path.display()
                    )));
                }
                result = result.with_target_paths(vec![path]);
                result.add_message(CmdMessage::info(format!(
                    "{} file(s) will be processed.",
                    resolved.len()
                )));
            }
            None => result.add_message(CmdMessage::info("No target path is set.")),
        },
        TargetAction::Set(path) => {
            let path = std::path::absolute(&path).unwrap_or(path);
            // A splash directory is accepted as is; single files must look like a splash image.
            if !path.is_dir() {
                if let Err(e) = validate_target(&path) {
                    result.add_message(CmdMessage::error(format!("Invalid target: {}", e)));
                    return Ok(result);
                }
            }
            settings.update(|s| s.set_target_path(Some(path.clone())))?;
            result.add_message(CmdMessage::success(format!(
                "Target set to {}",
                path.display()
            )));
        }
        TargetAction::History => {
            let history = settings.settings().path_history().to_vec();
            if history.is_empty() {
                result.add_message(CmdMessage::info("No target history."));
            }
            result = result.with_target_paths(history);
        }
        TargetAction::ClearInvalid => {
            let mut removed = 0;
            settings.update(|s| removed = s.clear_invalid_history())?;
            result.add_message(CmdMessage::success(format!(
                "Removed {} stale history entr{}.",
                removed,
                if removed == 1 { "y" } else { "ies" }
            )));
        }
    }

    Ok(result)
}
