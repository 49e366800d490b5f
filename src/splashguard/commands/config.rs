use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::settings::JsonSettings;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub enum ConfigAction {
    ShowAll,
    SetProtection(bool),
    SetBackupDir(PathBuf),
}

pub fn run(settings: &mut JsonSettings, action: ConfigAction) -> Result<CmdResult> {
    match action {
        ConfigAction::ShowAll => Ok(CmdResult::default().with_settings(settings.settings().clone())),
        ConfigAction::SetProtection(enabled) => {
            settings.update(|s| s.set_file_protection_enabled(enabled))?;
            let mut result = CmdResult::default().with_settings(settings.settings().clone());
            result.add_message(CmdMessage::success(format!(
                "protection set to {}",
                if enabled { "on" } else { "off" }
            )));
            Ok(result)
        }
        ConfigAction::SetBackupDir(dir) => {
            let dir = std::path::absolute(&dir).unwrap_or(dir);
            if dir.exists() && !dir.is_dir() {
                let mut result = CmdResult::default();
                result.add_message(CmdMessage::error(format!(
                    "Not a directory: {}",
                    dir.display()
                )));
                return Ok(result);
            }
            settings.update(|s| s.backup_dir = Some(dir.clone()))?;
            let mut result = CmdResult::default().with_settings(settings.settings().clone());
            result.add_message(CmdMessage::success(format!(
                "backup-dir set to {}",
                dir.display()
            )));
            Ok(result)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn toggling_protection_persists() {
        let dir = TempDir::new().unwrap();
        let mut settings = JsonSettings::load(dir.path());

        let result = run(&mut settings, ConfigAction::SetProtection(false)).unwrap();
        assert_eq!(result.messages[0].content, "protection set to off");

        let reloaded = JsonSettings::load(dir.path());
        assert!(!reloaded.settings().file_protection_enabled);
    }

    #[test]
    fn backup_dir_override() {
        let dir = TempDir::new().unwrap();
        let mut settings = JsonSettings::load(dir.path());
        let custom = dir.path().join("elsewhere");

        run(&mut settings, ConfigAction::SetBackupDir(custom.clone())).unwrap();
        assert_eq!(JsonSettings::load(dir.path()).backup_dir(), custom);
    }

    #[test]
    fn backup_dir_must_not_be_a_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("file");
        fs::write(&file, b"x").unwrap();
        let mut settings = JsonSettings::load(dir.path());

        let result = run(&mut settings, ConfigAction::SetBackupDir(file)).unwrap();
        assert!(result.has_errors());
        assert!(settings.settings().backup_dir.is_none());
    }

    #[test]
    fn show_all_returns_settings() {
        let dir = TempDir::new().unwrap();
        let mut settings = JsonSettings::load(dir.path());
        let result = run(&mut settings, ConfigAction::ShowAll).unwrap();
        assert!(result.settings.unwrap().file_protection_enabled);
    }
}
