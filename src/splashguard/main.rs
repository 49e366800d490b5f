use colored::*;
use directories::ProjectDirs;
use splashguard::api::{
    CmdMessage, ConfigAction, MessageLevel, SplashApi, TargetAction, TargetSelection, TargetStatus,
};
use splashguard::attributes::fs::FsAttributes;
use splashguard::commands::{file_message, CmdResult};
use splashguard::error::{Result, SplashError};
use splashguard::logging;
use splashguard::model::{BackupRecord, FileOutcome, ProtectionState};
use splashguard::privilege::ProcessPrivilege;
use splashguard::settings::JsonSettings;
use std::path::PathBuf;

mod args;
use args::{Cli, Commands};
use clap::Parser;

const HOME_ENV: &str = "SPLASHGUARD_HOME";

type Api = SplashApi<FsAttributes, ProcessPrivilege>;

fn main() {
    match run() {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Returns false when the command reported an error.
fn run() -> Result<bool> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let mut api = init_api()?;

    let result = match cli.command {
        Commands::Replace {
            source,
            targets,
            dir,
            no_protect,
        } => {
            let protection = if no_protect { Some(false) } else { None };
            api.replace(
                &source,
                &TargetSelection::new(targets, dir),
                protection,
                print_progress,
            )?
        }
        Commands::Restore { targets, dir } => {
            api.restore(&TargetSelection::new(targets, dir), print_progress)?
        }
        Commands::Protect { paths } => api.protect(&paths)?,
        Commands::Unprotect { paths, all } => {
            if all {
                api.unprotect_all(print_progress)?
            } else {
                api.unprotect(&paths)?
            }
        }
        Commands::Status { targets, dir } => {
            let result = api.status(&TargetSelection::new(targets, dir))?;
            print_statuses(&result.statuses);
            result
        }
        Commands::Backups { targets, dir } => {
            let result = api.backups(&TargetSelection::new(targets, dir))?;
            print_backups(&result.backups);
            result
        }
        Commands::Target {
            path,
            history,
            prune,
        } => handle_target(&mut api, path, history, prune)?,
        Commands::Config { key, value } => handle_config(&mut api, key, value)?,
    };

    print_messages(&result.messages);
    Ok(!result.has_errors())
}

fn init_api() -> Result<Api> {
    let settings_dir = match std::env::var_os(HOME_ENV) {
        Some(dir) => PathBuf::from(dir),
        None => ProjectDirs::from("com", "splashguard", "splashguard")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .ok_or_else(|| SplashError::Settings("Could not determine settings directory".into()))?,
    };
    let settings = JsonSettings::load(settings_dir);
    Ok(SplashApi::new(FsAttributes::new(), ProcessPrivilege, settings))
}

fn handle_target(
    api: &mut Api,
    path: Option<PathBuf>,
    history: bool,
    prune: bool,
) -> Result<CmdResult> {
    let action = match (path, history, prune) {
        (Some(path), _, _) => TargetAction::Set(path),
        (None, true, _) => TargetAction::History,
        (None, false, true) => TargetAction::ClearInvalid,
        (None, false, false) => TargetAction::Show,
    };
    let result = api.target(action)?;
    for (i, path) in result.target_paths.iter().enumerate() {
        if history {
            println!("{} {}", format!("{}.", i + 1).yellow(), path.display());
        } else {
            println!("{}", path.display());
        }
    }
    Ok(result)
}

fn handle_config(api: &mut Api, key: Option<String>, value: Option<String>) -> Result<CmdResult> {
    let action = match (key.as_deref(), value) {
        (None, _) | (Some("protection" | "backup-dir"), None) => ConfigAction::ShowAll,
        (Some("protection"), Some(v)) => match parse_switch(&v) {
            Some(enabled) => ConfigAction::SetProtection(enabled),
            None => {
                return Ok(error_result(format!(
                    "Invalid value for protection: {} (use on or off)",
                    v
                )))
            }
        },
        (Some("backup-dir"), Some(v)) => ConfigAction::SetBackupDir(PathBuf::from(v)),
        (Some(other), _) => return Ok(error_result(format!("Unknown config key: {}", other))),
    };

    let show_only = matches!(action, ConfigAction::ShowAll);
    let result = api.config(action)?;
    if show_only {
        let protection = if api.settings().settings().file_protection_enabled {
            "on"
        } else {
            "off"
        };
        let backup_dir = api.settings().backup_dir();
        let key = key.as_deref();
        if key.is_none() || key == Some("protection") {
            println!("protection = {}", protection);
        }
        if key.is_none() || key == Some("backup-dir") {
            println!("backup-dir = {}", backup_dir.display());
        }
        if key.is_none() {
            if let Some(settings) = &result.settings {
                println!("protected-files = {}", settings.protected_files.len());
            }
        }
    }
    Ok(result)
}

fn parse_switch(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Some(true),
        "off" | "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

fn error_result(message: String) -> CmdResult {
    let mut result = CmdResult::default();
    result.add_message(CmdMessage::error(message));
    result
}

fn print_progress(file: &FileOutcome) {
    print_messages(std::slice::from_ref(&file_message(file)));
}

fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => println!("{}", message.content.red()),
        }
    }
}

fn print_statuses(statuses: &[TargetStatus]) {
    for status in statuses {
        let state = if !status.exists {
            "missing".red()
        } else {
            match status.state {
                ProtectionState::Protected => "protected".green(),
                ProtectionState::Unprotected => "unprotected".yellow(),
            }
        };
        let backup = match &status.backup {
            Some(record) => record.file_name.normal(),
            None => "none".dimmed(),
        };
        println!("{}  {}  backup: {}", status.path.display(), state, backup);
    }
}

fn print_backups(records: &[BackupRecord]) {
    for record in records {
        let when = record
            .created_at
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default();
        println!("{}  {}", record.file_name, when.dimmed());
    }
}
