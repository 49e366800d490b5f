#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Env {
    temp: TempDir,
}

impl Env {
    fn new() -> Self {
        Self {
            temp: TempDir::new().unwrap(),
        }
    }

    fn home(&self) -> PathBuf {
        self.temp.path().join("home")
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::new(cargo_bin("splashguard"));
        cmd.env("SPLASHGUARD_HOME", self.home())
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG");
        cmd
    }

    fn image(&self, rel: &str, byte: u8) -> PathBuf {
        let path = self.temp.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, vec![byte; 2048]).unwrap();
        path
    }
}

fn is_read_only(path: &Path) -> bool {
    fs::metadata(path).unwrap().permissions().readonly()
}

#[test]
fn replace_protect_and_restore_workflow() {
    let env = Env::new();
    let logo = env.image("logo.png", 7);
    let a = env.image("app/a.png", 1);
    let b = env.image("app/b.png", 2);

    env.cmd()
        .args(["replace", logo.to_str().unwrap()])
        .args([&a, &b])
        .assert()
        .success()
        .stdout(predicate::str::contains("Replaced 2 file(s)."))
        .stdout(predicate::str::contains("Protection enabled"));

    assert_eq!(fs::read(&a).unwrap(), vec![7u8; 2048]);
    assert!(is_read_only(&a));
    assert!(env.home().join("backups").read_dir().unwrap().count() == 2);

    env.cmd()
        .arg("status")
        .arg(&a)
        .assert()
        .success()
        .stdout(predicate::str::contains("protected"))
        .stdout(predicate::str::contains("a_"));

    env.cmd()
        .arg("restore")
        .args([&a, &b])
        .assert()
        .success()
        .stdout(predicate::str::contains("Restored 2 file(s)."));

    assert_eq!(fs::read(&a).unwrap(), vec![1u8; 2048]);
    assert_eq!(fs::read(&b).unwrap(), vec![2u8; 2048]);
    assert!(!is_read_only(&a));
}

#[test]
fn second_replace_keeps_the_first_backup() {
    let env = Env::new();
    let first = env.image("first.png", 7);
    let second = env.image("second.png", 8);
    let target = env.image("app/splash.png", 1);

    for source in [&first, &second] {
        env.cmd()
            .arg("replace")
            .args([source, &target])
            .arg("--no-protect")
            .assert()
            .success();
    }

    env.cmd()
        .arg("backups")
        .arg(&target)
        .assert()
        .success()
        .stdout(predicate::str::contains("splash_").count(1));

    env.cmd().arg("restore").arg(&target).assert().success();
    assert_eq!(fs::read(&target).unwrap(), vec![1u8; 2048]);
}

#[test]
fn saved_target_directory_is_used_by_default() {
    let env = Env::new();
    let logo = env.image("logo.png", 7);
    let root = env.image("splash/splash_default_bg.png", 1);
    let hdpi = env.image("splash/hdpi/splash_default_bg.png", 1);

    env.cmd()
        .arg("target")
        .arg(env.temp.path().join("splash"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Target set to"));

    env.cmd()
        .args(["replace", logo.to_str().unwrap(), "--no-protect"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Replaced 2 file(s)."))
        .stdout(predicate::str::contains("Protection skipped"));

    assert_eq!(fs::read(&root).unwrap(), vec![7u8; 2048]);
    assert_eq!(fs::read(&hdpi).unwrap(), vec![7u8; 2048]);

    env.cmd()
        .args(["target", "--history"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1. "));
}

#[test]
fn protection_can_be_turned_off_in_config() {
    let env = Env::new();
    let logo = env.image("logo.png", 7);
    let a = env.image("a.png", 1);

    env.cmd()
        .args(["config", "protection", "off"])
        .assert()
        .success()
        .stdout(predicate::str::contains("protection set to off"));

    env.cmd()
        .args(["config", "protection"])
        .assert()
        .success()
        .stdout(predicate::str::contains("protection = off"));

    env.cmd()
        .arg("replace")
        .args([&logo, &a])
        .assert()
        .success()
        .stdout(predicate::str::contains("Protection skipped (disabled)"));

    assert!(!is_read_only(&a));
}

#[test]
fn protect_and_unprotect_all() {
    let env = Env::new();
    let a = env.image("a.png", 1);
    let b = env.image("b.png", 1);

    env.cmd()
        .arg("protect")
        .args([&a, &b])
        .assert()
        .success()
        .stdout(predicate::str::contains("Protection enabled").count(2));
    assert!(is_read_only(&a) && is_read_only(&b));

    let settings = fs::read_to_string(env.home().join("config.json")).unwrap();
    assert!(settings.contains("a.png"));

    env.cmd()
        .args(["unprotect", "--all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Unprotected 2 file(s)."));
    assert!(!is_read_only(&a) && !is_read_only(&b));

    env.cmd()
        .args(["unprotect", "--all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No protected files are registered."));
}

#[test]
fn total_failure_exits_with_error() {
    let env = Env::new();
    let logo = env.image("logo.png", 7);

    env.cmd()
        .arg("replace")
        .arg(&logo)
        .arg(env.temp.path().join("missing.png"))
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("All 1 file(s) failed: missing.png"));
}

#[test]
fn partial_failure_still_succeeds() {
    let env = Env::new();
    let logo = env.image("logo.png", 7);
    let a = env.image("a.png", 1);

    env.cmd()
        .arg("replace")
        .arg(&logo)
        .arg(&a)
        .arg(env.temp.path().join("missing.png"))
        .arg("--no-protect")
        .assert()
        .success()
        .stdout(predicate::str::contains("Replaced 1 file(s), 1 failed: missing.png"));
}

#[test]
fn replacing_a_file_with_itself_leaves_it_intact() {
    let env = Env::new();
    let logo = env.image("logo.png", 7);

    env.cmd()
        .arg("replace")
        .args([&logo, &logo])
        .assert()
        .failure()
        .stdout(predicate::str::contains("same file"))
        .stdout(predicate::str::contains("All 1 file(s) failed: logo.png"));

    assert_eq!(fs::read(&logo).unwrap(), vec![7u8; 2048]);
    assert!(!env.home().join("backups").exists());
}

#[test]
fn invalid_input_is_rejected() {
    let env = Env::new();
    let tiny = env.temp.path().join("tiny.png");
    fs::write(&tiny, b"x").unwrap();

    env.cmd()
        .arg("target")
        .arg(&tiny)
        .assert()
        .failure()
        .stdout(predicate::str::contains("Invalid target"));

    env.cmd()
        .args(["config", "colour", "blue"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Unknown config key: colour"));

    env.cmd()
        .args(["replace", "nope.png", "a.png"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Source image not found"));
}

#[test]
fn nothing_to_do_without_targets() {
    let env = Env::new();
    let logo = env.image("logo.png", 7);

    env.cmd()
        .arg("replace")
        .arg(&logo)
        .assert()
        .success()
        .stdout(predicate::str::contains("No target files to process."));
}
