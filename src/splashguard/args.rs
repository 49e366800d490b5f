use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// "0.3.2" for releases, "0.3.2@abc1234" for dev builds.
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const IS_RELEASE: &str = env!("IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            VERSION.to_string()
        } else {
            format!("{}@{}", VERSION, GIT_HASH)
        }
    })
}

#[derive(Parser, Debug)]
#[command(name = "splashguard", bin_name = "splashguard", version = get_version())]
#[command(about = "Replace a splash image and keep it from being restored", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output (debug logs on stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replace target images with SOURCE, backing up the originals
    Replace {
        /// Image to install
        source: PathBuf,

        /// Target files (defaults to the saved target)
        targets: Vec<PathBuf>,

        /// Use every PNG in a splash directory and its hdpi/ subfolder
        #[arg(long, conflicts_with = "targets")]
        dir: Option<PathBuf>,

        /// Do not protect the replaced files
        #[arg(long)]
        no_protect: bool,
    },

    /// Restore targets from their backups
    Restore {
        targets: Vec<PathBuf>,

        #[arg(long, conflicts_with = "targets")]
        dir: Option<PathBuf>,
    },

    /// Protect files against being overwritten
    Protect {
        #[arg(required = true, num_args = 1..)]
        paths: Vec<PathBuf>,
    },

    /// Remove protection from files
    Unprotect {
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        paths: Vec<PathBuf>,

        /// Every registered file plus protected files under the saved target
        #[arg(long)]
        all: bool,
    },

    /// Show protection state and backup presence
    #[command(alias = "st")]
    Status {
        targets: Vec<PathBuf>,

        #[arg(long, conflicts_with = "targets")]
        dir: Option<PathBuf>,
    },

    /// List backups
    Backups {
        targets: Vec<PathBuf>,

        #[arg(long, conflicts_with = "targets")]
        dir: Option<PathBuf>,
    },

    /// Show or set the saved target (a file or a splash directory)
    Target {
        path: Option<PathBuf>,

        /// Show recently used targets
        #[arg(long, conflicts_with = "path")]
        history: bool,

        /// Drop history entries that no longer exist
        #[arg(long, conflicts_with_all = ["path", "history"])]
        prune: bool,
    },

    /// Get or set configuration
    Config {
        /// Configuration key (protection, backup-dir)
        key: Option<String>,

        /// Value to set (if omitted, prints current value)
        value: Option<String>,
    },
}
