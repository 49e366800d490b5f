use crate::commands::{summarize_batch, CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::FileOutcome;
use crate::worker::{Job, Worker};
use std::path::{Path, PathBuf};

pub fn run<F: FnMut(&FileOutcome)>(
    worker: &Worker,
    source: &Path,
    targets: Vec<PathBuf>,
    protection_enabled: bool,
    on_file: F,
) -> Result<CmdResult> {
    if !source.is_file() {
        let mut result = CmdResult::default();
        result.add_message(CmdMessage::error(format!(
            "Source image not found: {}",
            source.display()
        )));
        return Ok(result);
    }

    let batch = worker.run(
        Job::ReplaceAll {
            source: source.to_path_buf(),
            targets,
            protection_enabled,
        },
        on_file,
    )?;

    let mut result = CmdResult::default();
    for message in summarize_batch("Replaced", &batch) {
        result.add_message(message);
    }
    Ok(result.with_batch(batch))
}
