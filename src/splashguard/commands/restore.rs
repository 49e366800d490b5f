use crate::commands::{summarize_batch, CmdResult};
use crate::error::Result;
use crate::model::FileOutcome;
use crate::worker::{Job, Worker};
use std::path::PathBuf;

pub fn run<F: FnMut(&FileOutcome)>(
    worker: &Worker,
    targets: Vec<PathBuf>,
    on_file: F,
) -> Result<CmdResult> {
    let batch = worker.run(Job::RestoreAll { targets }, on_file)?;

    let mut result = CmdResult::default();
    for message in summarize_batch("Restored", &batch) {
        result.add_message(message);
    }
    Ok(result.with_batch(batch))
}
