//! `restic-wrapper init`: create the repository unless it already exists.

use anyhow::Result;

use crate::{
    restic::{Executor, InitOutcome, Restic},
    ui::{StageOutcome, run_stage},
};

/// Run the init-if-absent stage and return its outcome without printing it.
pub fn init_stage<E: Executor>(restic: &Restic<E>) -> StageOutcome {
    let (outcome, created) = run_stage("Init", || restic.init_repository_if_absent());
    match created {
        Some(InitOutcome::Created) => outcome.with_detail("created"),
        Some(InitOutcome::Existing) => outcome.with_detail("already exists"),
        None => outcome,
    }
}

pub fn run<E: Executor>(restic: &Restic<E>) -> Result<()> {
    let outcome = init_stage(restic);
    outcome.print();
    if outcome.failed() {
        anyhow::bail!("repository initialisation failed");
    }
    Ok(())
}
