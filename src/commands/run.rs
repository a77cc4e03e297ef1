//! Per-file-group pipeline: `backup`, `forget`, and `run` (the default).
//!
//! # Stages of `run`
//!
//! | # | Stage            | Skip with     | Description                          |
//! |---|------------------|---------------|--------------------------------------|
//! | 1 | Init             | —             | `restic init` if the probe fails     |
//! | 2 | Backup `<path>`  | —             | One per file group                   |
//! | 3 | Forget `<path>`  | `--no-forget` | Retention policy, after its backup   |
//!
//! A failed init aborts the pipeline.  A failed backup skips that group's
//! forget but the remaining groups still run; the command fails at the end
//! if any stage did.

use anyhow::Result;

use crate::{
    commands::init::init_stage,
    config::FileGroup,
    restic::{Executor, Restic},
    ui::{StageOutcome, print_summary, run_stage},
};

/// Which restic operations to run for each selected file group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Steps {
    pub init: bool,
    pub backup: bool,
    pub forget: bool,
}

impl Steps {
    pub const BACKUP: Self = Self {
        init: false,
        backup: true,
        forget: false,
    };
    pub const FORGET: Self = Self {
        init: false,
        backup: false,
        forget: true,
    };
    pub const fn pipeline(no_forget: bool) -> Self {
        Self {
            init: true,
            backup: true,
            forget: !no_forget,
        }
    }
}

/// Execute `steps` for `groups`, printing each stage and the summary.
pub fn run<E: Executor>(restic: &Restic<E>, groups: &[&FileGroup], steps: Steps) -> Result<()> {
    println!();
    let outcomes = execute(restic, groups, steps);
    print_summary(&outcomes);

    let failed = outcomes.iter().filter(|o| o.failed()).count();
    if failed > 0 {
        anyhow::bail!("{failed} stage(s) failed");
    }
    Ok(())
}

/// Run the stages and collect their outcomes, printing each as it finishes.
fn execute<E: Executor>(restic: &Restic<E>, groups: &[&FileGroup], steps: Steps) -> Vec<StageOutcome> {
    let mut outcomes = Vec::new();

    if steps.init {
        let init = init_stage(restic);
        init.print();
        let failed = init.failed();
        outcomes.push(init);
        if failed {
            return outcomes;
        }
    }

    if groups.is_empty() {
        log::warn!("no [[file_group]] configured; nothing to back up");
    }

    for fg in groups {
        if steps.backup {
            let (backup, _) = run_stage(&format!("Backup {}", fg.path), || restic.backup(fg));
            backup.print();
            let failed = backup.failed();
            outcomes.push(backup);
            if failed {
                continue;
            }
        }

        if steps.forget {
            let (forget, _) = run_stage(&format!("Forget {}", fg.path), || restic.forget(fg));
            forget.print();
            outcomes.push(forget);
        }
    }

    outcomes
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{fail, fake_restic, group, ok};

    fn labels(outcomes: &[StageOutcome]) -> Vec<&str> {
        outcomes.iter().map(|o| o.label.as_str()).collect()
    }

    #[test]
    fn pipeline_runs_init_then_backup_and_forget_per_group() {
        let a = group("/a", &["x"], 3);
        let b = group("/b", &[], 1);
        let r = fake_restic(vec![Ok(ok("[]"))]);
        let outcomes = execute(&r, &[&a, &b], Steps::pipeline(false));
        assert_eq!(labels(&outcomes), vec![
            "Init",
            "Backup /a",
            "Forget /a",
            "Backup /b",
            "Forget /b"
        ]);
        assert_eq!(r.executor().subcommands(), vec![
            "snapshots",
            "backup",
            "forget",
            "backup",
            "forget"
        ]);
    }

    #[test]
    fn pipeline_initialises_missing_repo_once() {
        let a = group("/a", &[], 1);
        let r = fake_restic(vec![Ok(fail("no repo")), Ok(ok(""))]);
        let outcomes = execute(&r, &[&a], Steps::pipeline(true));
        assert_eq!(outcomes[0].detail.as_deref(), Some("created"));
        assert_eq!(r.executor().subcommands(), vec!["snapshots", "init", "backup"]);
    }

    #[test]
    fn failed_init_aborts_before_any_backup() {
        let a = group("/a", &[], 1);
        let r = fake_restic(vec![Ok(fail("no repo")), Ok(fail("cannot create"))]);
        let outcomes = execute(&r, &[&a], Steps::pipeline(false));
        assert_eq!(labels(&outcomes), vec!["Init"]);
        assert!(outcomes[0].failed());
    }

    #[test]
    fn failed_init_fails_the_command() {
        let a = group("/a", &[], 1);
        let r = fake_restic(vec![Ok(fail("no repo")), Ok(fail("cannot create"))]);
        assert!(run(&r, &[&a], Steps::pipeline(false)).is_err());
    }

    #[test]
    fn failed_backup_skips_its_forget_but_not_other_groups() {
        let a = group("/a", &[], 1);
        let b = group("/b", &[], 1);
        let r = fake_restic(vec![Ok(fail("unreadable"))]);
        let steps = Steps {
            init: false,
            backup: true,
            forget: true,
        };
        let outcomes = execute(&r, &[&a, &b], steps);
        assert_eq!(labels(&outcomes), vec!["Backup /a", "Backup /b", "Forget /b"]);
        assert!(outcomes[0].failed());
        assert!(!outcomes[2].failed());
    }

    #[test]
    fn backup_only_and_forget_only() {
        let a = group("/a", &["t"], 2);
        let r = fake_restic(vec![]);
        run(&r, &[&a], Steps::BACKUP).unwrap();
        run(&r, &[&a], Steps::FORGET).unwrap();
        assert_eq!(r.executor().subcommands(), vec!["backup", "forget"]);
    }

    #[test]
    fn run_reports_failure_count() {
        let a = group("/a", &[], 1);
        let r = fake_restic(vec![Ok(fail("locked"))]);
        let err = run(&r, &[&a], Steps::FORGET).unwrap_err();
        assert_eq!(err.to_string(), "1 stage(s) failed");
    }

    #[test]
    fn no_groups_only_inits() {
        let r = fake_restic(vec![Ok(ok("[]"))]);
        run(&r, &[], Steps::pipeline(false)).unwrap();
        assert_eq!(r.executor().subcommands(), vec!["snapshots"]);
    }
}
