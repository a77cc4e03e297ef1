//! The restic wrapper: build an argument list, run restic to completion, then
//! either decode JSON or check the exit status.
//!
//! Process execution sits behind the [`Executor`] trait so the operations can
//! be tested against a recording fake instead of a real binary.

use std::{
    fmt,
    io,
    path::PathBuf,
    process::{Command, Stdio},
};

use log::{debug, info, warn};

use crate::{
    config::{FileGroup, ResticConfig},
    error::ResticError,
    runner::{backup_args, forget_args, init_args, snapshots_args},
    snapshot::{Snapshot, parse_snapshots},
};

// ─── Invocation ───────────────────────────────────────────────────────────────

/// A fully specified child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub dir: PathBuf,
    pub env: Vec<(String, String)>,
}

/// Renders the command echo, `program arg arg…`.  Environment values are
/// not shown.
impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for a in &self.args {
            write!(f, " {a}")?;
        }
        Ok(())
    }
}

/// What a finished child left behind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captured {
    pub success: bool,
    /// `None` when the child was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

// ─── Executor ─────────────────────────────────────────────────────────────────

/// Runs an [`Invocation`] to completion.
pub trait Executor {
    fn execute(&self, inv: &Invocation) -> io::Result<Captured>;
}

/// Spawns real processes with captured stdout and stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemExecutor;

impl Executor for SystemExecutor {
    fn execute(&self, inv: &Invocation) -> io::Result<Captured> {
        let output = Command::new(&inv.program)
            .args(&inv.args)
            .current_dir(&inv.dir)
            .envs(inv.env.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()?;

        Ok(Captured {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

// ─── Wrapper ──────────────────────────────────────────────────────────────────

/// Result of [`Restic::init_repository_if_absent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    /// The listing probe succeeded; nothing was done.
    Existing,
    /// The probe failed and `restic init` succeeded.
    Created,
}

/// Handle on one restic binary and repository.
#[derive(Debug)]
pub struct Restic<E = SystemExecutor> {
    exe: PathBuf,
    scratch_dir: PathBuf,
    host: Option<String>,
    env: Vec<(String, String)>,
    executor: E,
}

impl Restic<SystemExecutor> {
    pub fn new(cfg: &ResticConfig) -> Self {
        Self::with_executor(cfg, SystemExecutor)
    }
}

impl<E: Executor> Restic<E> {
    pub fn with_executor(cfg: &ResticConfig, executor: E) -> Self {
        let mut env = Vec::new();
        if let Some(repo) = &cfg.repository {
            env.push(("RESTIC_REPOSITORY".to_string(), repo.clone()));
        }
        if let Some(pw) = &cfg.password_file {
            env.push((
                "RESTIC_PASSWORD_FILE".to_string(),
                pw.to_string_lossy().into_owned(),
            ));
        }
        Self {
            exe: cfg.exe.clone(),
            scratch_dir: cfg.scratch_dir.clone(),
            host: cfg.hostname.clone(),
            env,
            executor,
        }
    }

    #[cfg(test)]
    pub const fn executor(&self) -> &E {
        &self.executor
    }

    fn invocation(&self, args: Vec<String>) -> Invocation {
        Invocation {
            program: self.exe.clone(),
            args,
            dir: self.scratch_dir.clone(),
            env: self.env.clone(),
        }
    }

    /// Run restic with `args`, failing on spawn errors and non-zero exits.
    fn run(&self, args: Vec<String>) -> Result<Captured, ResticError> {
        let inv = self.invocation(args);
        info!("{inv}");

        let out = self.executor.execute(&inv).map_err(|source| ResticError::Spawn {
            command: inv.to_string(),
            source,
        })?;
        debug!(
            "exit {:?}, {} bytes stdout, {} bytes stderr",
            out.code,
            out.stdout.len(),
            out.stderr.len()
        );

        if out.success {
            Ok(out)
        } else {
            Err(ResticError::Failed {
                command: inv.to_string(),
                code: out.code,
                stderr: out.stderr,
            })
        }
    }

    /// `restic snapshots --json`, decoded.
    pub fn list_snapshots(&self) -> Result<Vec<Snapshot>, ResticError> {
        let out = self.run(snapshots_args())?;
        parse_snapshots(&out.stdout)
    }

    /// Create the repository unless the listing probe says it is already
    /// there.
    ///
    /// Any probe failure, including a missing binary, is read as "no
    /// repository yet".  Only the `init` error is returned.
    pub fn init_repository_if_absent(&self) -> Result<InitOutcome, ResticError> {
        match self.run(snapshots_args()) {
            Ok(_) => Ok(InitOutcome::Existing),
            Err(probe) => {
                debug!("repository probe failed, initialising: {probe}");
                self.run(init_args())?;
                Ok(InitOutcome::Created)
            },
        }
    }

    /// Snapshot `fg.path`, tagged with `fg.tags`.
    pub fn backup(&self, fg: &FileGroup) -> Result<(), ResticError> {
        self.run(backup_args(fg, self.host.as_deref()))?;
        Ok(())
    }

    /// Apply `fg.retention_policy` to the snapshots carrying `fg.tags`.
    pub fn forget(&self, fg: &FileGroup) -> Result<(), ResticError> {
        if fg.retention_policy.is_empty() {
            warn!(
                "file group '{}' has an empty retention policy; restic will keep everything",
                fg.path
            );
        }
        self.run(forget_args(fg, self.host.as_deref()))?;
        Ok(())
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
