//! Errors raised while talking to the restic binary.
//!
//! The command handlers work in `anyhow`; everything below the
//! [`crate::restic`] boundary returns [`ResticError`] so callers can tell a
//! missing binary apart from a non-zero exit or garbled JSON.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResticError {
    /// The child process could not be started at all.
    #[error("failed to spawn: {command}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    /// restic ran but exited non-zero.
    #[error("command exited {}: {command}", exit_label(.code))]
    Failed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// `snapshots --json` produced output we could not decode.
    #[error("could not decode snapshot list")]
    Decode(#[from] serde_json::Error),
}

impl ResticError {
    /// Captured stderr of a failed run, empty for every other variant.
    pub fn stderr(&self) -> &str {
        match self {
            Self::Failed { stderr, .. } => stderr,
            _ => "",
        }
    }
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("with status {c}"),
        None => "by signal".into(),
    }
}
