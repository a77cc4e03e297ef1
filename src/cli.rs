//! Command-line interface definition.
//!
//! All argument parsing lives here so the rest of the codebase can stay
//! agnostic to `clap`.  `Cli` is parsed once in `main` and passed by
//! reference into the command handlers.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser};

/// Top-level CLI arguments, shared across every subcommand.
#[derive(Parser, Debug)]
#[command(
    name    = "restic-wrapper",
    about   = "Run restic backups and retention for the file groups in restic-wrapper.toml",
    version,
    help_template = "\
{before-help}{name} {version}
{about}

{usage-heading} {usage}

{all-args}{after-help}"
)]
pub struct Cli {
    /// Path to the configuration file.
    ///
    /// Values here override the per-user global config on a per-field basis.
    #[arg(short, long, default_value = "restic-wrapper.toml")]
    pub config: PathBuf,

    /// Use this restic binary instead of `[restic].exe`.
    #[arg(long, value_name = "PATH")]
    pub exe: Option<PathBuf>,

    /// Print the merged configuration and exit without running anything.
    #[arg(long)]
    pub print_config: bool,

    /// Increase log verbosity (`-v` echoes every restic command, `-vv` adds
    /// exit codes and output sizes).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Subcommand to run.  Omit to run the full pipeline.
    #[command(subcommand)]
    pub command: Option<Subcommand>,
}

/// Explicit subcommands.  No subcommand is the same as `run`.
#[derive(clap::Subcommand, Debug, PartialEq, Eq)]
pub enum Subcommand {
    /// List snapshots in the repository.
    Snapshots {
        /// Print restic's JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Initialise the repository unless it already exists.
    Init,

    /// Back up the configured file groups.
    Backup(GroupArgs),

    /// Apply each file group's retention policy.
    Forget(GroupArgs),

    /// Init if absent, then back up and forget every file group.
    Run {
        #[command(flatten)]
        group: GroupArgs,

        /// Back up only; keep all snapshots.
        #[arg(long)]
        no_forget: bool,
    },
}

/// Selects a subset of the configured file groups.
#[derive(Args, Debug, Default, PartialEq, Eq)]
pub struct GroupArgs {
    /// Only the file group with this path.
    #[arg(short, long, value_name = "PATH")]
    pub group: Option<String>,
}
