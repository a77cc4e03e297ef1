//! `restic-wrapper` — run restic backups and retention from a config file.
//!
//! # Overview
//!
//! This binary is a thin layer around [`restic`](https://restic.net).  It
//! builds argument lists, runs restic to completion and interprets the exit
//! status or JSON output.  Storage, deduplication, encryption and the
//! retention algorithm itself all stay inside restic.
//!
//! # Usage
//!
//! ```text
//! restic-wrapper                       # init if absent, back up and forget every group
//! restic-wrapper snapshots [--json]    # list snapshots
//! restic-wrapper init                  # create the repository if it does not exist
//! restic-wrapper backup -g /srv/data   # back up one file group
//! restic-wrapper forget                # apply every retention policy
//! restic-wrapper --print-config        # show the merged config
//! ```
//!
//! # Module layout
//!
//! | Module                   | Responsibility                              |
//! |--------------------------|---------------------------------------------|
//! | [`cli`]                  | Argument types parsed by clap               |
//! | [`config`]               | `Config`, file groups, layered TOML loader  |
//! | [`runner`]               | restic argument construction                |
//! | [`restic`]               | Process execution and the four operations   |
//! | [`snapshot`]             | `snapshots --json` records                  |
//! | [`error`]                | `ResticError`                               |
//! | [`ui`]                   | Spinner, stage output, summary              |
//! | [`commands`]             | Subcommand handlers                         |

mod cli;
mod commands;
mod config;
mod error;
mod restic;
mod runner;
mod snapshot;
#[cfg(test)]
mod testutil;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Subcommand};
use commands::run::Steps;
use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};

use crate::restic::Restic;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let global = config::global_config_path();
    let mut cfg = config::load_merged(&cli.config, global.as_deref())?;
    if let Some(exe) = &cli.exe {
        cfg.restic.exe.clone_from(exe);
    }

    if cli.print_config {
        println!("{}", toml::to_string_pretty(&cfg)?);
        return Ok(());
    }

    let restic = Restic::new(&cfg.restic);

    match &cli.command {
        Some(Subcommand::Snapshots { json }) => commands::snapshots::run(&restic, *json)?,
        Some(Subcommand::Init) => commands::init::run(&restic)?,
        Some(Subcommand::Backup(g)) => {
            let groups = cfg.select_groups(g.group.as_deref())?;
            commands::run::run(&restic, &groups, Steps::BACKUP)?;
        },
        Some(Subcommand::Forget(g)) => {
            let groups = cfg.select_groups(g.group.as_deref())?;
            commands::run::run(&restic, &groups, Steps::FORGET)?;
        },
        Some(Subcommand::Run { group, no_forget }) => {
            let groups = cfg.select_groups(group.group.as_deref())?;
            commands::run::run(&restic, &groups, Steps::pipeline(*no_forget))?;
        },
        None => {
            let groups = cfg.select_groups(None)?;
            commands::run::run(&restic, &groups, Steps::pipeline(false))?;
        },
    }

    Ok(())
}

/// Route `log` records to stderr.  Each `-v` raises the level by one step
/// from `warn`.
fn init_logging(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let config = ConfigBuilder::new()
        .set_time_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .build();
    TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Auto)
        .context("installing logger")
}
