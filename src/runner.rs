//! Command argument construction helpers.
//!
//! This module only *builds* the argument lists passed to restic.  Execution
//! lives in [`crate::restic`], so every function here is pure and unit
//! testable without spawning anything.
//!
//! The returned vectors never include the program itself; the wrapper
//! prepends the configured `restic.exe`.

use crate::config::{FileGroup, RetentionPolicy};

// ─── Retention flags ──────────────────────────────────────────────────────────

/// The `forget` options that select which snapshots survive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeepFlag {
    Last,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Tag,
}

impl KeepFlag {
    /// Spelling on restic's command line.
    pub const fn as_flag(self) -> &'static str {
        match self {
            Self::Last => "--keep-last",
            Self::Hourly => "--keep-hourly",
            Self::Daily => "--keep-daily",
            Self::Weekly => "--keep-weekly",
            Self::Monthly => "--keep-monthly",
            Self::Yearly => "--keep-yearly",
            Self::Tag => "--keep-tag",
        }
    }
}

/// The count-based buckets of `policy`, in the order restic documents them.
fn keep_counts(policy: &RetentionPolicy) -> [(KeepFlag, u32); 6] {
    [
        (KeepFlag::Last, policy.keep_last),
        (KeepFlag::Hourly, policy.keep_hourly),
        (KeepFlag::Daily, policy.keep_daily),
        (KeepFlag::Weekly, policy.keep_weekly),
        (KeepFlag::Monthly, policy.keep_monthly),
        (KeepFlag::Yearly, policy.keep_yearly),
    ]
}

/// Append `flag value` once per value.
fn push_pairs<'a>(args: &mut Vec<String>, flag: &str, values: impl IntoIterator<Item = &'a String>) {
    for v in values {
        args.push(flag.into());
        args.push(v.clone());
    }
}

// ─── Subcommands ──────────────────────────────────────────────────────────────

/// Arguments for `restic snapshots --json`.  Doubles as the existence probe.
pub fn snapshots_args() -> Vec<String> {
    vec!["snapshots".into(), "--json".into()]
}

/// Arguments for `restic init`.
pub fn init_args() -> Vec<String> {
    vec!["init".into()]
}

/// Arguments for `restic backup <path> --force [--host h] [--tag t]…`.
///
/// `--force` makes restic re-read every file instead of trusting the parent
/// snapshot's metadata.
pub fn backup_args(fg: &FileGroup, host: Option<&str>) -> Vec<String> {
    let mut args: Vec<String> = vec!["backup".into(), fg.path.clone(), "--force".into()];
    if let Some(h) = host {
        args.extend(["--host".into(), h.into()]);
    }
    push_pairs(&mut args, "--tag", &fg.tags);
    args
}

/// Arguments for `restic forget …`.
///
/// Only buckets with a non-zero count are passed.  The group's own tags
/// select which snapshots the policy applies to.
pub fn forget_args(fg: &FileGroup, host: Option<&str>) -> Vec<String> {
    let policy = &fg.retention_policy;
    let mut args: Vec<String> = vec!["forget".into()];
    if policy.prune {
        args.push("--prune".into());
    }
    for (flag, n) in keep_counts(policy) {
        if n > 0 {
            args.extend([flag.as_flag().into(), n.to_string()]);
        }
    }
    push_pairs(&mut args, KeepFlag::Tag.as_flag(), &policy.keep_tags);
    if let Some(h) = host {
        args.extend(["--host".into(), h.into()]);
    }
    push_pairs(&mut args, "--tag", &fg.tags);
    args
}

// ─── Tests ────────────────────────────────────────────────────────────────────
