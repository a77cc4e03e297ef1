//! `restic-wrapper snapshots`: list what the repository holds.

use std::fmt::Write as _;

use anyhow::{Context, Result};

use crate::{
    restic::{Executor, Restic},
    snapshot::Snapshot,
};

pub fn run<E: Executor>(restic: &Restic<E>, json: bool) -> Result<()> {
    let snapshots = restic.list_snapshots().context("listing snapshots")?;
    if json {
        println!("{}", serde_json::to_string_pretty(&snapshots)?);
    } else {
        print!("{}", format_table(&snapshots));
    }
    Ok(())
}

/// Render `snapshots` as an aligned table followed by a count line.
///
/// Times are shown in the offset restic recorded them with.
pub fn format_table(snapshots: &[Snapshot]) -> String {
    let header = ["ID", "Time", "Host", "Tags", "Paths"];
    let rows: Vec<[String; 5]> = snapshots
        .iter()
        .map(|s| {
            [
                s.short_id().to_string(),
                s.time.format("%Y-%m-%d %H:%M:%S").to_string(),
                s.hostname.clone(),
                s.tags.join(","),
                s.paths.join(", "),
            ]
        })
        .collect();

    let mut widths = header.map(str::len);
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let mut push_row = |cells: &[&str]| {
        let line: Vec<String> = cells
            .iter()
            .zip(widths)
            .map(|(c, w)| format!("{c:<w$}"))
            .collect();
        let _ = writeln!(out, "{}", line.join("  ").trim_end());
    };

    push_row(&header);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_row(&rule.iter().map(String::as_str).collect::<Vec<_>>());
    for row in &rows {
        push_row(&row.iter().map(String::as_str).collect::<Vec<_>>());
    }

    let noun = if snapshots.len() == 1 { "snapshot" } else { "snapshots" };
    let _ = writeln!(out, "{} {noun}", snapshots.len());
    out
}
