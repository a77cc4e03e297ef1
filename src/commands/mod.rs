//! Subcommand handlers.
//!
//! | File            | Invocation                       | Description                     |
//! |-----------------|----------------------------------|---------------------------------|
//! | `snapshots.rs`  | `restic-wrapper snapshots`       | List snapshots                  |
//! | `init.rs`       | `restic-wrapper init`            | Create the repository if absent |
//! | `run.rs`        | `backup`, `forget`, `run`        | Per-file-group pipeline         |

pub mod init;
pub mod run;
pub mod snapshots;
