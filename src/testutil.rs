//! Shared fixtures for unit tests.

use std::{cell::RefCell, collections::VecDeque, io};

use crate::{
    config::{FileGroup, ResticConfig, RetentionPolicy},
    restic::{Captured, Executor, Invocation, Restic},
};

/// Replays canned results in order and records every invocation.  Once the
/// replies run out every call succeeds with empty output.
#[derive(Default)]
pub struct FakeExecutor {
    replies: RefCell<VecDeque<io::Result<Captured>>>,
    calls: RefCell<Vec<Invocation>>,
}

impl FakeExecutor {
    pub fn replying(replies: Vec<io::Result<Captured>>) -> Self {
        Self {
            replies: RefCell::new(replies.into()),
            calls: RefCell::default(),
        }
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.borrow().clone()
    }

    /// First argument of every call, e.g. `["snapshots", "init"]`.
    pub fn subcommands(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|c| c.args[0].clone()).collect()
    }
}

impl Executor for FakeExecutor {
    fn execute(&self, inv: &Invocation) -> io::Result<Captured> {
        self.calls.borrow_mut().push(inv.clone());
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(ok("")))
    }
}

pub fn ok(stdout: &str) -> Captured {
    Captured {
        success: true,
        code: Some(0),
        stdout: stdout.into(),
        stderr: String::new(),
    }
}

pub fn fail(stderr: &str) -> Captured {
    Captured {
        success: false,
        code: Some(1),
        stdout: String::new(),
        stderr: stderr.into(),
    }
}

pub fn restic_config() -> ResticConfig {
    ResticConfig {
        exe: "/bin/restic".into(),
        scratch_dir: "/var/tmp/scratch".into(),
        hostname: None,
        repository: Some("/srv/repo".into()),
        password_file: Some("/etc/restic/pw".into()),
    }
}

pub fn fake_restic(replies: Vec<io::Result<Captured>>) -> Restic<FakeExecutor> {
    Restic::with_executor(&restic_config(), FakeExecutor::replying(replies))
}

pub fn group(path: &str, tags: &[&str], keep_last: u32) -> FileGroup {
    FileGroup {
        path: path.into(),
        tags: tags.iter().map(|t| (*t).to_string()).collect(),
        retention_policy: RetentionPolicy {
            keep_last,
            ..RetentionPolicy::default()
        },
    }
}
