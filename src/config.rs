//! Configuration types and loading logic.
//!
//! `Config` is a direct mapping of `restic-wrapper.toml`.  Every field has a
//! default, so the file is optional; without it there are simply no file
//! groups to back up.
//!
//! # File format
//!
//! ```toml
//! [restic]
//! exe           = "/bin/restic"
//! scratch_dir   = "/var/lib/restic-wrapper"   # working dir of every call
//! hostname      = "db-1"                      # optional, passed as --host
//! repository    = "/srv/restic-repo"          # optional, RESTIC_REPOSITORY
//! password_file = "/etc/restic/password"      # optional, RESTIC_PASSWORD_FILE
//!
//! [[file_group]]
//! path = "/srv/data"
//! tags = ["app:web", "nightly"]
//!
//! [file_group.retention_policy]
//! keep_last  = 5
//! keep_daily = 7
//! keep_tags  = ["release"]
//! prune      = true
//! ```
//!
//! # Layering
//!
//! Two files are read and merged field by field, see [`load_merged`].

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

// ─── Top-level ────────────────────────────────────────────────────────────────

/// Fully resolved configuration.
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct Config {
    /// How to invoke restic.
    #[serde(default)]
    pub restic: ResticConfig,

    /// What to back up and how long to keep it.
    #[serde(default)]
    pub file_group: Vec<FileGroup>,
}

impl Config {
    /// File groups selected by `--group`, or all of them when `filter` is
    /// `None`.
    pub fn select_groups(&self, filter: Option<&str>) -> Result<Vec<&FileGroup>> {
        let Some(path) = filter else {
            return Ok(self.file_group.iter().collect());
        };
        let picked: Vec<&FileGroup> = self.file_group.iter().filter(|g| g.path == path).collect();
        if picked.is_empty() {
            anyhow::bail!("no [[file_group]] with path '{path}' in config");
        }
        Ok(picked)
    }
}

// ─── [restic] ─────────────────────────────────────────────────────────────────

/// Settings shared by every restic invocation.
#[derive(Debug, Deserialize, Serialize)]
pub struct ResticConfig {
    /// Path of the restic binary.
    #[serde(default = "default_exe")]
    pub exe: PathBuf,

    /// Working directory for every invocation.  restic writes its lock and
    /// cache probes relative to this.
    #[serde(default = "default_scratch_dir")]
    pub scratch_dir: PathBuf,

    /// Host name recorded on new snapshots and used to scope `forget`.
    /// When unset restic uses the machine's own host name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,

    /// Repository location, exported as `RESTIC_REPOSITORY`.  Leave unset to
    /// inherit it from the environment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,

    /// Password file, exported as `RESTIC_PASSWORD_FILE`.  Inline passwords
    /// are not supported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_file: Option<PathBuf>,
}

impl Default for ResticConfig {
    fn default() -> Self {
        Self {
            exe: default_exe(),
            scratch_dir: default_scratch_dir(),
            hostname: None,
            repository: None,
            password_file: None,
        }
    }
}

// ─── [[file_group]] ───────────────────────────────────────────────────────────

/// A backup source path plus the tags its snapshots carry.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FileGroup {
    pub path: String,

    /// Attached to every snapshot of this group, and used to select the
    /// group's snapshots when forgetting.
    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub retention_policy: RetentionPolicy,
}

/// How many snapshots `forget` keeps per time bucket.
///
/// A count of zero means "no rule for this bucket"; only non-zero counts are
/// passed to restic.  restic keeps the newest snapshot within each bucket,
/// so `keep_daily = 7` keeps one snapshot for each of the last seven days
/// that had one.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RetentionPolicy {
    #[serde(default)]
    pub keep_last: u32,
    #[serde(default)]
    pub keep_hourly: u32,
    #[serde(default)]
    pub keep_daily: u32,
    #[serde(default)]
    pub keep_weekly: u32,
    #[serde(default)]
    pub keep_monthly: u32,
    #[serde(default)]
    pub keep_yearly: u32,

    /// Snapshots carrying any of these tags are never forgotten.
    #[serde(default)]
    pub keep_tags: Vec<String>,

    /// Also remove unreferenced data (`forget --prune`).
    #[serde(default)]
    pub prune: bool,
}

impl RetentionPolicy {
    /// `true` when the policy would not keep anything explicitly.
    pub fn is_empty(&self) -> bool {
        self.keep_last == 0
            && self.keep_hourly == 0
            && self.keep_daily == 0
            && self.keep_weekly == 0
            && self.keep_monthly == 0
            && self.keep_yearly == 0
            && self.keep_tags.is_empty()
    }
}

// ─── Defaults ─────────────────────────────────────────────────────────────────

pub fn default_exe() -> PathBuf {
    PathBuf::from("/bin/restic")
}

pub fn default_scratch_dir() -> PathBuf {
    PathBuf::from(".")
}

// ─── Partial (layered) config ─────────────────────────────────────────────────

/// A config file where every field is optional, so that two layers can be
/// merged before defaults are applied.
#[derive(Debug, Deserialize, Default)]
pub struct PartialConfig {
    #[serde(default)]
    pub restic: PartialResticConfig,
    pub file_group: Option<Vec<FileGroup>>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PartialResticConfig {
    pub exe: Option<PathBuf>,
    pub scratch_dir: Option<PathBuf>,
    pub hostname: Option<String>,
    pub repository: Option<String>,
    pub password_file: Option<PathBuf>,
}

impl PartialConfig {
    /// Overlay `other` on top of `self`; fields set in `other` win.
    ///
    /// `file_group` is replaced wholesale, never concatenated.
    pub fn merge(self, other: Self) -> Self {
        let (a, b) = (self.restic, other.restic);
        Self {
            restic: PartialResticConfig {
                exe: b.exe.or(a.exe),
                scratch_dir: b.scratch_dir.or(a.scratch_dir),
                hostname: b.hostname.or(a.hostname),
                repository: b.repository.or(a.repository),
                password_file: b.password_file.or(a.password_file),
            },
            file_group: other.file_group.or(self.file_group),
        }
    }

    /// Fill every unset field with its default.
    pub fn resolve(self) -> Config {
        let r = self.restic;
        Config {
            restic: ResticConfig {
                exe: r.exe.unwrap_or_else(default_exe),
                scratch_dir: r.scratch_dir.unwrap_or_else(default_scratch_dir),
                hostname: r.hostname,
                repository: r.repository,
                password_file: r.password_file,
            },
            file_group: self.file_group.unwrap_or_default(),
        }
    }
}

// ─── Loader ───────────────────────────────────────────────────────────────────

/// Read `path` as a [`PartialConfig`].
///
/// Returns `Ok(None)` if the file does not exist and an error if it exists
/// but cannot be read or is not valid TOML.
pub fn parse_partial(path: &Path) -> Result<Option<PartialConfig>> {
    if !path.exists() {
        return Ok(None);
    }
    let text =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let partial = toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    Ok(Some(partial))
}

/// Location of the per-user global config, if the platform has one.
pub fn global_config_path() -> Option<PathBuf> {
    dirs_next::config_dir().map(|d| d.join("restic-wrapper").join("config.toml"))
}

/// Load configuration from two sources and merge them.
///
/// 1. `global` (normally [`global_config_path`]) holds machine-wide defaults such as the
///    repository and password file.  A broken global file is logged and ignored.
/// 2. `local` holds the per-project file groups and overrides.  A broken local file is an error;
///    a missing one only warns.
///
/// Local values win on a per-field basis.
pub fn load_merged(local: &Path, global: Option<&Path>) -> Result<Config> {
    let global: PartialConfig = match global.map(parse_partial) {
        Some(Ok(Some(p))) => p,
        Some(Err(e)) => {
            log::warn!("ignoring global config: {e:#}");
            PartialConfig::default()
        },
        _ => PartialConfig::default(),
    };

    let local = if let Some(p) = parse_partial(local)? {
        p
    } else {
        log::warn!(
            "config file '{}' not found, using defaults",
            local.display()
        );
        PartialConfig::default()
    };

    Ok(global.merge(local).resolve())
}

// ─── Tests ────────────────────────────────────────────────────────────────────
