//! Snapshot records as reported by `restic snapshots --json`.
//!
//! These are plain read-only values: restic owns the snapshot lifecycle and
//! this crate only ever decodes them.
//!
//! ```json
//! [
//!   {
//!     "id": "4a7a2f5e0d1c...",
//!     "time": "2024-03-01T02:00:04.590914146+01:00",
//!     "tree": "b9c1e0...",
//!     "paths": ["/srv/data"],
//!     "hostname": "db-1",
//!     "username": "root",
//!     "uid": 0,
//!     "gid": 0,
//!     "tags": ["nightly"]
//!   }
//! ]
//! ```

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::error::ResticError;

/// One point-in-time backup record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Snapshot {
    pub id: String,
    pub time: DateTime<FixedOffset>,
    pub tree: String,
    pub paths: Vec<String>,
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub username: String,

    /// Owner of the backup process.  restic omits zero ids, so a missing
    /// `uid` or `gid` means 0 (root), not an unknown owner.
    #[serde(default)]
    pub uid: u32,
    #[serde(default)]
    pub gid: u32,

    /// Tags attached at backup time.  Absent in the JSON when untagged.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Snapshot this one was diffed against, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

impl Snapshot {
    /// The abbreviated id restic prints in its own tables.
    pub fn short_id(&self) -> &str {
        self.id.get(..8).unwrap_or(&self.id)
    }
}

/// Decode the stdout of `restic snapshots --json`.
///
/// Older restic releases print `null` for an empty repository, which decodes
/// to an empty list.  Blank output is a decode error.
pub fn parse_snapshots(json: &str) -> Result<Vec<Snapshot>, ResticError> {
    let snapshots: Option<Vec<Snapshot>> = serde_json::from_str(json)?;
    Ok(snapshots.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_SNAPSHOTS: &str = r#"[
        {
            "id": "4a7a2f5e0d1c9b8a7f6e5d4c3b2a19080706050403020100ffeeddccbbaa9988",
            "time": "2024-03-01T02:00:04.590914146+01:00",
            "tree": "b9c1e0aa55",
            "paths": ["/srv/data"],
            "hostname": "db-1",
            "username": "root",
            "uid": 0,
            "gid": 0
        },
        {
            "id": "c0ffee",
            "time": "2024-03-02T02:00:00Z",
            "tree": "d00d",
            "paths": ["/home/alice", "/etc"],
            "hostname": "laptop",
            "username": "alice",
            "uid": 1000,
            "gid": 100,
            "tags": ["nightly", "app:web"],
            "parent": "4a7a2f5e"
        }
    ]"#;

    #[test]
    fn parses_every_entry_in_order() {
        let snaps = parse_snapshots(TWO_SNAPSHOTS).unwrap();
        assert_eq!(snaps.len(), 2);
        assert_eq!(snaps[0].hostname, "db-1");
        assert_eq!(snaps[1].hostname, "laptop");
    }

    #[test]
    fn fields_are_decoded_exactly() {
        let snaps = parse_snapshots(TWO_SNAPSHOTS).unwrap();
        let s = &snaps[1];
        assert_eq!(s.id, "c0ffee");
        assert_eq!(s.tree, "d00d");
        assert_eq!(s.paths, vec!["/home/alice", "/etc"]);
        assert_eq!(s.username, "alice");
        assert_eq!(s.uid, 1000);
        assert_eq!(s.gid, 100);
        assert_eq!(s.tags, vec!["nightly", "app:web"]);
        assert_eq!(s.parent.as_deref(), Some("4a7a2f5e"));
        assert_eq!(
            s.time,
            DateTime::parse_from_rfc3339("2024-03-02T02:00:00+00:00").unwrap()
        );
    }

    #[test]
    fn sub_second_time_and_offset_are_kept() {
        let snaps = parse_snapshots(TWO_SNAPSHOTS).unwrap();
        let t = snaps[0].time;
        assert_eq!(t.offset().local_minus_utc(), 3600);
        assert_eq!(t.timestamp_subsec_nanos(), 590_914_146);
    }

    #[test]
    fn optional_fields_default_when_absent() {
        let snaps = parse_snapshots(TWO_SNAPSHOTS).unwrap();
        assert!(snaps[0].tags.is_empty());
        assert!(snaps[0].parent.is_none());
    }

    #[test]
    fn reencoded_list_decodes_to_the_same_records() {
        let snaps = parse_snapshots(TWO_SNAPSHOTS).unwrap();
        let json = serde_json::to_string(&snaps).unwrap();
        assert_eq!(parse_snapshots(&json).unwrap(), snaps);
    }

    #[test]
    fn untagged_snapshot_serialises_without_optional_keys() {
        let snaps = parse_snapshots(TWO_SNAPSHOTS).unwrap();
        let v = serde_json::to_value(&snaps[0]).unwrap();
        let obj = v.as_object().unwrap();
        assert!(!obj.contains_key("tags"));
        assert!(!obj.contains_key("parent"));
        assert_eq!(obj.len(), 8);
    }

    #[test]
    fn empty_array_and_null_are_empty() {
        assert!(parse_snapshots("[]").unwrap().is_empty());
        assert!(parse_snapshots("null\n").unwrap().is_empty());
    }

    #[test]
    fn blank_output_is_a_decode_error() {
        assert!(matches!(parse_snapshots(""), Err(ResticError::Decode(_))));
        assert!(matches!(parse_snapshots("  \n"), Err(ResticError::Decode(_))));
    }

    #[test]
    fn root_snapshot_without_ids_decodes_as_zero() {
        let json = r#"[{"id":"abc","short_id":"abc","time":"2024-01-01T00:00:00Z",
                        "tree":"t","paths":["/p"],"hostname":"h","username":"root"}]"#;
        let snaps = parse_snapshots(json).unwrap();
        assert_eq!(snaps.len(), 1);
        assert_eq!(snaps[0].username, "root");
        assert_eq!(snaps[0].uid, 0);
        assert_eq!(snaps[0].gid, 0);
    }

    #[test]
    fn missing_host_and_user_default_to_empty() {
        let json = r#"[{"id":"abc","time":"2024-01-01T00:00:00Z","tree":"t","paths":["/p"]}]"#;
        let snaps = parse_snapshots(json).unwrap();
        assert!(snaps[0].hostname.is_empty());
        assert!(snaps[0].username.is_empty());
    }

    #[test]
    fn malformed_json_is_a_decode_error() {
        let err = parse_snapshots("[{\"id\": 5}]").unwrap_err();
        assert!(matches!(err, ResticError::Decode(_)));
    }

    #[test]
    fn short_id_truncates_to_eight_chars() {
        let snaps = parse_snapshots(TWO_SNAPSHOTS).unwrap();
        assert_eq!(snaps[0].short_id(), "4a7a2f5e");
        // Ids shorter than eight characters are returned whole.
        assert_eq!(snaps[1].short_id(), "c0ffee");
    }
}
