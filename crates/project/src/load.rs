//! Snapshot deserialization — loading `SessionSnapshot` from JSON.
//!
//! Loading is deliberately lenient: a snapshot with repairable defects
//! (duplicate owners, duplicate dependent ids, an owner depending on
//! itself) loads with the defects repaired and a warning, because files
//! written by older builds or edited by hand must never strand a user.
//! Hard failures are reserved for unreadable JSON and unknown versions.

use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::{PersistError, PersistResult};
use crate::types::{SessionSnapshot, SNAPSHOT_VERSION};

/// Deserialize a snapshot from a JSON string.
pub fn from_json_string(json: &str) -> PersistResult<SessionSnapshot> {
    // First parse as generic Value to check the version before committing
    // to the typed shape
    let value: serde_json::Value = serde_json::from_str(json)?;
    check_version(&value)?;

    let mut snapshot: SessionSnapshot = serde_json::from_value(value)?;
    sanitize_snapshot(&mut snapshot);

    debug!(
        version = snapshot.version,
        owners = snapshot.owners.len(),
        "Deserialized snapshot from JSON"
    );

    Ok(snapshot)
}

/// Load a snapshot from a file at the given path.
pub fn load_snapshot(path: &Path) -> PersistResult<SessionSnapshot> {
    if !path.exists() {
        return Err(PersistError::NotFound {
            path: path.display().to_string(),
        });
    }

    let json = std::fs::read_to_string(path).map_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "Failed to read snapshot file");
        PersistError::Io(e)
    })?;

    let snapshot = from_json_string(&json)?;

    info!(
        path = %path.display(),
        owners = snapshot.owners.len(),
        "Snapshot loaded successfully"
    );

    Ok(snapshot)
}

fn check_version(value: &serde_json::Value) -> PersistResult<()> {
    let obj = value
        .as_object()
        .ok_or_else(|| PersistError::InvalidSnapshot {
            reason: "snapshot root must be a JSON object".into(),
        })?;

    let version = obj
        .get("version")
        .and_then(|v| v.as_u64())
        .ok_or_else(|| PersistError::InvalidSnapshot {
            reason: "missing or non-integer version field".into(),
        })? as u32;

    if version != SNAPSHOT_VERSION {
        return Err(PersistError::UnsupportedVersion { version });
    }
    Ok(())
}

/// Repair defects that must not block a load.
fn sanitize_snapshot(snapshot: &mut SessionSnapshot) {
    let mut seen_owners: HashSet<_> = HashSet::new();
    snapshot.owners.retain(|owner| {
        if seen_owners.insert(owner.owner_id) {
            true
        } else {
            warn!(owner_id = %owner.owner_id, "Duplicate owner entry dropped, first wins");
            false
        }
    });

    for owner in &mut snapshot.owners {
        let owner_id = owner.owner_id;
        let mut seen = HashSet::new();
        owner.bound_node_ids.retain(|id| {
            if *id == owner_id {
                warn!(owner_id = %owner_id, "Owner listed itself as dependent, dropped");
                return false;
            }
            if seen.insert(*id) {
                true
            } else {
                warn!(owner_id = %owner_id, node_id = %id, "Duplicate dependent id dropped");
                false
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::save::{save_snapshot, to_json_string};
    use crate::types::OwnerState;
    use ph_common::NodeId;

    fn sample_snapshot() -> SessionSnapshot {
        let mut snapshot = SessionSnapshot::new();
        snapshot.union_value = Some(12.0);
        let mut owner = OwnerState::new(NodeId(3));
        owner.lock_when_outside = true;
        owner.bound_node_ids = vec![NodeId(4)];
        snapshot.owners.push(owner);
        snapshot
    }

    #[test]
    fn from_json_string_round_trips() {
        let snapshot = sample_snapshot();
        let json = to_json_string(&snapshot).expect("serialize");
        let loaded = from_json_string(&json).expect("deserialize");
        assert_eq!(loaded, snapshot);
    }

    #[test]
    fn load_snapshot_file_roundtrip() {
        let dir = std::env::temp_dir().join("ph_snapshot_load_test");
        let _ = std::fs::create_dir_all(&dir);
        let path = dir.join("session.phs");

        save_snapshot(&sample_snapshot(), &path).expect("save");
        let loaded = load_snapshot(&path).expect("load");
        assert_eq!(loaded.union_value, Some(12.0));

        // Clean up
        let _ = std::fs::remove_file(&path);
        let _ = std::fs::remove_dir(&dir);
    }

    #[test]
    fn load_snapshot_nonexistent_file() {
        let path = std::path::PathBuf::from("/nonexistent/path/session.phs");
        let err = load_snapshot(&path).unwrap_err();
        assert!(matches!(err, PersistError::NotFound { .. }));
    }

    #[test]
    fn rejects_unknown_version() {
        let err = from_json_string(r#"{"version":99,"owners":[]}"#).unwrap_err();
        assert!(matches!(
            err,
            PersistError::UnsupportedVersion { version: 99 }
        ));
    }

    #[test]
    fn rejects_missing_version() {
        let err = from_json_string(r#"{"owners":[]}"#).unwrap_err();
        assert!(matches!(err, PersistError::InvalidSnapshot { .. }));
    }

    #[test]
    fn duplicate_owner_entries_first_wins() {
        let json = r#"{
            "version": 1,
            "owners": [
                {"ownerId": 3, "hideWhenOutside": true},
                {"ownerId": 3, "hideWhenOutside": false}
            ]
        }"#;
        let snapshot = from_json_string(json).expect("load");
        assert_eq!(snapshot.owners.len(), 1);
        assert!(snapshot.owners[0].hide_when_outside);
    }

    #[test]
    fn self_and_duplicate_dependents_are_dropped() {
        let json = r#"{
            "version": 1,
            "owners": [
                {"ownerId": 3, "boundNodeIds": [4, 3, 4, 5]}
            ]
        }"#;
        let snapshot = from_json_string(json).expect("load");
        assert_eq!(snapshot.owners[0].bound_node_ids, vec![NodeId(4), NodeId(5)]);
    }
}
