//! Snapshot serialization — writing `SessionSnapshot` to JSON files.

use std::path::Path;

use tracing::{debug, info};

use crate::error::{PersistError, PersistResult};
use crate::types::SessionSnapshot;

/// Serialize a snapshot to a pretty-printed JSON string.
pub fn to_json_string(snapshot: &SessionSnapshot) -> PersistResult<String> {
    let json = serde_json::to_string_pretty(snapshot)?;
    debug!(
        owners = snapshot.owners.len(),
        json_len = json.len(),
        "Serialized snapshot to JSON"
    );
    Ok(json)
}

/// Serialize a snapshot to a compact (non-pretty) JSON string, the form
/// embedded into the host's own document file.
pub fn to_json_string_compact(snapshot: &SessionSnapshot) -> PersistResult<String> {
    Ok(serde_json::to_string(snapshot)?)
}

/// Save a snapshot to a file at the given path.
///
/// The file is written atomically: data goes to a temporary file in the
/// same directory first, then a rename moves it into place. An interrupted
/// write can not destroy the previous snapshot.
pub fn save_snapshot(snapshot: &SessionSnapshot, path: &Path) -> PersistResult<()> {
    let json = to_json_string(snapshot)?;

    let temp_path = path.with_extension("phs.tmp");

    std::fs::write(&temp_path, json.as_bytes()).map_err(|e| {
        tracing::error!(path = %temp_path.display(), error = %e, "Failed to write temp file");
        PersistError::Io(e)
    })?;

    std::fs::rename(&temp_path, path).map_err(|e| {
        // If rename fails, try to clean up the temp file (best effort).
        let _ = std::fs::remove_file(&temp_path);
        tracing::error!(
            from = %temp_path.display(),
            to = %path.display(),
            error = %e,
            "Failed to rename temp file to target"
        );
        PersistError::Io(e)
    })?;

    info!(
        path = %path.display(),
        owners = snapshot.owners.len(),
        "Snapshot saved successfully"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OwnerState;
    use ph_common::NodeId;

    fn sample_snapshot() -> SessionSnapshot {
        let mut snapshot = SessionSnapshot::new();
        snapshot.union_value = Some(30.0);
        let mut owner = OwnerState::new(NodeId(5));
        owner.hide_when_outside = true;
        owner.bound_node_ids = vec![NodeId(6), NodeId(7)];
        snapshot.owners.push(owner);
        snapshot
    }

    #[test]
    fn to_json_string_produces_valid_json() {
        let json = to_json_string(&sample_snapshot()).expect("serialize");
        let _: serde_json::Value = serde_json::from_str(&json).expect("parse as Value");
        assert!(json.contains("\"version\": 1"));
    }

    #[test]
    fn to_json_string_compact_is_smaller() {
        let snapshot = sample_snapshot();
        let pretty = to_json_string(&snapshot).expect("pretty");
        let compact = to_json_string_compact(&snapshot).expect("compact");
        assert!(compact.len() < pretty.len());
    }

    #[test]
    fn save_snapshot_creates_file_without_temp_residue() {
        let dir = std::env::temp_dir().join("ph_snapshot_save_test");
        let _ = std::fs::create_dir_all(&dir);
        let path = dir.join("session.phs");
        let temp_path = path.with_extension("phs.tmp");

        save_snapshot(&sample_snapshot(), &path).expect("save");

        assert!(path.exists());
        assert!(!temp_path.exists());

        // Clean up
        let _ = std::fs::remove_file(&path);
        let _ = std::fs::remove_dir(&dir);
    }
}
