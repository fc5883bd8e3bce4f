//! Persistence layer.
//!
//! Saves and loads session snapshots to/from a JSON file. A snapshot is
//! always written and read whole; there is no partial merge.

pub mod snapshot;

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, info};

pub use snapshot::{SectorSnapshot, Snapshot};

/// Default snapshot file path.
pub const DEFAULT_SNAPSHOT_FILE: &str = "edusupply_snapshot.json";

/// Save a snapshot to a JSON file.
pub fn save_snapshot(snapshot: &Snapshot, path: Option<&str>) -> Result<()> {
    let path = path.unwrap_or(DEFAULT_SNAPSHOT_FILE);
    let json = snapshot.to_json().context("Failed to serialise snapshot")?;

    std::fs::write(path, &json).context(format!("Failed to write snapshot to {path}"))?;

    debug!(
        path,
        institution = %snapshot.institution_name,
        capital = %snapshot.total_capital,
        "Snapshot saved"
    );
    Ok(())
}

/// Load a snapshot from a JSON file.
/// Returns None if the file doesn't exist.
pub fn load_snapshot(path: Option<&str>) -> Result<Option<Snapshot>> {
    let path = path.unwrap_or(DEFAULT_SNAPSHOT_FILE);

    if !Path::new(path).exists() {
        info!(path, "No saved snapshot found");
        return Ok(None);
    }

    let json = std::fs::read_to_string(path).context(format!("Failed to read snapshot from {path}"))?;
    let snapshot = Snapshot::from_json(&json).context(format!("Failed to parse snapshot from {path}"))?;

    info!(
        path,
        institution = %snapshot.institution_name,
        capital = %snapshot.total_capital,
        locked = snapshot.capital_locked,
        "Snapshot loaded from disk"
    );

    Ok(Some(snapshot))
}

/// Delete the snapshot file (for reset).
pub fn delete_snapshot(path: Option<&str>) -> Result<()> {
    let path = path.unwrap_or(DEFAULT_SNAPSHOT_FILE);
    if Path::new(path).exists() {
        std::fs::remove_file(path).context(format!("Failed to delete snapshot file {path}"))?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
