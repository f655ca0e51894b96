use crate::error::Error;
use crate::snapshot::Snapshot;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Snapshot persistence boundary. The byte format is opaque to the rest of
/// the pipeline; the only contract is an exact round trip of the snapshot's
/// fields.
pub fn serialize(snapshot: &Snapshot) -> Result<Vec<u8>, Error> {
    Ok(bincode::serialize(snapshot)?)
}

pub fn deserialize(bytes: &[u8]) -> Result<Snapshot, Error> {
    Ok(bincode::deserialize(bytes)?)
}

pub fn save_snapshot(snapshot: &Snapshot, path: &Path) -> Result<(), Error> {
    let bytes = serialize(snapshot)?;
    fs::write(path, &bytes)?;
    debug!(
        "Saved snapshot of '{}' ({} records, {} bytes) to '{}'",
        snapshot.root_dir().display(),
        snapshot.len(),
        bytes.len(),
        path.display()
    );
    Ok(())
}

pub fn load_snapshot(path: &Path) -> Result<Snapshot, Error> {
    let bytes = fs::read(path)?;
    let snapshot = deserialize(&bytes)?;
    debug!(
        "Loaded snapshot of '{}' ({} records) from '{}'",
        snapshot.root_dir().display(),
        snapshot.len(),
        path.display()
    );
    Ok(snapshot)
}
