//! Library manifest loading (spec §3, §4.6): a JSON description of the tracks to build.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::CoreError;

/// One track to be built into the index.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ManifestEntry {
    pub song_id: i64,
    pub artist: String,
    pub title: String,
    pub source: PathBuf,
}

/// Accepts either a single JSON object or an array of objects, since a one-track library is a
/// natural thing to hand-write without wrapping it in `[...]`.
#[derive(Deserialize)]
#[serde(untagged)]
enum ManifestBody {
    One(ManifestEntry),
    Many(Vec<ManifestEntry>),
}

/// Loads and parses a manifest file from disk.
pub fn load_manifest(path: impl AsRef<Path>) -> Result<Vec<ManifestEntry>, CoreError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| CoreError::Usage(format!(
        "failed to read manifest {}: {e}",
        path.display()
    )))?;

    let body: ManifestBody = serde_json::from_str(&text)
        .map_err(|e| CoreError::Usage(format!("invalid manifest {}: {e}", path.display())))?;

    let entries = match body {
        ManifestBody::One(entry) => vec![entry],
        ManifestBody::Many(entries) => entries,
    };

    if entries.is_empty() {
        return Err(CoreError::Usage(format!(
            "manifest {} contains no entries",
            path.display()
        )));
    }

    Ok(entries)
}
