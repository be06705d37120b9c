use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};

use super::artifact_lock::ArtifactLock;

/// Serializes `value` to `path` under the writer lock of its directory.
///
/// The bytes go to a sibling temp file first and are renamed into place, so a
/// reader never observes a half-written artifact.
pub fn save_artifact<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let dir = parent_dir(path);
    let _lock = ArtifactLock::writer(dir)?;

    let staging = path.with_extension("partial");
    {
        let file = File::create(&staging)
            .with_context(|| format!("failed to create {}", staging.display()))?;
        let mut writer = BufWriter::new(file);
        bincode::serialize_into(&mut writer, value)
            .with_context(|| format!("failed to serialize artifact {}", path.display()))?;
        writer.flush()?;
    }
    fs::rename(&staging, path)
        .with_context(|| format!("failed to move artifact into {}", path.display()))?;

    tracing::info!(target: "artifacts", path = %path.display(), "artifact saved");
    Ok(())
}

pub fn load_artifact<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let dir = parent_dir(path);
    let _lock = ArtifactLock::reader(dir)?;

    let file = File::open(path).with_context(|| format!("artifact not found: {}", path.display()))?;
    let value = bincode::deserialize_from(BufReader::new(file))
        .with_context(|| format!("failed to deserialize artifact {}", path.display()))?;

    tracing::debug!(target: "artifacts", path = %path.display(), "artifact loaded");
    Ok(value)
}

pub fn artifact_exists(path: &Path) -> bool {
    let exists = path.is_file();
    tracing::info!(target: "artifacts", path = %path.display(), exists, "checking artifact");
    exists
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}
