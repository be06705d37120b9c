use std::{
    fs::{self, File, OpenOptions},
    io::{ErrorKind, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
    process, thread,
    time::{Duration, Instant},
};

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use fs2::FileExt;
use serde::{Deserialize, Serialize};

const LOCK_FILENAME: &str = ".artifacts.lock";
const WAIT_INTERVAL: Duration = Duration::from_millis(200);
const MAX_WAIT: Duration = Duration::from_secs(20);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    Writer,
    Reader,
}

/// Advisory lock over an artifact directory: one writer or many readers.
#[derive(Debug)]
pub struct ArtifactLock {
    file: File,
    path: PathBuf,
}

impl ArtifactLock {
    pub fn writer(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to ensure artifact dir {}", dir.display()))?;
        let path = dir.join(LOCK_FILENAME);
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .with_context(|| format!("failed to open lock file {}", path.display()))?;

        let mut lock = Self::wait_for(file, path, LockMode::Writer)?;
        write_lock_info(&mut lock.file, process::id())?;
        Ok(lock)
    }

    /// Takes the shared lock without touching the filesystem.
    ///
    /// Returns `None` when no writer has ever locked `dir`, since there is
    /// nothing to wait for.
    pub fn reader(dir: &Path) -> Result<Option<Self>> {
        let path = dir.join(LOCK_FILENAME);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::debug!(target: "artifacts", path = %path.display(), "no lock file; reading unlocked");
                return Ok(None);
            }
            Err(err) => {
                return Err(err).with_context(|| format!("failed to open lock file {}", path.display()))
            }
        };
        Self::wait_for(file, path, LockMode::Reader).map(Some)
    }

    fn wait_for(file: File, path: PathBuf, mode: LockMode) -> Result<Self> {
        let start = Instant::now();
        loop {
            let attempt = match mode {
                LockMode::Writer => FileExt::try_lock_exclusive(&file),
                LockMode::Reader => FileExt::try_lock_shared(&file),
            };
            match attempt {
                Ok(()) => {
                    tracing::debug!(target: "artifacts", path = %path.display(), ?mode, "acquired artifact lock");
                    return Ok(Self { file, path });
                }
                Err(err)
                    if err.kind() == ErrorKind::WouldBlock
                        || err.raw_os_error() == fs2::lock_contended_error().raw_os_error() =>
                {
                    tracing::debug!(target: "artifacts", path = %path.display(), "artifact lock busy; waiting");
                }
                Err(err) => return Err(err.into()),
            }

            if start.elapsed() > MAX_WAIT {
                return Err(anyhow!(
                    "artifact lock {} is still held after {:?}",
                    path.display(),
                    MAX_WAIT
                ));
            }
            thread::sleep(WAIT_INTERVAL);
        }
    }
}

impl Drop for ArtifactLock {
    fn drop(&mut self) {
        if let Err(err) = FileExt::unlock(&self.file) {
            tracing::warn!(
                target: "artifacts",
                path = %self.path.display(),
                error = %err,
                "failed to release artifact lock"
            );
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct LockInfo {
    pid: u32,
    locked_at: i64,
}

fn write_lock_info(file: &mut File, pid: u32) -> Result<()> {
    let info = LockInfo {
        pid,
        locked_at: Utc::now().timestamp_millis(),
    };
    let payload = serde_json::to_vec(&info)?;
    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;
    file.write_all(&payload)?;
    file.sync_all()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readers_share_the_lock() {
        let dir = tempfile::tempdir().unwrap();
        drop(ArtifactLock::writer(dir.path()).unwrap());
        let first = ArtifactLock::reader(dir.path()).unwrap();
        let second = ArtifactLock::reader(dir.path()).unwrap();
        assert!(first.is_some());
        assert!(second.is_some());
    }

    #[test]
    fn writer_records_its_pid() {
        let dir = tempfile::tempdir().unwrap();
        let _lock = ArtifactLock::writer(dir.path()).unwrap();
        let info: LockInfo =
            serde_json::from_slice(&fs::read(dir.path().join(LOCK_FILENAME)).unwrap()).unwrap();
        assert_eq!(info.pid, process::id());
    }

    #[test]
    fn writer_follows_released_readers() {
        let dir = tempfile::tempdir().unwrap();
        drop(ArtifactLock::writer(dir.path()).unwrap());
        drop(ArtifactLock::reader(dir.path()).unwrap());
        ArtifactLock::writer(dir.path()).unwrap();
    }

    #[test]
    fn reader_never_creates_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("models");

        assert!(ArtifactLock::reader(&missing).unwrap().is_none());
        assert!(ArtifactLock::reader(dir.path()).unwrap().is_none());
        assert!(!missing.exists());
        assert!(!dir.path().join(LOCK_FILENAME).exists());
    }
}
