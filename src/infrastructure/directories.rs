use std::{fs, path::PathBuf};

use anyhow::{Context, Result};

use crate::config::DirectoryConfig;

#[derive(Debug, Clone)]
pub struct ResolvedPaths {
    pub models_dir: PathBuf,
    pub logs_dir: PathBuf,
}

pub fn ensure_directories(cfg: &DirectoryConfig) -> Result<ResolvedPaths> {
    ensure_dir(&cfg.interim_dir)?;
    ensure_dir(&cfg.processed_dir)?;
    let models_dir = ensure_dir(&cfg.models_dir)?;
    let logs_dir = ensure_dir(&cfg.logs_dir)?;

    let write_test = models_dir.join(".write-test");
    fs::write(&write_test, b"ok")
        .with_context(|| format!("models directory {} is not writable", models_dir.display()))?;
    fs::remove_file(&write_test)?;

    Ok(ResolvedPaths {
        models_dir,
        logs_dir,
    })
}

fn ensure_dir(path: &str) -> Result<PathBuf> {
    let dir = PathBuf::from(path);
    if !dir.exists() {
        fs::create_dir_all(&dir).with_context(|| format!("failed to create directory {}", path))?;
    }
    Ok(dir.canonicalize().unwrap_or(dir))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_missing_directories() {
        let root = tempfile::tempdir().unwrap();
        let sub = |name: &str| root.path().join(name).to_string_lossy().into_owned();
        let cfg = DirectoryConfig {
            input_dir: sub("data/raw"),
            interim_dir: sub("data/interim"),
            processed_dir: sub("data/processed"),
            models_dir: sub("models"),
            logs_dir: sub("logs"),
        };

        let paths = ensure_directories(&cfg).unwrap();
        assert!(root.path().join("data/interim").is_dir());
        assert!(root.path().join("data/processed").is_dir());
        assert!(paths.models_dir.is_dir());
        assert!(paths.logs_dir.is_dir());
        assert!(!paths.models_dir.join(".write-test").exists());
    }
}
