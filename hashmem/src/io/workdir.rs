use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Scratch directory for shard files and the reverse-complemented query.
/// Removed (with its contents) when dropped.
#[derive(Debug)]
pub struct WorkDir {
    path: PathBuf,
}

impl WorkDir {
    /// Create `<prefix>/<pid>_<UTC timestamp>_tmp`.
    pub fn create(prefix: &Path) -> Result<Self> {
        let stamp = chrono::Utc::now().format("%Y%m%d%H%M%S");
        let path = prefix.join(format!("{}_{}_tmp", std::process::id(), stamp));
        std::fs::create_dir_all(&path)
            .with_context(|| format!("cannot create work directory '{}'", path.display()))?;
        debug!(path = %path.display(), "work directory created");
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for WorkDir {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_dir_all(&self.path) {
            warn!(path = %self.path.display(), error = %e, "cannot remove work directory");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_lives_as_long_as_the_guard() {
        let tmp = tempfile::TempDir::new().unwrap();
        let dir = WorkDir::create(tmp.path()).unwrap();
        let path = dir.path().to_path_buf();
        assert!(path.is_dir());
        assert!(path.file_name().unwrap().to_string_lossy().ends_with("_tmp"));
        std::fs::write(path.join("0"), b"x").unwrap();
        drop(dir);
        assert!(!path.exists());
    }

    #[test]
    fn unwritable_prefix_is_an_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let file = tmp.path().join("plain");
        std::fs::write(&file, b"").unwrap();
        let err = WorkDir::create(&file).unwrap_err();
        assert!(err.to_string().contains("cannot create work directory"));
    }
}
