//! RunLock - 同時実行を防ぐ排他ロック
//!
//! ロックファイルに `flock(LOCK_EX | LOCK_NB)` を取り、
//! `RunLock` が drop されるまで保持する。

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::debug;

use super::StoreError;

/// Exclusive lock held for the lifetime of one run.
#[derive(Debug)]
pub struct RunLock {
    file: File,
    path: PathBuf,
}

impl RunLock {
    /// Takes the lock without waiting.
    ///
    /// Fails with `StoreError::Locked` if another run holds it.
    pub fn acquire(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| StoreError::io(&path, e))?;
        FileExt::try_lock_exclusive(&file).map_err(|_| StoreError::Locked(path.clone()))?;

        debug!(path = %path.display(), "acquired run lock");
        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        // closing the descriptor releases the lock as well
        let _ = FileExt::unlock(&self.file);
    }
}
