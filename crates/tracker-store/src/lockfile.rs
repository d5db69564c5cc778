use crate::error::StoreError;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Exclusive write lock on a state file.
///
/// Holding the lock means owning `<target>.lock`, created with `create_new`
/// so a second writer fails instead of waiting. New content is staged in the
/// lock file and renamed over the target on commit, so the previous state
/// survives a crash mid-write. An uncommitted lock removes its file on drop.
pub struct WriteLock {
    target: PathBuf,
    lock_path: PathBuf,
    file: Option<fs::File>,
}

/// `decisions.json` -> `decisions.json.lock`.
pub fn lock_path_for(target: &Path) -> PathBuf {
    target.with_extension(
        target
            .extension()
            .map(|e| format!("{}.lock", e.to_string_lossy()))
            .unwrap_or_else(|| "lock".to_string()),
    )
}

impl WriteLock {
    pub fn acquire(target: impl AsRef<Path>) -> Result<Self, StoreError> {
        let target = target.as_ref().to_path_buf();
        let lock_path = lock_path_for(&target);

        if let Some(parent) = lock_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&lock_path)
        {
            Ok(file) => Ok(Self {
                target,
                lock_path,
                file: Some(file),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                Err(StoreError::LockConflict(lock_path.display().to_string()))
            }
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Stage the full replacement content.
    pub fn write_all(&mut self, data: &[u8]) -> Result<(), StoreError> {
        match self.file {
            Some(ref mut file) => {
                file.write_all(data)?;
                file.flush()?;
                Ok(())
            }
            None => Err(StoreError::LockConflict("lock already committed".into())),
        }
    }

    /// Flush staged content to disk and move it over the target.
    pub fn commit(mut self) -> Result<(), StoreError> {
        if let Some(file) = self.file.take() {
            file.sync_all()?;
        }
        fs::rename(&self.lock_path, &self.target)?;
        Ok(())
    }
}

impl Drop for WriteLock {
    fn drop(&mut self) {
        if self.file.is_some() {
            let _ = fs::remove_file(&self.lock_path);
        }
    }
}
