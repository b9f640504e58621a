// src/output/store.rs
//! Reads and writes snapshot files.
//!
//! This module is the only place where file I/O occurs.

use super::paths::{is_inside, snapshot_path, staging_path};
use super::snapshot::{Snapshot, SnapshotHeader};
use crate::error::AppError;
use crate::types::PostId;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

/// The directory holding one snapshot per post.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, id: &PostId) -> PathBuf {
        snapshot_path(&self.dir, id)
    }

    /// The stored header of a post. A missing file is `None`; so is a file
    /// that cannot be read as a snapshot, which will simply be replaced.
    pub fn load_header(&self, id: &PostId) -> Result<Option<SnapshotHeader>, AppError> {
        let path = self.path_for(id);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<SnapshotHeader>(&content) {
            Ok(header) => Ok(Some(header)),
            Err(e) => {
                log::warn!(
                    "Ignoring unreadable snapshot: {}",
                    AppError::JsonParseError {
                        path: path.clone(),
                        source: e,
                    }
                );
                Ok(None)
            }
        }
    }

    /// Replaces the snapshot of a post. The file is written beside the target
    /// and renamed over it, so readers never see a half-written snapshot.
    pub fn save(&self, id: &PostId, snapshot: &Snapshot<'_>) -> Result<PathBuf, AppError> {
        let path = self.path_for(id);
        if !is_inside(&path, &self.dir) {
            return Err(AppError::Io(std::io::Error::new(
                ErrorKind::InvalidInput,
                format!("Snapshot path escapes the archive: {}", path.display()),
            )));
        }

        let content = snapshot.to_json()?;
        self.create_directory()?;

        let staging = staging_path(&path);
        log::debug!("Writing {} bytes to {}", content.len(), staging.display());
        fs::write(&staging, &content)?;
        fs::rename(&staging, &path)?;

        log::info!("Wrote snapshot: {}", path.display());
        Ok(path)
    }

    fn create_directory(&self) -> Result<(), AppError> {
        if self.dir.exists() {
            if self.dir.is_dir() {
                return Ok(());
            }
            return Err(AppError::Io(std::io::Error::new(
                ErrorKind::AlreadyExists,
                format!("Path exists but is not a directory: {}", self.dir.display()),
            )));
        }

        fs::create_dir_all(&self.dir)?;
        log::info!("Created directory: {}", self.dir.display());
        Ok(())
    }
}
