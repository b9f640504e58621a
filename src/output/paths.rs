// src/output/paths.rs
//! Pure functions for snapshot locations.

use crate::types::PostId;
use std::path::{Component, Path, PathBuf};

/// The snapshot file of a post.
pub fn snapshot_path(archive_dir: &Path, id: &PostId) -> PathBuf {
    archive_dir.join(format!("{}.json", id))
}

/// The sibling a snapshot is written to before it replaces the real file.
pub fn staging_path(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".partial");
    target.with_file_name(name)
}

/// Checks that `path` stays inside `base_dir` once `..` and `.` are resolved.
pub fn is_inside(path: &Path, base_dir: &Path) -> bool {
    normalize_path(path).starts_with(normalize_path(base_dir))
}

fn normalize_path(path: &Path) -> PathBuf {
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            Component::ParentDir => {
                components.pop();
            }
            Component::CurDir => {}
            c => components.push(c),
        }
    }

    components.into_iter().collect()
}
