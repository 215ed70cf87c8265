use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// A playable file plus the name shown for it (the file's basename).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub path: PathBuf,
    pub name: String,
}

impl Track {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = basename(&path);
        Self { path, name }
    }
}

fn basename(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// One directory listing entry, as produced by [`super::list_entries`].
#[derive(Debug, Clone)]
pub struct DirEntry {
    pub path: PathBuf,
    /// Creation time, or modification time on platforms that lack it.
    pub created: SystemTime,
}
