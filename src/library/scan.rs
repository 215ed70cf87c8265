use std::io;
use std::path::Path;
use std::time::SystemTime;

use tracing::debug;
use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::model::DirEntry;

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// List regular files under `dir` together with their creation timestamps.
///
/// No extension filtering happens here; [`super::Library::load`] decides what
/// is playable. Only the root directory failing to open is an error.
pub fn list_entries(dir: &Path, settings: &LibrarySettings) -> io::Result<Vec<DirEntry>> {
    // Surface a missing/unreadable root instead of silently producing nothing.
    std::fs::read_dir(dir)?;

    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);

    // Non-recursive = only the root directory.
    if !settings.recursive {
        walker = walker.max_depth(1);
    }

    let mut entries = Vec::new();
    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(meta) = entry.metadata() else {
            continue;
        };
        let created = meta
            .created()
            .or_else(|_| meta.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);

        entries.push(DirEntry {
            path: entry.into_path(),
            created,
        });
    }

    debug!(dir = %dir.display(), count = entries.len(), "listed directory");
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn names(entries: &[DirEntry]) -> Vec<String> {
        let mut v: Vec<String> = entries
            .iter()
            .map(|e| e.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        v.sort();
        v
    }

    #[test]
    fn list_entries_returns_files_only() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.mp3"), b"x").unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        fs::create_dir_all(dir.path().join("sub")).unwrap();

        let entries = list_entries(dir.path(), &LibrarySettings::default()).unwrap();
        assert_eq!(names(&entries), vec!["a.mp3", "notes.txt"]);
    }

    #[test]
    fn list_entries_is_flat_unless_recursive() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("root.mp3"), b"x").unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir_all(&sub).unwrap();
        fs::write(sub.join("child.mp3"), b"x").unwrap();

        let flat = list_entries(dir.path(), &LibrarySettings::default()).unwrap();
        assert_eq!(names(&flat), vec!["root.mp3"]);

        let settings = LibrarySettings {
            recursive: true,
            ..LibrarySettings::default()
        };
        let deep = list_entries(dir.path(), &settings).unwrap();
        assert_eq!(names(&deep), vec!["child.mp3", "root.mp3"]);
    }

    #[test]
    fn list_entries_skips_hidden_by_default() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".hidden.mp3"), b"x").unwrap();
        fs::write(dir.path().join("visible.mp3"), b"x").unwrap();

        let entries = list_entries(dir.path(), &LibrarySettings::default()).unwrap();
        assert_eq!(names(&entries), vec!["visible.mp3"]);

        let settings = LibrarySettings {
            include_hidden: true,
            ..LibrarySettings::default()
        };
        let entries = list_entries(dir.path(), &settings).unwrap();
        assert_eq!(names(&entries), vec![".hidden.mp3", "visible.mp3"]);
    }

    #[test]
    fn list_entries_fails_for_missing_directory() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(list_entries(&missing, &LibrarySettings::default()).is_err());
    }
}
