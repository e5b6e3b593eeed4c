//! Recently opened files
//!
//! Kept as a JSON array, newest first, one entry per path.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::RECENT_FILES_LIMIT;
use crate::storage;

/// One opened file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentFile {
    /// File name for display
    pub name: String,
    /// Full path, the identity of the entry
    pub path: PathBuf,
    /// Size in bytes when opened
    pub size: u64,
    /// Records parsed when opened
    pub record_count: usize,
    /// Unix timestamp (seconds) of the open
    pub opened_at: i64,
}

/// Recent-files list stored in a JSON file
#[derive(Debug, Clone)]
pub struct RecentFiles {
    path: PathBuf,
}

impl RecentFiles {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the default location
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(crate::config::recent_files_path()?))
    }

    /// Entries, newest first; a missing file is an empty list
    pub fn list(&self) -> Result<Vec<RecentFile>> {
        Ok(storage::read_json(&self.path)?.unwrap_or_default())
    }

    /// Put `entry` first, dropping any older entry for the same path
    pub fn save(&self, entry: RecentFile) -> Result<Vec<RecentFile>> {
        let mut entries = self.list().unwrap_or_else(|e| {
            tracing::warn!("recent files unreadable, starting over: {:#}", e);
            Vec::new()
        });
        entries.retain(|e| e.path != entry.path);
        entries.insert(0, entry);
        entries.truncate(RECENT_FILES_LIMIT);
        self.write(&entries)?;
        Ok(entries)
    }

    pub fn clear(&self) -> Result<()> {
        self.write(&[])
    }

    fn write(&self, entries: &[RecentFile]) -> Result<()> {
        storage::write_json(&self.path, entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    fn entry(path: &str, opened_at: i64) -> RecentFile {
        RecentFile {
            name: Path::new(path)
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
            path: PathBuf::from(path),
            size: 100,
            record_count: 3,
            opened_at,
        }
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecentFiles::new(dir.path().join("recent.json"));
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_save_prepends_and_dedupes() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecentFiles::new(dir.path().join("nested").join("recent.json"));
        store.save(entry("/data/a.csv", 1)).unwrap();
        store.save(entry("/data/b.csv", 2)).unwrap();
        store.save(entry("/data/a.csv", 3)).unwrap();

        let list = store.list().unwrap();
        let paths: Vec<&Path> = list.iter().map(|e| e.path.as_path()).collect();
        assert_eq!(paths, vec![Path::new("/data/a.csv"), Path::new("/data/b.csv")]);
        assert_eq!(list[0].opened_at, 3);
        assert_eq!(list[0].name, "a.csv");
    }

    #[test]
    fn test_save_caps_length() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecentFiles::new(dir.path().join("recent.json"));
        for i in 0..15 {
            store.save(entry(&format!("/data/{i}.csv"), i)).unwrap();
        }
        let list = store.list().unwrap();
        assert_eq!(list.len(), RECENT_FILES_LIMIT);
        assert_eq!(list[0].path, PathBuf::from("/data/14.csv"));
    }

    #[test]
    fn test_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecentFiles::new(dir.path().join("recent.json"));
        store.save(entry("/data/a.csv", 1)).unwrap();
        store.clear().unwrap();
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_file_is_replaced_on_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recent.json");
        fs::write(&path, "{not json").unwrap();
        let store = RecentFiles::new(&path);
        assert!(store.list().is_err());
        store.save(entry("/data/a.csv", 1)).unwrap();
        assert_eq!(store.list().unwrap().len(), 1);
    }
}
