//! Gallery storage collaborator
//!
//! The pipeline itself never touches persistence; it only produces
//! values in the shape the gallery store expects. This module defines
//! that record shape and ships a minimal JSON-file key-value store so
//! the CLI can keep processed marks around, keyed by opaque ids.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

use crate::buffer::ProcessingResult;

/// Gallery error types
#[derive(Debug, Error)]
pub enum GalleryError {
    #[error("Invalid gallery file: {0}")]
    InvalidFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// What kind of mark an entry holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GalleryKind {
    /// Extracted from a photographed document
    Photo,
    /// Captured from the hand-drawn stroke canvas
    Handwriting,
    /// Generated custom stamp
    Stamp,
}

/// One stored mark
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryEntry {
    /// Opaque identifier
    pub id: Uuid,
    /// Entry kind
    pub kind: GalleryKind,
    /// Display name
    pub name: String,
    /// Encoded image as a `data:image/png;base64,` URI
    pub image: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Encoded size in bytes
    pub size: usize,
    /// Pixel width
    pub width: u32,
    /// Pixel height
    pub height: u32,
}

impl GalleryEntry {
    /// Build an entry from a finished processing result
    pub fn from_result(result: &ProcessingResult, kind: GalleryKind, name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            name: name.to_string(),
            image: result.data_uri(),
            created_at: Utc::now(),
            size: result.byte_size,
            width: result.width,
            height: result.height,
        }
    }
}

/// JSON-file backed gallery store
#[derive(Debug)]
pub struct GalleryStore {
    path: PathBuf,
    entries: Vec<GalleryEntry>,
}

impl GalleryStore {
    /// Open a store, loading existing entries; a missing file is an
    /// empty gallery
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, GalleryError> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents)
                .map_err(|e| GalleryError::InvalidFormat(e.to_string()))?
        } else {
            Vec::new()
        };
        Ok(Self { path, entries })
    }

    /// Persist the current entries
    pub fn save(&self) -> Result<(), GalleryError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| GalleryError::InvalidFormat(e.to_string()))?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    /// Add an entry
    pub fn add(&mut self, entry: GalleryEntry) {
        self.entries.push(entry);
    }

    /// Remove an entry by id, returning whether it existed
    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    /// Look up an entry by id
    pub fn get(&self, id: Uuid) -> Option<&GalleryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Entries sorted newest first
    pub fn list(&self) -> Vec<&GalleryEntry> {
        let mut entries: Vec<&GalleryEntry> = self.entries.iter().collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        entries
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the gallery is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn sample_result() -> ProcessingResult {
        let img = RgbaImage::from_pixel(8, 6, Rgba([9, 9, 9, 255]));
        ProcessingResult::from_rgba(img, 1).unwrap()
    }

    fn sample_entry(name: &str) -> GalleryEntry {
        GalleryEntry::from_result(&sample_result(), GalleryKind::Photo, name)
    }

    #[test]
    fn test_entry_from_result() {
        let entry = sample_entry("test signature");

        assert_eq!(entry.kind, GalleryKind::Photo);
        assert_eq!(entry.name, "test signature");
        assert_eq!((entry.width, entry.height), (8, 6));
        assert!(entry.size > 0);
        assert!(entry.image.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_open_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = GalleryStore::open(dir.path().join("gallery.json")).unwrap();

        assert!(store.is_empty());
    }

    #[test]
    fn test_add_save_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gallery.json");

        let mut store = GalleryStore::open(&path).unwrap();
        store.add(sample_entry("first"));
        store.add(sample_entry("second"));
        store.save().unwrap();

        let reloaded = GalleryStore::open(&path).unwrap();
        assert_eq!(reloaded.len(), 2);
    }

    #[test]
    fn test_remove_by_id() {
        let mut store = GalleryStore {
            path: PathBuf::from("/unused"),
            entries: Vec::new(),
        };
        let entry = sample_entry("doomed");
        let id = entry.id;
        store.add(entry);

        assert!(store.remove(id));
        assert!(!store.remove(id));
        assert!(store.get(id).is_none());
    }

    #[test]
    fn test_list_sorted_newest_first() {
        let mut store = GalleryStore {
            path: PathBuf::from("/unused"),
            entries: Vec::new(),
        };
        let mut older = sample_entry("older");
        older.created_at = Utc::now() - chrono::Duration::hours(2);
        let newer = sample_entry("newer");
        store.add(older);
        store.add(newer);

        let listed = store.list();
        assert_eq!(listed[0].name, "newer");
        assert_eq!(listed[1].name, "older");
    }

    #[test]
    fn test_open_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gallery.json");
        std::fs::write(&path, "{{{").unwrap();

        let result = GalleryStore::open(&path);
        assert!(matches!(result, Err(GalleryError::InvalidFormat(_))));
    }

    #[test]
    fn test_kind_serialization() {
        let json = serde_json::to_string(&GalleryKind::Handwriting).unwrap();
        assert_eq!(json, "\"handwriting\"");
    }
}
