//! Directory-backed collection listing.
//!
//! The filesystem is the index: immediate subdirectories of the root are
//! collections, and files inside a collection are items. Nothing is cached,
//! so every call observes collections added by concurrent writers.

use std::path::{Path, PathBuf};

use mediakey_core::{Collection, Item, Result};
use tokio::fs;
use tracing::{trace, warn};

/// Lists collections under a root directory.
#[derive(Debug, Clone)]
pub struct CollectionDirectory {
    root: PathBuf,
}

impl CollectionDirectory {
    /// Create a listing over the given root directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// List every collection, sorted by directory name.
    ///
    /// Non-directory entries and names that are not valid UTF-8 are skipped.
    /// An unreadable root is an error.
    pub async fn list_collections(&self) -> Result<Vec<Collection>> {
        let mut entries = fs::read_dir(&self.root).await.map_err(|e| {
            warn!(path = %self.root.display(), error = %e, "directory: read_dir failed");
            e
        })?;

        let mut collections = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            // Follows symlinks, so a linked collection directory counts
            let is_dir = match fs::metadata(&path).await {
                Ok(meta) => meta.is_dir(),
                Err(e) => {
                    trace!(path = %path.display(), error = %e, "directory: skipping unreadable entry");
                    false
                }
            };
            if !is_dir {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => collections.push(Collection::new(name, path)),
                Err(raw) => {
                    trace!(name = ?raw, "directory: skipping non-UTF-8 collection name");
                }
            }
        }

        collections.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(collections)
    }

    /// List every file in a collection, sorted by path.
    ///
    /// Items are classified by extension here; filtering happens later.
    pub async fn list_items(collection: &Collection) -> Result<Vec<Item>> {
        let mut entries = fs::read_dir(&collection.path).await.map_err(|e| {
            warn!(path = %collection.path.display(), error = %e, "directory: read_dir failed");
            e
        })?;

        let mut items = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_file = fs::metadata(&path)
                .await
                .map(|meta| meta.is_file())
                .unwrap_or(false);
            if is_file {
                items.push(Item::new(path));
            }
        }

        items.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(items)
    }
}
