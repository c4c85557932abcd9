//! Random media selection from a collection.
//!
//! Items are drawn independently and uniformly *with replacement*, so the same
//! file may appear more than once in one response.

use mediakey_core::{Collection, Item, MediaItem, RandomSource, Result};
use tracing::debug;

use crate::directory::CollectionDirectory;

/// Draws media items from collections.
pub struct MediaPicker<'r> {
    rng: &'r dyn RandomSource,
    max_output: u32,
}

impl<'r> MediaPicker<'r> {
    /// `max_output` below 1 behaves as 1.
    pub fn new(rng: &'r dyn RandomSource, max_output: u32) -> Self {
        Self {
            rng,
            max_output: max_output.max(1),
        }
    }

    /// List the collection and draw up to `count` items.
    ///
    /// `Ok(None)` means the collection holds no eligible items.
    pub async fn pick(&self, collection: &Collection, count: u32) -> Result<Option<Vec<MediaItem>>> {
        let items = CollectionDirectory::list_items(collection).await?;
        let picked = self.sample(&items, count);
        debug!(
            collection = %collection.name,
            listed = items.len(),
            picked = picked.as_ref().map(Vec::len).unwrap_or(0),
            "picker: sampled collection"
        );
        Ok(picked)
    }

    /// Draw `count` (clamped to `1..=max_output`) eligible items with replacement.
    pub fn sample(&self, items: &[Item], count: u32) -> Option<Vec<MediaItem>> {
        let eligible: Vec<MediaItem> = items.iter().filter_map(Item::as_media).collect();
        if eligible.is_empty() {
            return None;
        }

        let count = count.clamp(1, self.max_output);
        let picked = (0..count)
            .map(|_| eligible[self.rng.pick_index(eligible.len())].clone())
            .collect();
        Some(picked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediakey_core::{MediaKind, SequenceRandom};

    fn items(names: &[&str]) -> Vec<Item> {
        names.iter().map(|n| Item::new(format!("/c/{n}"))).collect()
    }

    #[test]
    fn test_sample_filters_ineligible() {
        let rng = SequenceRandom::new(vec![0, 1, 2]);
        let picker = MediaPicker::new(&rng, 5);
        let picked = picker
            .sample(&items(&["a.txt", "b.png", "c.doc", "d.mp4"]), 3)
            .unwrap();
        let names: Vec<String> = picked
            .iter()
            .map(|m| m.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        // Eligible set is [b.png, d.mp4]; draws 0, 1, 2 % 2 = 0
        assert_eq!(names, vec!["b.png", "d.mp4", "b.png"]);
        assert_eq!(picked[0].kind, MediaKind::Image);
        assert_eq!(picked[1].kind, MediaKind::Video);
    }

    #[test]
    fn test_sample_empty_collection() {
        let rng = SequenceRandom::default();
        let picker = MediaPicker::new(&rng, 5);
        assert!(picker.sample(&items(&[]), 3).is_none());
        assert!(picker.sample(&items(&["readme.md"]), 3).is_none());
    }

    #[test]
    fn test_sample_allows_repeats() {
        let rng = SequenceRandom::new(vec![0]);
        let picker = MediaPicker::new(&rng, 5);
        let picked = picker.sample(&items(&["a.jpg", "b.jpg"]), 4).unwrap();
        assert_eq!(picked.len(), 4);
        assert!(picked.iter().all(|m| m.path.ends_with("a.jpg")));
    }

    #[test]
    fn test_sample_count_is_bounded() {
        let rng = SequenceRandom::default();
        let picker = MediaPicker::new(&rng, 2);
        assert_eq!(picker.sample(&items(&["a.jpg"]), 9).unwrap().len(), 2);
        assert_eq!(picker.sample(&items(&["a.jpg"]), 0).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_pick_reads_collection() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("one.gif"), b"g").unwrap();
        let collection = Collection::new("cat", dir.path());

        let rng = SequenceRandom::default();
        let picker = MediaPicker::new(&rng, 5);
        let picked = picker.pick(&collection, 2).await.unwrap().unwrap();
        assert_eq!(picked.len(), 2);
        assert!(picked.iter().all(|m| m.path == dir.path().join("one.gif")));
    }

    #[tokio::test]
    async fn test_pick_missing_directory_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let collection = Collection::new("gone", dir.path().join("gone"));
        let rng = SequenceRandom::default();
        let picker = MediaPicker::new(&rng, 5);
        assert!(picker.pick(&collection, 1).await.is_err());
    }
}
