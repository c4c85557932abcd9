//! Data models shared across mediakey crates.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::defaults::{ALIAS_DELIMITER, IMAGE_EXTENSIONS, VIDEO_EXTENSIONS};

// =============================================================================
// MEDIA KIND
// =============================================================================

/// Media classification, decided once when an item enters the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Classify a bare extension (no leading dot, any case) against the allow-lists.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_ascii_lowercase();
        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Some(Self::Image)
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Some(Self::Video)
        } else {
            None
        }
    }

    /// Classify a file by its extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image => write!(f, "image"),
            Self::Video => write!(f, "video"),
        }
    }
}

// =============================================================================
// COLLECTIONS AND ITEMS
// =============================================================================

/// A directory-backed group of media items.
///
/// The directory name encodes a primary name followed by aliases, joined by
/// [`ALIAS_DELIMITER`]: `cat-mt-kitty` has primary `cat` and aliases `mt`, `kitty`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    /// Full directory name.
    pub name: String,
    /// Absolute or root-relative directory path.
    pub path: PathBuf,
}

impl Collection {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    /// First delimiter-separated segment; used as the display name.
    pub fn primary(&self) -> &str {
        self.name.split(ALIAS_DELIMITER).next().unwrap_or(&self.name)
    }

    /// Segments after the primary name, in directory-name order.
    pub fn aliases(&self) -> Vec<&str> {
        self.name
            .split(ALIAS_DELIMITER)
            .skip(1)
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Every non-empty lookup token (primary first), without repeats.
    pub fn lookup_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for segment in self.name.split(ALIAS_DELIMITER) {
            if !segment.is_empty() && !names.contains(&segment) {
                names.push(segment);
            }
        }
        names
    }
}

/// A single file inside a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub path: PathBuf,
    /// `None` when the extension is not on the allow-list.
    pub kind: Option<MediaKind>,
}

impl Item {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let kind = MediaKind::from_path(&path);
        Self { path, kind }
    }

    /// Narrow to an eligible media item.
    pub fn as_media(&self) -> Option<MediaItem> {
        self.kind.map(|kind| MediaItem {
            path: self.path.clone(),
            kind,
        })
    }
}

/// An item that passed the extension allow-list, ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    pub path: PathBuf,
    pub kind: MediaKind,
}

// =============================================================================
// IDENTITY AND INBOUND MEDIA
// =============================================================================

/// Who sent an inbound message, as supplied by the chat-session layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl Identity {
    pub fn user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Self::default()
        }
    }

    pub fn in_group(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }

    pub fn in_channel(mut self, channel_id: impl Into<String>) -> Self {
        self.channel_id = Some(channel_id.into());
        self
    }

    pub fn named(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }
}

/// One media element attached to a save request, after the external transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingItem {
    /// Kind the source element declared itself to be.
    pub kind: MediaKind,
    /// Declared MIME type, if the transport reported one.
    pub content_type: Option<String>,
    /// Transferred bytes; `None` when the element carried no source to fetch.
    pub data: Option<Vec<u8>>,
}

impl IncomingItem {
    pub fn new(kind: MediaKind, data: Vec<u8>) -> Self {
        Self {
            kind,
            content_type: None,
            data: Some(data),
        }
    }

    pub fn without_source(kind: MediaKind) -> Self {
        Self {
            kind,
            content_type: None,
            data: None,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// An inbound request to add media to a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    pub identity: Identity,
    /// Target keyword; prompted for when absent or blank.
    pub keyword: Option<String>,
    /// Attached media; prompted for when empty.
    pub items: Vec<IncomingItem>,
}

impl SaveRequest {
    pub fn new(identity: Identity) -> Self {
        Self {
            identity,
            keyword: None,
            items: Vec::new(),
        }
    }

    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    pub fn with_item(mut self, item: IncomingItem) -> Self {
        self.items.push(item);
        self
    }
}

// =============================================================================
// READ PATH OUTCOMES
// =============================================================================

/// Result of resolving an inbound message to media.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// No alias prefixed the input; the caller takes no action.
    NoMatch,
    /// The collection resolved but holds no eligible items.
    Empty { collection: String },
    /// Items selected for delivery.
    Found(Delivery),
}

/// Media chosen for one retrieval request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Directory name of the serving collection.
    pub collection: String,
    /// Alias that matched the input.
    pub alias: String,
    /// Requested count after clamping.
    pub count: u32,
    /// Whether several collections shared the winning alias.
    pub collided: bool,
    pub items: Vec<MediaItem>,
}

/// Summary row for the keyword listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordSummary {
    pub name: String,
    pub aliases: Vec<String>,
    pub item_count: usize,
}

// =============================================================================
// WRITE PATH OUTCOMES
// =============================================================================

/// Where a save batch was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveTarget {
    /// A collection resolved from the keyword (directory name).
    Collection(String),
    /// The holding area, because the keyword matched nothing.
    Holding,
}

/// Independent outcome of one item in a save batch. Indices are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Saved { index: usize, path: PathBuf },
    SkippedOversize { index: usize, size: u64, limit: u64 },
    SkippedNoSource { index: usize },
    Failed { index: usize, error: String },
}

impl ItemOutcome {
    pub fn index(&self) -> usize {
        match self {
            Self::Saved { index, .. }
            | Self::SkippedOversize { index, .. }
            | Self::SkippedNoSource { index }
            | Self::Failed { index, .. } => *index,
        }
    }

    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved { .. })
    }
}

/// Result descriptor for a completed save batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReport {
    pub target: SaveTarget,
    pub outcomes: Vec<ItemOutcome>,
}

impl SaveReport {
    pub fn saved_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_saved()).count()
    }

    pub fn fallback_used(&self) -> bool {
        self.target == SaveTarget::Holding
    }

    pub fn target_collection(&self) -> Option<&str> {
        match &self.target {
            SaveTarget::Collection(name) => Some(name),
            SaveTarget::Holding => None,
        }
    }
}

/// Result of a save request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Completed(SaveReport),
    /// The identity's resolved limit is zero; nothing was written.
    QuotaDenied,
    /// The interactive wait for items or a keyword expired.
    TimedOut,
    /// The keyword matched no collection and the cancel policy is active.
    Cancelled { keyword: String },
    /// The request carried no items, even after prompting.
    NoItems,
    /// The prompted keyword reply was blank.
    NoKeyword,
}

impl SaveOutcome {
    pub fn saved_count(&self) -> usize {
        match self {
            Self::Completed(report) => report.saved_count(),
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_kind_from_extension_case_insensitive() {
        assert_eq!(MediaKind::from_extension("PNG"), Some(MediaKind::Image));
        assert_eq!(MediaKind::from_extension("jpeg"), Some(MediaKind::Image));
        assert_eq!(MediaKind::from_extension("Mp4"), Some(MediaKind::Video));
        assert_eq!(MediaKind::from_extension("txt"), None);
    }

    #[test]
    fn test_media_kind_from_path_without_extension() {
        assert_eq!(MediaKind::from_path(Path::new("/a/README")), None);
        assert_eq!(
            MediaKind::from_path(Path::new("/a/clip.mov")),
            Some(MediaKind::Video)
        );
    }

    #[test]
    fn test_collection_primary_and_aliases() {
        let c = Collection::new("cat-mt-kitty", "/root/cat-mt-kitty");
        assert_eq!(c.primary(), "cat");
        assert_eq!(c.aliases(), vec!["mt", "kitty"]);
        assert_eq!(c.lookup_names(), vec!["cat", "mt", "kitty"]);
    }

    #[test]
    fn test_collection_without_delimiter_is_its_own_name() {
        let c = Collection::new("dog", "/root/dog");
        assert_eq!(c.primary(), "dog");
        assert!(c.aliases().is_empty());
        assert_eq!(c.lookup_names(), vec!["dog"]);
    }

    #[test]
    fn test_collection_lookup_names_skip_empty_and_repeats() {
        let c = Collection::new("cat--mt-mt", "/root/x");
        assert_eq!(c.lookup_names(), vec!["cat", "mt"]);
    }

    #[test]
    fn test_item_classification() {
        let item = Item::new("/root/cat/a.GIF");
        assert_eq!(item.kind, Some(MediaKind::Image));
        assert!(item.as_media().is_some());

        let item = Item::new("/root/cat/notes.txt");
        assert_eq!(item.kind, None);
        assert!(item.as_media().is_none());
    }

    #[test]
    fn test_save_report_counts() {
        let report = SaveReport {
            target: SaveTarget::Holding,
            outcomes: vec![
                ItemOutcome::Saved {
                    index: 1,
                    path: PathBuf::from("/h/a.jpg"),
                },
                ItemOutcome::SkippedNoSource { index: 2 },
            ],
        };
        assert_eq!(report.saved_count(), 1);
        assert!(report.fallback_used());
        assert_eq!(report.target_collection(), None);
        assert_eq!(SaveOutcome::Completed(report).saved_count(), 1);
        assert_eq!(SaveOutcome::QuotaDenied.saved_count(), 0);
    }

    #[test]
    fn test_identity_builder() {
        let id = Identity::user("u1").in_group("g1").named("Alice");
        assert_eq!(id.user_id, "u1");
        assert_eq!(id.group_id.as_deref(), Some("g1"));
        assert_eq!(id.display_name.as_deref(), Some("Alice"));
        assert_eq!(id.channel_id, None);
    }
}
