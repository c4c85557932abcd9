//! Centralized default constants for mediakey.
//!
//! **This module is the single source of truth** for shared default values.
//! Crates reference these constants instead of defining their own magic numbers.

// =============================================================================
// COLLECTIONS
// =============================================================================

/// Separator between the primary name and the aliases in a collection
/// directory name (`cat-mt-kitty`).
pub const ALIAS_DELIMITER: char = '-';

/// Image file extensions eligible for retrieval (lowercase, no dot).
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "bmp"];

/// Video file extensions eligible for retrieval (lowercase, no dot).
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "webm", "mkv"];

// =============================================================================
// RETRIEVAL
// =============================================================================

/// Upper bound on items returned for one request.
pub const MAX_OUTPUT: u32 = 5;

// =============================================================================
// UPLOAD
// =============================================================================

/// Bytes per configured megabyte of quota.
pub const BYTES_PER_MB: u64 = 1_048_576;

/// Seconds to wait for a reply when a save request is missing items or a keyword.
pub const PROMPT_TIMEOUT_SECS: u64 = 60;

/// Default file naming template.
pub const NAMING_TEMPLATE: &str = "{userId}_{timestamp}_{index}{ext}";

/// Reserved quota rule id that applies when no specific row matches.
pub const DEFAULT_RULE_ID: &str = "default";

/// Default collection store directory.
pub const COLLECTION_ROOT: &str = "data/collections";

/// Default holding directory for saves whose keyword matched nothing.
pub const HOLDING_ROOT: &str = "data/holding";

// =============================================================================
// FILE NAMES
// =============================================================================

/// Maximum rendered file name length in bytes.
pub const MAX_FILENAME_LEN: usize = 255;

/// Name used when sanitizing leaves nothing usable.
pub const UNNAMED_FILE: &str = "unnamed_file";

/// Extension used for images whose declared type is unknown.
pub const FALLBACK_IMAGE_EXT: &str = ".jpg";

/// Extension used for videos whose declared type is unknown.
pub const FALLBACK_VIDEO_EXT: &str = ".mp4";
