//! File naming for saved items.
//!
//! A template such as `{userId}_{timestamp}_{index}{ext}` is filled from a
//! [`NamingContext`], then passed through [`sanitize_filename`] so the result
//! is safe as a single path component on every common filesystem.
//!
//! Unknown placeholders are left in place.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::defaults::{
    FALLBACK_IMAGE_EXT, FALLBACK_VIDEO_EXT, MAX_FILENAME_LEN, UNNAMED_FILE,
};
use crate::models::{Identity, MediaKind};

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([A-Za-z]+)\}").expect("valid placeholder pattern"));

/// Declared content types with a known extension.
const CONTENT_TYPE_EXTENSIONS: &[(&str, &str)] = &[
    ("image/jpeg", ".jpg"),
    ("image/jpg", ".jpg"),
    ("image/png", ".png"),
    ("image/gif", ".gif"),
    ("image/webp", ".webp"),
    ("image/bmp", ".bmp"),
    ("video/mp4", ".mp4"),
    ("video/quicktime", ".mov"),
    ("video/x-msvideo", ".avi"),
];

/// Values available to a naming template for one saved item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingContext {
    pub user_id: String,
    pub username: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: String,
    /// `YYYY-MM-DD` (UTC).
    pub date: String,
    /// `HH:MM:SS` (UTC).
    pub time: String,
    /// 1-based position within the batch.
    pub index: String,
    /// Extension with its leading dot.
    pub ext: String,
    pub guild_id: String,
    pub channel_id: String,
}

impl NamingContext {
    pub fn new(identity: &Identity, at: DateTime<Utc>, index: usize, ext: &str) -> Self {
        Self {
            user_id: identity.user_id.clone(),
            username: identity.display_name.clone().unwrap_or_default(),
            timestamp: at.timestamp_millis().to_string(),
            date: at.format("%Y-%m-%d").to_string(),
            time: at.format("%H:%M:%S").to_string(),
            index: index.to_string(),
            ext: ext.to_string(),
            guild_id: identity.group_id.clone().unwrap_or_default(),
            channel_id: identity.channel_id.clone().unwrap_or_default(),
        }
    }

    /// Look up a placeholder key.
    pub fn value(&self, key: &str) -> Option<&str> {
        let value = match key {
            "userId" => &self.user_id,
            "username" => &self.username,
            "timestamp" => &self.timestamp,
            "date" => &self.date,
            "time" => &self.time,
            "index" => &self.index,
            "ext" => &self.ext,
            "guildId" => &self.guild_id,
            "channelId" => &self.channel_id,
            _ => return None,
        };
        Some(value)
    }
}

/// Fill a template and sanitize the result into a file name.
pub fn render_filename(template: &str, context: &NamingContext) -> String {
    let rendered = PLACEHOLDER.replace_all(template, |caps: &regex::Captures| {
        match context.value(&caps[1]) {
            Some(value) => value.to_string(),
            None => caps[0].to_string(),
        }
    });
    sanitize_filename(&rendered)
}

fn is_reserved(c: char) -> bool {
    matches!(c, '\u{0}'..='\u{1f}' | '\u{7f}'..='\u{9f}')
        || matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|')
}

/// Replace reserved characters with `_` and bound the length.
///
/// Applying this twice yields the same string as applying it once.
pub fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| if is_reserved(c) { '_' } else { c })
        .collect();

    if sanitized.is_empty() || sanitized == "." || sanitized == ".." {
        return UNNAMED_FILE.to_string();
    }

    if sanitized.len() <= MAX_FILENAME_LEN {
        return sanitized;
    }

    // Keep a short extension intact when truncating
    match sanitized.rfind('.') {
        Some(dot) if sanitized.len() - dot <= 16 => {
            let ext = &sanitized[dot..];
            let stem = truncate_to_boundary(&sanitized[..dot], MAX_FILENAME_LEN - ext.len());
            format!("{}{}", stem, ext)
        }
        _ => truncate_to_boundary(&sanitized, MAX_FILENAME_LEN).to_string(),
    }
}

fn truncate_to_boundary(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }
    let mut end = max_len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Pick an extension (with leading dot) for an incoming item.
///
/// The declared content type is consulted first; unknown or absent types
/// fall back by the kind the element declared.
pub fn extension_for(kind: MediaKind, content_type: Option<&str>) -> &'static str {
    let declared = content_type
        .map(|ct| ct.split(';').next().unwrap_or(ct).trim().to_ascii_lowercase());

    if let Some(declared) = declared {
        if let Some((_, ext)) = CONTENT_TYPE_EXTENSIONS
            .iter()
            .find(|(mime, _)| *mime == declared)
        {
            return *ext;
        }
    }

    match kind {
        MediaKind::Image => FALLBACK_IMAGE_EXT,
        MediaKind::Video => FALLBACK_VIDEO_EXT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn context() -> NamingContext {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 2).unwrap();
        let identity = Identity::user("10001")
            .in_group("g7")
            .in_channel("c3")
            .named("Alice");
        NamingContext::new(&identity, at, 2, ".png")
    }

    #[test]
    fn test_context_values() {
        let ctx = context();
        assert_eq!(ctx.timestamp, "1709967902000");
        assert_eq!(ctx.date, "2024-03-09");
        assert_eq!(ctx.time, "07:05:02");
        assert_eq!(ctx.value("guildId"), Some("g7"));
        assert_eq!(ctx.value("channelId"), Some("c3"));
        assert_eq!(ctx.value("nope"), None);
    }

    #[test]
    fn test_render_default_template() {
        let name = render_filename("{userId}_{timestamp}_{index}{ext}", &context());
        assert_eq!(name, "10001_1709967902000_2.png");
    }

    #[test]
    fn test_render_replaces_every_occurrence() {
        let name = render_filename("{index}-{index}-{username}{ext}", &context());
        assert_eq!(name, "2-2-Alice.png");
    }

    #[test]
    fn test_render_leaves_unknown_placeholders() {
        let name = render_filename("{userId}_{mood}{ext}", &context());
        assert_eq!(name, "10001_{mood}.png");
    }

    #[test]
    fn test_render_sanitizes_time_colons() {
        let name = render_filename("{date} {time}{ext}", &context());
        assert_eq!(name, "2024-03-09 07_05_02.png");
    }

    #[test]
    fn test_render_does_not_expand_placeholders_inside_values() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let identity = Identity::user("u").named("{ext}");
        let ctx = NamingContext::new(&identity, at, 1, ".gif");
        assert_eq!(render_filename("{username}", &ctx), "{ext}");
    }

    #[test]
    fn test_render_absent_optional_values_are_empty() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let ctx = NamingContext::new(&Identity::user("u"), at, 1, ".jpg");
        assert_eq!(render_filename("{guildId}{userId}{ext}", &ctx), "u.jpg");
    }

    #[test]
    fn test_sanitize_reserved_characters() {
        assert_eq!(sanitize_filename("a/b\\c:d*e?f\"g<h>i|j"), "a_b_c_d_e_f_g_h_i_j");
        assert_eq!(sanitize_filename("tab\there\u{0}nul"), "tab_here_nul");
        assert_eq!(sanitize_filename("c1\u{85}\u{9f}\u{7f}"), "c1___");
        assert_eq!(sanitize_filename("ünïcödé.png"), "ünïcödé.png");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let inputs = [
            "plain.jpg",
            "../../etc/passwd",
            "a:b|c?.mp4",
            "",
            "..",
            "\u{1}\u{2}\u{3}",
        ];
        for input in inputs {
            let once = sanitize_filename(input);
            assert_eq!(sanitize_filename(&once), once, "input {input:?}");
            assert!(!once.chars().any(is_reserved));
        }
        let long = format!("{}.jpg", "é".repeat(400));
        let once = sanitize_filename(&long);
        assert_eq!(sanitize_filename(&once), once);
    }

    #[test]
    fn test_sanitize_empty_and_dot_names() {
        assert_eq!(sanitize_filename(""), UNNAMED_FILE);
        assert_eq!(sanitize_filename("."), UNNAMED_FILE);
        assert_eq!(sanitize_filename(".."), UNNAMED_FILE);
    }

    #[test]
    fn test_sanitize_truncates_long_names_keeping_extension() {
        let long_name = format!("{}.webp", "a".repeat(300));
        let sanitized = sanitize_filename(&long_name);
        assert_eq!(sanitized.len(), MAX_FILENAME_LEN);
        assert!(sanitized.ends_with(".webp"));

        let multibyte = format!("{}.jpg", "é".repeat(200));
        let sanitized = sanitize_filename(&multibyte);
        assert!(sanitized.len() <= MAX_FILENAME_LEN);
        assert!(sanitized.ends_with(".jpg"));
    }

    #[test]
    fn test_extension_from_content_type() {
        assert_eq!(extension_for(MediaKind::Image, Some("image/png")), ".png");
        assert_eq!(extension_for(MediaKind::Image, Some("image/jpeg")), ".jpg");
        assert_eq!(extension_for(MediaKind::Image, Some("IMAGE/WEBP")), ".webp");
        assert_eq!(extension_for(MediaKind::Image, Some("image/gif; q=1")), ".gif");
        assert_eq!(extension_for(MediaKind::Image, Some("image/bmp")), ".bmp");
        assert_eq!(extension_for(MediaKind::Video, Some("video/quicktime")), ".mov");
        assert_eq!(extension_for(MediaKind::Video, Some("video/x-msvideo")), ".avi");
        assert_eq!(extension_for(MediaKind::Video, Some("video/mp4")), ".mp4");
    }

    #[test]
    fn test_extension_falls_back_by_declared_kind() {
        assert_eq!(extension_for(MediaKind::Image, None), ".jpg");
        assert_eq!(extension_for(MediaKind::Video, None), ".mp4");
        assert_eq!(extension_for(MediaKind::Image, Some("image/heic")), ".jpg");
        assert_eq!(extension_for(MediaKind::Video, Some("application/octet-stream")), ".mp4");
    }
}
