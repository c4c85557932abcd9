//! User-visible text for engine outcomes.

use mediakey_core::{defaults::BYTES_PER_MB, Error, ItemOutcome, MissingTargetPolicy, SaveReport, SaveTarget};

pub const ASK_ITEMS: &str = "Send the images or videos to save.";
pub const ASK_KEYWORD: &str = "Which keyword should these be saved under?";
pub const QUOTA_DENIED: &str = "You do not have permission to upload media.";
pub const TIMED_OUT: &str = "No reply received in time, save cancelled.";
pub const NO_ITEMS: &str = "No images or videos received, nothing saved.";
pub const NO_KEYWORD: &str = "No keyword given, nothing saved.";

pub fn empty_collection(name: &str) -> String {
    format!("\"{}\" has no images or videos yet.", name)
}

pub fn cancelled(keyword: &str) -> String {
    format!(
        "No collection matches \"{}\"; save cancelled ({} policy).",
        keyword,
        MissingTargetPolicy::Cancel
    )
}

pub fn save_failed(error: &Error) -> String {
    format!("Save failed: {}", error)
}

fn megabytes(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / BYTES_PER_MB as f64)
}

/// Notice for one item that was not saved; `None` for saved items.
pub fn item_notice(outcome: &ItemOutcome) -> Option<String> {
    match outcome {
        ItemOutcome::Saved { .. } => None,
        ItemOutcome::SkippedOversize { index, size, limit } => Some(format!(
            "Item {} skipped: {} exceeds the {} limit by {} bytes.",
            index,
            megabytes(*size),
            megabytes(*limit),
            size.saturating_sub(*limit)
        )),
        ItemOutcome::SkippedNoSource { index } => {
            Some(format!("Item {} skipped: no downloadable source.", index))
        }
        ItemOutcome::Failed { index, error } => {
            Some(format!("Item {} failed to save: {}", index, error))
        }
    }
}

pub fn save_summary(report: &SaveReport, keyword: &str) -> String {
    let total = report.outcomes.len();
    let saved = report.saved_count();
    match &report.target {
        SaveTarget::Collection(name) => {
            format!("Saved {} of {} item(s) to \"{}\".", saved, total, name)
        }
        SaveTarget::Holding => format!(
            "No collection matches \"{}\"; saved {} of {} item(s) to the holding area ({} policy).",
            keyword,
            saved,
            total,
            MissingTargetPolicy::Fallback
        ),
    }
}
