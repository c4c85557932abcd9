//! Upload quota resolution.
//!
//! ## Precedence
//!
//! First match wins:
//! 1. Exact user row in the user table
//! 2. Exact group row in the group table (only when a group is present)
//! 3. `default` row in the group table (only when a group is present)
//! 4. `default` row in the user table
//! 5. Otherwise the limit is zero, which denies uploads

use std::fmt;

use crate::config::{QuotaConfig, QuotaRule};
use crate::defaults::BYTES_PER_MB;
use crate::models::Identity;

/// Which quota row produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaSource {
    User,
    Group,
    GroupDefault,
    UserDefault,
    Unconfigured,
}

impl fmt::Display for QuotaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Group => write!(f, "group"),
            Self::GroupDefault => write!(f, "group default"),
            Self::UserDefault => write!(f, "user default"),
            Self::Unconfigured => write!(f, "unconfigured"),
        }
    }
}

/// The effective size ceiling for one requester.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaDecision {
    /// Largest accepted item in bytes; zero denies uploads.
    pub limit_bytes: u64,
    pub source: QuotaSource,
}

impl QuotaDecision {
    pub fn is_denied(&self) -> bool {
        self.limit_bytes == 0
    }

    /// Bytes by which `size` exceeds the limit, if it does.
    ///
    /// An item exactly at the limit is accepted.
    pub fn excess(&self, size: u64) -> Option<u64> {
        (size > self.limit_bytes).then(|| size - self.limit_bytes)
    }
}

fn find<'a>(table: &'a [QuotaRule], id: &str) -> Option<&'a QuotaRule> {
    table.iter().find(|rule| rule.id == id)
}

fn find_default(table: &[QuotaRule]) -> Option<&QuotaRule> {
    table.iter().find(|rule| rule.is_default())
}

/// Resolve the upload limit for an identity.
pub fn resolve_quota(quota: &QuotaConfig, identity: &Identity) -> QuotaDecision {
    let group = identity.group_id.as_deref();

    let matched = find(&quota.users, &identity.user_id)
        .map(|rule| (rule, QuotaSource::User))
        .or_else(|| {
            group
                .and_then(|g| find(&quota.groups, g))
                .map(|rule| (rule, QuotaSource::Group))
        })
        .or_else(|| {
            group
                .and_then(|_| find_default(&quota.groups))
                .map(|rule| (rule, QuotaSource::GroupDefault))
        })
        .or_else(|| find_default(&quota.users).map(|rule| (rule, QuotaSource::UserDefault)));

    match matched {
        Some((rule, source)) => QuotaDecision {
            limit_bytes: megabytes_to_bytes(rule.size_limit_mb.megabytes()),
            source,
        },
        None => QuotaDecision {
            limit_bytes: 0,
            source: QuotaSource::Unconfigured,
        },
    }
}

/// Convert a coerced megabyte count into a whole byte threshold.
fn megabytes_to_bytes(megabytes: f64) -> u64 {
    // `as` saturates for out-of-range floats
    (megabytes * BYTES_PER_MB as f64).floor() as u64
}
