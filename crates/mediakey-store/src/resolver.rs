//! Token resolution: input string to collection plus repeat count.
//!
//! ## Modes
//!
//! - **Exact** (save target lookup): the trimmed input must equal an alias;
//!   the first carrying collection in listing order wins, silently.
//! - **Prefix** (retrieval): every alias the input starts with is a candidate.
//!   The longest alias length wins. If several distinct aliases share that
//!   length, one candidate is drawn at random and its alias kept. If several
//!   collections share the kept alias, one is drawn at random and a collision
//!   warning is logged.
//!
//! Whatever follows the matched alias is the suffix. An all-digit suffix is a
//! repeat count bounded by `max_output`; any other suffix counts as 1.

use mediakey_core::{Collection, RandomSource};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::alias::AliasIndex;

static COUNT_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+$").expect("valid count pattern"));

/// One `(collection, alias)` pair whose alias prefixes the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AliasMatch<'a> {
    pub collection: &'a Collection,
    pub alias: &'a str,
    /// Trimmed remainder of the input after the alias.
    pub suffix: &'a str,
}

impl AliasMatch<'_> {
    pub fn alias_len(&self) -> usize {
        self.alias.len()
    }
}

/// Outcome of a prefix-mode resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution<'a> {
    pub collection: &'a Collection,
    pub alias: &'a str,
    pub suffix: &'a str,
    /// Requested count, within `1..=max_output`.
    pub count: u32,
    /// Every collection that shared the winning alias, including the chosen one.
    pub contenders: Vec<&'a Collection>,
}

impl Resolution<'_> {
    pub fn collided(&self) -> bool {
        self.contenders.len() > 1
    }
}

/// Resolves inputs against an [`AliasIndex`].
pub struct TokenResolver<'r> {
    rng: &'r dyn RandomSource,
    max_output: u32,
    trace: bool,
}

impl<'r> TokenResolver<'r> {
    /// `max_output` below 1 behaves as 1.
    pub fn new(rng: &'r dyn RandomSource, max_output: u32) -> Self {
        Self {
            rng,
            max_output: max_output.max(1),
            trace: false,
        }
    }

    /// Emit a debug event for each resolution decision.
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    /// Exact mode: the first collection whose alias equals the trimmed input.
    pub fn resolve_exact<'a>(&self, index: &AliasIndex<'a>, input: &str) -> Option<&'a Collection> {
        let keyword = input.trim();
        let found = index.lookup(keyword).into_iter().next();
        if self.trace {
            debug!(
                keyword,
                collection = found.map(|c| c.name.as_str()),
                "resolver: exact lookup"
            );
        }
        found
    }

    /// Prefix mode. `None` means no alias prefixes the input.
    pub fn resolve_prefix<'a>(&self, index: &AliasIndex<'a>, input: &'a str) -> Option<Resolution<'a>> {
        let matches = prefix_matches(index, input);
        let max_len = matches.iter().map(AliasMatch::alias_len).max()?;

        let longest: Vec<&AliasMatch<'a>> =
            matches.iter().filter(|m| m.alias_len() == max_len).collect();

        let distinct = longest.iter().any(|m| m.alias != longest[0].alias);
        let alias = if distinct {
            longest[choose(self.rng, longest.len())].alias
        } else {
            longest[0].alias
        };

        let finalists: Vec<&AliasMatch<'a>> =
            longest.into_iter().filter(|m| m.alias == alias).collect();
        let chosen = *finalists[choose(self.rng, finalists.len())];
        let contenders: Vec<&'a Collection> = finalists.iter().map(|m| m.collection).collect();

        if contenders.len() > 1 {
            let names: Vec<&str> = contenders.iter().map(|c| c.name.as_str()).collect();
            warn!(
                alias,
                collections = ?names,
                chosen = %chosen.collection.name,
                "resolver: alias shared by several collections, picked one at random"
            );
        }

        let count = parse_count(chosen.suffix, self.max_output);

        if self.trace {
            debug!(
                input,
                candidates = matches.len(),
                alias,
                distinct_at_max = distinct,
                collection = %chosen.collection.name,
                suffix = chosen.suffix,
                count,
                "resolver: prefix resolution"
            );
        }

        Some(Resolution {
            collection: chosen.collection,
            alias: chosen.alias,
            suffix: chosen.suffix,
            count,
            contenders,
        })
    }
}

/// Every `(collection, alias)` pair whose alias prefixes the trimmed input.
pub fn prefix_matches<'a>(index: &AliasIndex<'a>, input: &'a str) -> Vec<AliasMatch<'a>> {
    let input = input.trim();
    let mut matches = Vec::new();
    for (alias, collections) in index.entries() {
        if let Some(rest) = input.strip_prefix(alias) {
            let suffix = rest.trim();
            for collection in collections {
                matches.push(AliasMatch {
                    collection,
                    alias,
                    suffix,
                });
            }
        }
    }
    matches
}

/// Interpret a suffix as a repeat count in `1..=max_output`.
///
/// Empty or non-numeric suffixes count as 1. Leading zeros are ignored and a
/// digit string too large to parse counts as `max_output`.
pub fn parse_count(suffix: &str, max_output: u32) -> u32 {
    let max_output = max_output.max(1);
    if !COUNT_SUFFIX.is_match(suffix) {
        return 1;
    }
    let requested = suffix
        .parse::<u64>()
        .map(|n| n.min(u64::from(max_output)) as u32)
        .unwrap_or(max_output);
    requested.clamp(1, max_output)
}

/// Uniform index into a non-empty slice; a single option draws nothing.
fn choose(rng: &dyn RandomSource, len: usize) -> usize {
    if len <= 1 {
        0
    } else {
        rng.pick_index(len)
    }
}
