//! Alias index over a set of collections.
//!
//! Every delimiter-separated segment of a collection name is a lookup token.
//! Several collections may carry the same token; the index keeps all of them
//! in listing order and leaves the choice to the resolver.

use std::collections::HashMap;

use mediakey_core::Collection;

/// Mapping from alias to the collections that carry it.
///
/// Built fresh for each request from a listing; borrows the listing.
#[derive(Debug)]
pub struct AliasIndex<'a> {
    collections: &'a [Collection],
    entries: Vec<(&'a str, Vec<usize>)>,
    positions: HashMap<&'a str, usize>,
}

impl<'a> AliasIndex<'a> {
    /// Build the index. Aliases appear in first-seen order.
    pub fn build(collections: &'a [Collection]) -> Self {
        let mut entries: Vec<(&'a str, Vec<usize>)> = Vec::new();
        let mut positions: HashMap<&'a str, usize> = HashMap::new();

        for (idx, collection) in collections.iter().enumerate() {
            for name in collection.lookup_names() {
                match positions.get(name) {
                    Some(&pos) => entries[pos].1.push(idx),
                    None => {
                        positions.insert(name, entries.len());
                        entries.push((name, vec![idx]));
                    }
                }
            }
        }

        Self {
            collections,
            entries,
            positions,
        }
    }

    /// Collections carrying `alias`, in listing order.
    pub fn lookup(&self, alias: &str) -> Vec<&'a Collection> {
        self.positions
            .get(alias)
            .map(|&pos| self.resolve(&self.entries[pos].1))
            .unwrap_or_default()
    }

    /// Every alias with its collections, in first-seen order.
    pub fn entries(&self) -> impl Iterator<Item = (&'a str, Vec<&'a Collection>)> + '_ {
        self.entries
            .iter()
            .map(|(alias, idxs)| (*alias, self.resolve(idxs)))
    }

    pub fn collections(&self) -> &'a [Collection] {
        self.collections
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn resolve(&self, idxs: &[usize]) -> Vec<&'a Collection> {
        idxs.iter().map(|&i| &self.collections[i]).collect()
    }
}
