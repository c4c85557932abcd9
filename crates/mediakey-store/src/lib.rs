//! # mediakey-store
//!
//! Directory-backed collection store for mediakey.
//!
//! The directory tree is the only index. Each request lists the collection
//! root, builds an [`AliasIndex`], resolves the input with a
//! [`TokenResolver`], and draws items with a [`MediaPicker`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use mediakey_core::ThreadRandom;
//! use mediakey_store::{AliasIndex, CollectionDirectory, MediaPicker, TokenResolver};
//!
//! let collections = CollectionDirectory::new("/srv/collections").list_collections().await?;
//! let index = AliasIndex::build(&collections);
//! let rng = ThreadRandom;
//! if let Some(resolution) = TokenResolver::new(&rng, 5).resolve_prefix(&index, "mt2") {
//!     let items = MediaPicker::new(&rng, 5).pick(resolution.collection, resolution.count).await?;
//! }
//! ```

pub mod alias;
pub mod directory;
pub mod picker;
pub mod resolver;
pub mod writer;

pub use alias::AliasIndex;
pub use directory::CollectionDirectory;
pub use picker::MediaPicker;
pub use resolver::{parse_count, prefix_matches, AliasMatch, Resolution, TokenResolver};
pub use writer::write_item;
