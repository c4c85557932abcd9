//! Collaborator traits injected into the engine.
//!
//! The chat transport is reached only through [`Notifier`] and [`Prompter`];
//! every random draw goes through [`RandomSource`] so tests can pin outcomes.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use rand::Rng;

use crate::error::Result;
use crate::models::{IncomingItem, MediaItem};

// =============================================================================
// TRANSPORT
// =============================================================================

/// Sends user-visible output back to the conversation an inbound message came from.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send one line of text.
    async fn send_text(&self, text: &str) -> Result<()>;

    /// Send one media item.
    async fn send_media(&self, item: &MediaItem) -> Result<()>;
}

/// A reply collected by a [`Prompter`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    /// Plain text of the reply, untrimmed.
    pub text: String,
    /// Media elements attached to the reply.
    pub items: Vec<IncomingItem>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            items: Vec::new(),
        }
    }

    pub fn items(items: Vec<IncomingItem>) -> Self {
        Self {
            text: String::new(),
            items,
        }
    }
}

/// Asks the requester a question and waits for their next message.
///
/// Implementations may wait indefinitely; the engine bounds the wait with
/// its own timeout.
#[async_trait]
pub trait Prompter: Send + Sync {
    async fn ask(&self, question: &str) -> Result<Reply>;
}

// =============================================================================
// RANDOMNESS
// =============================================================================

/// Source of uniform choices for tie-breaks and sampling.
pub trait RandomSource: Send + Sync {
    /// Return an index in `0..len`. Callers never pass `len == 0`.
    fn pick_index(&self, len: usize) -> usize;
}

/// Process-wide thread-local generator; no seeding or cross-run determinism.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn pick_index(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

/// Replays a fixed sequence of indices, wrapping each into range with `%`.
///
/// Intended for tests that assert exact tie-break and sampling outcomes.
/// An empty sequence always yields 0.
#[derive(Debug, Default)]
pub struct SequenceRandom {
    values: Vec<usize>,
    cursor: AtomicUsize,
}

impl SequenceRandom {
    pub fn new(values: impl Into<Vec<usize>>) -> Self {
        Self {
            values: values.into(),
            cursor: AtomicUsize::new(0),
        }
    }

    /// Number of draws taken so far.
    pub fn draws(&self) -> usize {
        self.cursor.load(Ordering::SeqCst)
    }
}

impl RandomSource for SequenceRandom {
    fn pick_index(&self, len: usize) -> usize {
        let n = self.cursor.fetch_add(1, Ordering::SeqCst);
        if self.values.is_empty() {
            return 0;
        }
        self.values[n % self.values.len()] % len
    }
}
