//! # mediakey-engine
//!
//! Keyword retrieval and upload workflows for mediakey.
//!
//! [`Engine`] wires the store crate's directory listing, alias resolution
//! and sampling to a chat transport reached through
//! [`Notifier`](mediakey_core::Notifier) and [`Prompter`](mediakey_core::Prompter).
//! The [`console`] module provides a terminal transport for the `mediakey`
//! binary.

pub mod console;
pub mod engine;
pub mod messages;

pub use console::{load_item, ConsoleNotifier, LinePrompter, StdinPrompter};
pub use engine::Engine;
