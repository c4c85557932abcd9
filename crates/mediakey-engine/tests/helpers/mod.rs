//! Test helpers for engine workflow tests.
//!
//! Provides a recording notifier, scripted prompters, and a fixture tree.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use mediakey_core::{
    EngineConfig, Error, MediaItem, Notifier, Prompter, QuotaRule, Reply, Result,
};

/// Notifier that keeps everything it was asked to send.
#[derive(Default)]
pub struct RecordingNotifier {
    texts: Mutex<Vec<String>>,
    media: Mutex<Vec<MediaItem>>,
}

impl RecordingNotifier {
    pub fn texts(&self) -> Vec<String> {
        self.texts.lock().unwrap().clone()
    }

    pub fn media(&self) -> Vec<MediaItem> {
        self.media.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_text(&self, text: &str) -> Result<()> {
        self.texts.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn send_media(&self, item: &MediaItem) -> Result<()> {
        self.media.lock().unwrap().push(item.clone());
        Ok(())
    }
}

/// Notifier whose first `failures` text sends fail; later sends are recorded.
pub struct FlakyNotifier {
    failures: Mutex<usize>,
    pub inner: RecordingNotifier,
}

impl FlakyNotifier {
    pub fn failing(failures: usize) -> Self {
        Self {
            failures: Mutex::new(failures),
            inner: RecordingNotifier::default(),
        }
    }
}

#[async_trait]
impl Notifier for FlakyNotifier {
    async fn send_text(&self, text: &str) -> Result<()> {
        {
            let mut failures = self.failures.lock().unwrap();
            if *failures > 0 {
                *failures -= 1;
                return Err(Error::Transport("connection reset".to_string()));
            }
        }
        self.inner.send_text(text).await
    }

    async fn send_media(&self, item: &MediaItem) -> Result<()> {
        self.inner.send_media(item).await
    }
}

/// Prompter that answers from a fixed script and records the questions.
#[derive(Default)]
pub struct ScriptedPrompter {
    replies: Mutex<VecDeque<Reply>>,
    questions: Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            questions: Mutex::new(Vec::new()),
        }
    }

    pub fn questions(&self) -> Vec<String> {
        self.questions.lock().unwrap().clone()
    }
}

#[async_trait]
impl Prompter for ScriptedPrompter {
    async fn ask(&self, question: &str) -> Result<Reply> {
        self.questions.lock().unwrap().push(question.to_string());
        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(reply) => Ok(reply),
            // Out of script: behave like a requester who never answers
            None => std::future::pending().await,
        }
    }
}

/// Temporary collection and holding roots.
pub struct Fixture {
    _dir: tempfile::TempDir,
    pub config: EngineConfig,
}

impl Fixture {
    /// Empty roots, unlimited-enough default user quota of 1 MB.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut config =
            EngineConfig::with_roots(dir.path().join("collections"), dir.path().join("holding"));
        config.quota.users.push(QuotaRule::new("default", 1.0));
        std::fs::create_dir_all(&config.collection_root).unwrap();
        Self { _dir: dir, config }
    }

    /// Create a collection directory holding the named files.
    pub fn collection(&self, name: &str, files: &[&str]) -> PathBuf {
        let path = self.config.collection_root.join(name);
        std::fs::create_dir_all(&path).unwrap();
        for file in files {
            std::fs::write(path.join(file), b"media").unwrap();
        }
        path
    }

    pub fn holding(&self) -> &Path {
        &self.config.holding_root
    }
}

/// File names directly inside `dir`, sorted; empty when `dir` is missing.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect(),
        Err(_) => Vec::new(),
    };
    names.sort();
    names
}
