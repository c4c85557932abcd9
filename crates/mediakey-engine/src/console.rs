//! Terminal transport for the `mediakey` binary.
//!
//! Text goes to stdout, media is reported by path, and prompts read one line
//! from stdin. Tokens of a reply that name existing media files become items.

use std::path::Path;

use async_trait::async_trait;
use mediakey_core::{Error, IncomingItem, MediaItem, MediaKind, Notifier, Prompter, Reply, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;
use tracing::debug;

/// Writes engine output to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn send_text(&self, text: &str) -> Result<()> {
        println!("{}", text);
        Ok(())
    }

    async fn send_media(&self, item: &MediaItem) -> Result<()> {
        println!("[{}] {}", item.kind, item.path.display());
        Ok(())
    }
}

/// Asks on stdout and reads each reply as one line from `R`.
///
/// The line reader lives as long as the prompter, so input buffered past one
/// reply is still there for the next question.
pub struct LinePrompter<R> {
    lines: Mutex<Lines<R>>,
}

/// Prompter reading replies from the process's stdin.
pub type StdinPrompter = LinePrompter<BufReader<Stdin>>;

impl<R: AsyncBufRead + Unpin> LinePrompter<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: Mutex::new(reader.lines()),
        }
    }
}

impl StdinPrompter {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> Prompter for LinePrompter<R> {
    async fn ask(&self, question: &str) -> Result<Reply> {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(format!("{} ", question).as_bytes()).await?;
        stdout.flush().await?;

        let line = self.lines.lock().await.next_line().await?;
        let Some(line) = line else {
            return Err(Error::Transport("input closed".to_string()));
        };
        parse_reply(&line).await
    }
}

/// Split a reply line into item paths and plain text.
async fn parse_reply(line: &str) -> Result<Reply> {
    let mut text = Vec::new();
    let mut items = Vec::new();
    for token in line.split_whitespace() {
        let path = Path::new(token);
        if MediaKind::from_path(path).is_some() && path.is_file() {
            items.push(load_item(path).await?);
        } else {
            text.push(token);
        }
    }
    Ok(Reply {
        text: text.join(" "),
        items,
    })
}

/// Read a local media file into an [`IncomingItem`].
///
/// The kind and content type follow the file extension; files outside the
/// allow-lists are rejected.
pub async fn load_item(path: &Path) -> Result<IncomingItem> {
    let kind = MediaKind::from_path(path).ok_or_else(|| {
        Error::InvalidInput(format!("{} is not an image or video", path.display()))
    })?;
    let data = tokio::fs::read(path).await?;
    debug!(path = %path.display(), size = data.len(), %kind, "console: loaded item");

    let item = IncomingItem::new(kind, data);
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    Ok(match content_type_for(&ext) {
        Some(content_type) => item.with_content_type(content_type),
        None => item,
    })
}

fn content_type_for(ext: &str) -> Option<&'static str> {
    match ext {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        "mp4" => Some("video/mp4"),
        "mov" => Some("video/quicktime"),
        "avi" => Some("video/x-msvideo"),
        _ => None,
    }
}
