//! Writing accepted items into a collection or the holding area.
//!
//! Collections are append-only from the engine's point of view: a write
//! never replaces an existing file, even under concurrent writers.

use std::path::{Path, PathBuf};

use mediakey_core::Result;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

/// Write `data` as `dir/file_name`, creating `dir` first.
///
/// The bytes land in a uniquely named hidden sibling which is then hard-linked
/// to the final name, so readers never observe a partial item. Linking fails
/// with `AlreadyExists` when the name is taken, including when a concurrent
/// writer claimed it first.
pub async fn write_item(dir: &Path, file_name: &str, data: &[u8]) -> Result<PathBuf> {
    let full_path = dir.join(file_name);
    debug!(path = %full_path.display(), size = data.len(), "writer: write");

    fs::create_dir_all(dir).await.map_err(|e| {
        warn!(path = %dir.display(), error = %e, "writer: create_dir_all failed");
        e
    })?;

    let temp_path = dir.join(format!(".{}.{}.part", file_name, Uuid::new_v4()));
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&temp_path)
        .await
        .map_err(|e| {
            warn!(path = %temp_path.display(), error = %e, "writer: create temp failed");
            e
        })?;

    let written = write_and_sync(&mut file, data).await;
    drop(file);
    if let Err(e) = written {
        warn!(path = %temp_path.display(), error = %e, "writer: write failed");
        let _ = fs::remove_file(&temp_path).await; // Best-effort cleanup
        return Err(e.into());
    }

    let linked = fs::hard_link(&temp_path, &full_path).await;
    let _ = fs::remove_file(&temp_path).await; // Best-effort cleanup
    linked.map_err(|e| {
        if e.kind() == std::io::ErrorKind::AlreadyExists {
            warn!(path = %full_path.display(), "writer: target already exists");
        } else {
            warn!(from = %temp_path.display(), to = %full_path.display(), error = %e, "writer: link failed");
        }
        e
    })?;

    Ok(full_path)
}

async fn write_and_sync(file: &mut fs::File, data: &[u8]) -> std::io::Result<()> {
    file.write_all(data).await?;

    // Set permissions to 0644 (rw-r--r--, no execute)
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o644))
            .await?;
    }

    file.sync_all().await
}
