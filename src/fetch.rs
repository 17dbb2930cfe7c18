//! File retrieval from the Bot API.
//!
//! One capability, two implementations: [`DiskFetcher`] stages the file in
//! a scratch directory (polling deployment), [`MemoryFetcher`] keeps the
//! bytes in memory (webhook deployment). The handlers are written once
//! against the trait and never know which one they got.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use teloxide::net::Download;
use teloxide::prelude::*;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::event::FileRef;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("getFile request failed: {0}")]
    GetFile(#[from] teloxide::RequestError),
    #[error("file content download failed: {0}")]
    Download(#[from] teloxide::DownloadError),
    #[error("scratch file error: {0}")]
    Io(#[from] std::io::Error),
}

enum Content {
    Disk(PathBuf),
    Memory(Vec<u8>),
}

/// A fetched file: resolved name plus wherever the bytes ended up.
pub struct FetchedFile {
    pub name: String,
    content: Content,
}

impl FetchedFile {
    /// The attachment bytes, read from disk when staged there.
    pub async fn bytes(&self) -> std::io::Result<Vec<u8>> {
        match &self.content {
            Content::Disk(path) => tokio::fs::read(path).await,
            Content::Memory(bytes) => Ok(bytes.clone()),
        }
    }

    /// Local scratch path, when there is one.
    pub fn path(&self) -> Option<&Path> {
        match &self.content {
            Content::Disk(path) => Some(path),
            Content::Memory(_) => None,
        }
    }

    /// Best-effort removal of the scratch file. Runs after every transfer,
    /// successful or not; an already-missing file is not an error.
    pub async fn cleanup(&self) {
        if let Content::Disk(path) = &self.content {
            if let Err(e) = tokio::fs::remove_file(path).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = %path.display(), error = %e, "failed to remove scratch file");
                }
            }
        }
    }
}

#[async_trait]
pub trait FileFetcher: Send + Sync {
    /// Obtain the file's bytes, however this deployment stores them.
    async fn fetch(&self, file: &FileRef) -> Result<FetchedFile, FetchError>;
}

/// Stages downloads in a local scratch directory.
pub struct DiskFetcher {
    bot: Bot,
    scratch_dir: PathBuf,
}

impl DiskFetcher {
    pub fn new(bot: Bot, scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            bot,
            scratch_dir: scratch_dir.into(),
        }
    }
}

#[async_trait]
impl FileFetcher for DiskFetcher {
    async fn fetch(&self, file: &FileRef) -> Result<FetchedFile, FetchError> {
        tokio::fs::create_dir_all(&self.scratch_dir).await?;

        // Only the final component of the sender-supplied name is used, so
        // a name with separators cannot escape the scratch directory.
        // Concurrent transfers sharing a filename can still collide here;
        // accepted limitation, see DESIGN.md.
        let safe_name = Path::new(&file.name)
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("file"));
        let target = self.scratch_dir.join(safe_name);

        let remote = self.bot.get_file(file.file.id.clone()).await?;
        let mut out = tokio::fs::File::create(&target).await?;
        self.bot.download_file(&remote.path, &mut out).await?;
        out.flush().await?;

        debug!(path = %target.display(), "file staged in scratch directory");
        Ok(FetchedFile {
            name: file.name.clone(),
            content: Content::Disk(target),
        })
    }
}

/// Downloads straight into memory; nothing touches disk.
pub struct MemoryFetcher {
    bot: Bot,
}

impl MemoryFetcher {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl FileFetcher for MemoryFetcher {
    async fn fetch(&self, file: &FileRef) -> Result<FetchedFile, FetchError> {
        let remote = self.bot.get_file(file.file.id.clone()).await?;

        let mut buf = Vec::new();
        self.bot.download_file(&remote.path, &mut buf).await?;

        debug!(remote_path = %remote.path, size = buf.len(), "file fetched into memory");
        Ok(FetchedFile {
            name: file.name.clone(),
            content: Content::Memory(buf),
        })
    }
}
