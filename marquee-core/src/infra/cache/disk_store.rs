use std::{io::ErrorKind, path::PathBuf};

use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

use super::key::{ImageCacheKey, ImageCacheRoot};
use super::stats::{DiskStoreStats, DiskStoreStatsSnapshot, DiskUsage};
use crate::error::{MediaError, Result};
use crate::image::DecodedImage;
use crate::units::ByteSize;

/// Prefix of in-flight temp files. `#` never appears in a URI path, so no key
/// can start with it.
const TMP_PREFIX: &str = ".#tmp-";

/// Flat directory of PNG-encoded images, one file per cache key.
///
/// There is no index: a file at `<root>/<key>` is the only metadata. Writes go
/// through a temp file and a rename so a reader never observes a half-written
/// entry; anything unreadable is reported as a miss.
#[derive(Debug)]
pub struct ImageDiskStore {
    root: ImageCacheRoot,
    stats: DiskStoreStats,
}

impl ImageDiskStore {
    pub fn new(root: ImageCacheRoot) -> Self {
        Self {
            root,
            stats: DiskStoreStats::default(),
        }
    }

    pub fn root(&self) -> &ImageCacheRoot {
        &self.root
    }

    pub fn path_for(&self, key: &ImageCacheKey) -> PathBuf {
        self.root.as_path().join(key.as_str())
    }

    pub fn stats(&self) -> DiskStoreStatsSnapshot {
        self.stats.snapshot()
    }

    pub async fn ensure_root(&self) -> Result<()> {
        tokio::fs::create_dir_all(self.root.as_path())
            .await
            .map_err(|err| {
                MediaError::io(
                    format!(
                        "failed to create image cache dir {}",
                        self.root.as_path().display()
                    ),
                    err,
                )
            })
    }

    /// Encode `image` as PNG and write it under `key`, replacing any previous
    /// entry.
    pub async fn put(
        &self,
        key: &ImageCacheKey,
        image: &DecodedImage,
    ) -> Result<()> {
        let result = self.write_png(key, image).await;
        match &result {
            Ok(()) => self.stats.on_write_ok(),
            Err(_) => self.stats.on_write_err(),
        }
        result
    }

    async fn write_png(
        &self,
        key: &ImageCacheKey,
        image: &DecodedImage,
    ) -> Result<()> {
        let encode_input = image.clone();
        let png = tokio::task::spawn_blocking(move || encode_input.encode_png())
            .await
            .map_err(|err| {
                MediaError::Internal(format!("png encode task failed: {err}"))
            })?
            .map_err(|err| {
                MediaError::Internal(format!("png encode failed for {key}: {err}"))
            })?;

        self.ensure_root().await?;
        let path = self.path_for(key);
        // Fixed length, so any key that fits as a file name can be written.
        let tmp = self
            .root
            .as_path()
            .join(format!("{TMP_PREFIX}{}", Uuid::new_v4().simple()));

        let mut file = tokio::fs::File::create(&tmp).await.map_err(|err| {
            MediaError::io(
                format!("failed to create temp image file {}", tmp.display()),
                err,
            )
        })?;
        let written = async {
            file.write_all(&png).await?;
            file.flush().await
        }
        .await;
        drop(file);

        if let Err(err) = written {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(MediaError::io(
                format!("failed to write temp image file {}", tmp.display()),
                err,
            ));
        }

        if let Err(err) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(MediaError::io(
                format!(
                    "failed to move image file {} -> {}",
                    tmp.display(),
                    path.display()
                ),
                err,
            ));
        }

        debug!(key = %key, bytes = png.len(), "disk image cache write");
        Ok(())
    }

    /// Read and decode the entry for `key`.
    ///
    /// Missing, unreadable and corrupt entries all come back as `None`.
    pub async fn get(&self, key: &ImageCacheKey) -> Option<DecodedImage> {
        let path = self.path_for(key);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(key = %key, "disk image cache miss");
                self.stats.on_miss();
                return None;
            }
            Err(err) => {
                warn!(
                    key = %key,
                    path = %path.display(),
                    "disk image cache read failed: {err}"
                );
                self.stats.on_read_error();
                return None;
            }
        };

        let decoded =
            tokio::task::spawn_blocking(move || DecodedImage::decode(&bytes))
                .await;
        match decoded {
            Ok(Ok(image)) => {
                self.stats.on_hit();
                Some(image)
            }
            Ok(Err(err)) => {
                warn!(
                    key = %key,
                    path = %path.display(),
                    "disk image cache entry is corrupt: {err}"
                );
                self.stats.on_read_error();
                None
            }
            Err(err) => {
                warn!(key = %key, "disk image cache decode task failed: {err}");
                self.stats.on_read_error();
                None
            }
        }
    }

    pub async fn contains(&self, key: &ImageCacheKey) -> bool {
        tokio::fs::try_exists(self.path_for(key))
            .await
            .unwrap_or(false)
    }

    /// Count committed entries under the root. A missing root is empty.
    pub async fn usage(&self) -> DiskUsage {
        let mut usage = DiskUsage::default();
        let mut dir = match tokio::fs::read_dir(self.root.as_path()).await {
            Ok(dir) => dir,
            Err(err) => {
                if err.kind() != ErrorKind::NotFound {
                    warn!(
                        root = %self.root.as_path().display(),
                        "disk image cache usage probe failed: {err}"
                    );
                }
                return usage;
            }
        };

        let mut total: u64 = 0;
        loop {
            let entry = match dir.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(err) => {
                    warn!("disk image cache usage entry error: {err}");
                    break;
                }
            };
            if entry.file_name().to_string_lossy().starts_with(TMP_PREFIX) {
                continue;
            }
            match entry.metadata().await {
                Ok(meta) if meta.is_file() => {
                    usage.entries += 1;
                    total = total.saturating_add(meta.len());
                }
                Ok(_) => {}
                Err(err) => warn!("disk image cache usage metadata error: {err}"),
            }
        }
        usage.total = ByteSize::from_bytes(total);
        usage
    }
}
