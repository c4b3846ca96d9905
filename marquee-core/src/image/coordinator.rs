use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::{DecodedImage, ImageFetcher};
use crate::error::{MediaError, Result};
use crate::infra::cache::{ImageCache, image_cache_key_for};

/// Cache-first image loading with a cancellable network fallback.
///
/// Each call owns its own fetch; concurrent calls for the same path are not
/// merged.
#[derive(Debug, Clone)]
pub struct ImageCoordinator {
    cache: Arc<dyn ImageCache>,
    fetcher: Arc<dyn ImageFetcher>,
}

impl ImageCoordinator {
    pub fn new(
        cache: Arc<dyn ImageCache>,
        fetcher: Arc<dyn ImageFetcher>,
    ) -> Self {
        Self { cache, fetcher }
    }

    pub fn cache(&self) -> &Arc<dyn ImageCache> {
        &self.cache
    }

    /// Resolve `path` from the cache, fetching and writing through on a miss.
    ///
    /// Once `cancel` fires the caller only ever sees
    /// [`MediaError::Cancelled`]. An in-flight request is dropped; a cache
    /// write that already started runs to completion regardless.
    pub async fn load(
        &self,
        path: &str,
        cancel: &CancellationToken,
    ) -> Result<DecodedImage> {
        let key = image_cache_key_for(path)?;

        if let Some(image) = self.cache.retrieve_image(&key).await {
            if cancel.is_cancelled() {
                return Err(cancelled(path));
            }
            return Ok(image);
        }

        let image = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(path, "image fetch cancelled");
                return Err(cancelled(path));
            }
            fetched = self.fetcher.fetch(path) => fetched?,
        };

        let cache = Arc::clone(&self.cache);
        let stored = image.clone();
        let write = tokio::spawn(async move {
            cache.store_image(&key, &stored).await;
        });
        if let Err(err) = write.await {
            warn!(path, "image cache write-through task failed: {err}");
        }

        if cancel.is_cancelled() {
            debug!(path, "image cached but caller cancelled");
            return Err(cancelled(path));
        }
        Ok(image)
    }

    pub fn on_low_memory(&self) {
        self.cache.on_low_memory();
    }
}

fn cancelled(path: &str) -> MediaError {
    MediaError::Cancelled(format!("image load for {path}"))
}
