use std::{fmt::Debug, sync::Arc};

use async_trait::async_trait;
use tracing::{debug, warn};

use super::disk_store::ImageDiskStore;
use super::key::ImageCacheKey;
use super::memory_store::MemoryStore;
use crate::image::DecodedImage;

/// Two-level image cache consulted before any network fetch.
#[async_trait]
pub trait ImageCache: Send + Sync + Debug {
    /// Memory first, then disk. Failures of either tier are misses.
    async fn retrieve_image(&self, key: &ImageCacheKey) -> Option<DecodedImage>;

    /// Persist `image` under `key`. Never fails from the caller's view.
    async fn store_image(&self, key: &ImageCacheKey, image: &DecodedImage);

    /// Drop the in-memory tier. Disk content is untouched.
    fn on_low_memory(&self);
}

/// Memory tier in front of the flat PNG directory.
#[derive(Debug, Clone)]
pub struct TieredImageCache {
    disk: Arc<ImageDiskStore>,
    memory: MemoryStore,
}

impl TieredImageCache {
    pub fn new(disk: Arc<ImageDiskStore>, memory: MemoryStore) -> Self {
        Self { disk, memory }
    }

    pub fn disk(&self) -> &Arc<ImageDiskStore> {
        &self.disk
    }

    pub fn memory(&self) -> &MemoryStore {
        &self.memory
    }
}

#[async_trait]
impl ImageCache for TieredImageCache {
    async fn retrieve_image(&self, key: &ImageCacheKey) -> Option<DecodedImage> {
        if let Some(image) = self.memory.get(key).await {
            debug!(key = %key, "image cache hit (memory)");
            return Some(image);
        }

        let image = self.disk.get(key).await?;
        debug!(key = %key, "image cache hit (disk); promoting");
        self.memory.put(key.clone(), image.clone()).await;
        Some(image)
    }

    async fn store_image(&self, key: &ImageCacheKey, image: &DecodedImage) {
        // Disk first so anything resident in memory is also durable.
        if let Err(err) = self.disk.put(key, image).await {
            warn!(key = %key, "image cache disk write failed: {err}");
        }
        self.memory.put(key.clone(), image.clone()).await;
    }

    fn on_low_memory(&self) {
        self.memory.evict_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::cache::key::{ImageCacheRoot, image_cache_key_for};
    use crate::units::ByteSize;
    use tempfile::tempdir;

    fn image() -> DecodedImage {
        DecodedImage::from_rgba(2, 2, vec![42; 16]).unwrap()
    }

    fn cache_at(root: &std::path::Path, budget: ByteSize) -> TieredImageCache {
        TieredImageCache::new(
            Arc::new(ImageDiskStore::new(ImageCacheRoot::new(root))),
            MemoryStore::spawn(budget),
        )
    }

    #[tokio::test]
    async fn store_writes_both_tiers() {
        let dir = tempdir().unwrap();
        let cache = cache_at(dir.path(), ByteSize::from_kib(1));
        let key = image_cache_key_for("/w/poster.jpg").unwrap();

        cache.store_image(&key, &image()).await;

        assert_eq!(cache.memory().get(&key).await, Some(image()));
        assert_eq!(cache.disk().get(&key).await, Some(image()));
    }

    #[tokio::test]
    async fn disk_hit_is_promoted_to_memory() {
        let dir = tempdir().unwrap();
        let cache = cache_at(dir.path(), ByteSize::from_kib(1));
        let key = image_cache_key_for("/w/poster.jpg").unwrap();
        cache.disk().put(&key, &image()).await.unwrap();
        assert!(cache.memory().get(&key).await.is_none());

        assert_eq!(cache.retrieve_image(&key).await, Some(image()));
        assert!(cache.memory().get(&key).await.is_some());
    }

    #[tokio::test]
    async fn failed_disk_write_still_fills_memory() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();
        let cache = cache_at(&blocker, ByteSize::from_kib(1));
        let key = image_cache_key_for("/w/poster.jpg").unwrap();

        cache.store_image(&key, &image()).await;

        assert_eq!(cache.retrieve_image(&key).await, Some(image()));
        assert_eq!(cache.disk().stats().write_errors, 1);
    }

    #[tokio::test]
    async fn low_memory_keeps_disk() {
        let dir = tempdir().unwrap();
        let cache = cache_at(dir.path(), ByteSize::from_kib(1));
        let key = image_cache_key_for("/w/poster.jpg").unwrap();
        cache.store_image(&key, &image()).await;

        cache.on_low_memory();

        assert!(cache.memory().get(&key).await.is_none());
        assert!(cache.disk().get(&key).await.is_some());
        assert_eq!(cache.retrieve_image(&key).await, Some(image()));
    }
}
