use std::sync::Arc;

use tracing::info;

use crate::config::ImageCacheConfig;
use crate::error::Result;
use crate::image::{
    DisabledFetcher, HttpImageFetcher, ImageCoordinator, ImageFetcher,
};
use crate::infra::cache::{
    ImageCacheRoot, ImageDiskStore, MemoryStore, TieredImageCache,
};

/// The image stack for one application instance, wired from configuration.
///
/// Created once at startup and handed to whatever needs it.
#[derive(Debug, Clone)]
pub struct ImageServices {
    cache: TieredImageCache,
    coordinator: ImageCoordinator,
}

impl ImageServices {
    /// Build the disk store, start the memory actor and pick a fetcher.
    ///
    /// Must be called within a Tokio runtime.
    pub fn start(config: &ImageCacheConfig) -> Result<Self> {
        let root = config.resolved_cache_dir()?;
        let fetcher: Arc<dyn ImageFetcher> = if config.network.enabled {
            Arc::new(HttpImageFetcher::new(&config.network)?)
        } else {
            Arc::new(DisabledFetcher)
        };
        Ok(Self::with_fetcher(config, ImageCacheRoot::new(root), fetcher))
    }

    /// Same as [`start`](Self::start) with an explicit root and fetcher.
    pub fn with_fetcher(
        config: &ImageCacheConfig,
        root: ImageCacheRoot,
        fetcher: Arc<dyn ImageFetcher>,
    ) -> Self {
        info!(
            root = %root.as_path().display(),
            budget = %config.memory_budget,
            network = config.network.enabled,
            "starting image services"
        );
        let disk = Arc::new(ImageDiskStore::new(root));
        let memory = MemoryStore::spawn(config.memory_budget);
        let cache = TieredImageCache::new(disk, memory);
        let coordinator = ImageCoordinator::new(Arc::new(cache.clone()), fetcher);
        Self { cache, coordinator }
    }

    pub fn cache(&self) -> &TieredImageCache {
        &self.cache
    }

    pub fn coordinator(&self) -> &ImageCoordinator {
        &self.coordinator
    }

    pub fn shutdown(&self) {
        info!("stopping image services");
        self.cache.memory().shutdown();
    }
}
