pub mod disk_store;
pub mod key;
pub mod memory_store;
pub mod stats;
pub mod tiered;

pub use disk_store::ImageDiskStore;
pub use key::{ImageCacheKey, ImageCacheRoot, image_cache_key_for};
pub use memory_store::MemoryStore;
pub use stats::{
    DiskStoreStats, DiskStoreStatsSnapshot, DiskUsage, MemoryStoreStats,
};
pub use tiered::{ImageCache, TieredImageCache};
