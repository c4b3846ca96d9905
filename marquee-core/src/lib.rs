//! # Marquee Core
//!
//! Image acquisition and caching for a movie browsing client, plus the thin
//! catalog repository that sits in front of it.
//!
//! ## Overview
//!
//! - **Key derivation**: [`infra::cache::image_cache_key_for`] flattens an
//!   image URL path into a filesystem-safe key
//! - **Disk tier**: [`infra::cache::ImageDiskStore`], one PNG per key in a
//!   flat directory; every read failure is a miss
//! - **Memory tier**: [`infra::cache::MemoryStore`], a byte-budgeted LRU owned
//!   by an actor task
//! - **Fetch path**: [`image::ImageCoordinator`] checks both tiers, then
//!   fetches and writes through; each call is cancellable
//! - **View binding**: [`image::BindingSlot`] keeps at most one load alive
//!   per recycled list row
//! - **Catalog**: [`repository::MovieRepository`] and the forgiving
//!   [`repository::MovieBrowser`]
//!
//! ## Examples
//!
//! ```no_run
//! use marquee_core::{ImageCacheConfig, ImageServices};
//! use tokio_util::sync::CancellationToken;
//!
//! async fn show_poster(url: &str) -> marquee_core::Result<()> {
//!     let services = ImageServices::start(&ImageCacheConfig::load(None)?)?;
//!     let image = services
//!         .coordinator()
//!         .load(url, &CancellationToken::new())
//!         .await?;
//!     println!("{}x{}", image.width(), image.height());
//!     services.shutdown();
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]

pub mod config;
pub mod constants;
pub mod error;
pub mod image;
pub mod infra;
pub mod repository;
pub mod services;
pub mod units;

pub use config::{ImageCacheConfig, NetworkConfig};
pub use error::{CatalogError, FetchError, KeyError, MediaError, Result};
pub use image::{BindingSlot, DecodedImage, ImageCoordinator};
pub use repository::{CatalogService, MovieBrowser, MovieRepository};
pub use services::ImageServices;
pub use units::ByteSize;

pub use marquee_model as model;
