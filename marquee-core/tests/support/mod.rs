//! Shared fixtures for marquee-core integration tests.
#![allow(dead_code)]

use std::{
    collections::HashMap,
    path::Path,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use marquee_core::{
    ByteSize, CatalogError, DecodedImage, FetchError, ImageCacheConfig,
    ImageServices,
    image::ImageFetcher,
    infra::cache::{ImageCache, ImageCacheKey, ImageCacheRoot},
    model::{Movie, MovieID, MovieQuery, MovieSummary},
};
use tokio::sync::Notify;

pub fn solid_image(width: u32, height: u32, value: u8) -> DecodedImage {
    DecodedImage::from_rgba(width, height, vec![value; (width * height * 4) as usize])
        .expect("buffer matches dimensions")
}

pub fn services_at(root: &Path, fetcher: Arc<dyn ImageFetcher>) -> ImageServices {
    let config = ImageCacheConfig {
        memory_budget: ByteSize::from_mib(4),
        ..ImageCacheConfig::default()
    };
    ImageServices::with_fetcher(&config, ImageCacheRoot::new(root), fetcher)
}

/// Always returns the same image and counts calls.
#[derive(Debug)]
pub struct CountingFetcher {
    image: DecodedImage,
    calls: AtomicUsize,
}

impl CountingFetcher {
    pub fn new(image: DecodedImage) -> Arc<Self> {
        Arc::new(Self {
            image,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageFetcher for CountingFetcher {
    async fn fetch(&self, _url: &str) -> Result<DecodedImage, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.image.clone())
    }
}

/// Fails every call the way an empty response would.
#[derive(Debug, Default)]
pub struct FailingFetcher {
    calls: AtomicUsize,
}

impl FailingFetcher {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageFetcher for FailingFetcher {
    async fn fetch(&self, url: &str) -> Result<DecodedImage, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(FetchError::EmptyBody(url.to_string()))
    }
}

/// Blocks inside `fetch` until released, so tests can cancel mid-flight.
#[derive(Debug)]
pub struct GatedFetcher {
    image: DecodedImage,
    started: Notify,
    release: Notify,
    completed: AtomicUsize,
}

impl GatedFetcher {
    pub fn new(image: DecodedImage) -> Arc<Self> {
        Arc::new(Self {
            image,
            started: Notify::new(),
            release: Notify::new(),
            completed: AtomicUsize::new(0),
        })
    }

    pub async fn wait_started(&self) {
        self.started.notified().await;
    }

    /// Let one pending or future fetch finish.
    pub fn release_one(&self) {
        self.release.notify_one();
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageFetcher for GatedFetcher {
    async fn fetch(&self, _url: &str) -> Result<DecodedImage, FetchError> {
        self.started.notify_one();
        self.release.notified().await;
        self.completed.fetch_add(1, Ordering::SeqCst);
        Ok(self.image.clone())
    }
}

/// Wraps a real cache and holds every `store_image` until released.
#[derive(Debug)]
pub struct GatedWriteCache<C> {
    inner: C,
    write_started: Notify,
    release: Notify,
    write_finished: Notify,
    finished: AtomicBool,
}

impl<C> GatedWriteCache<C> {
    pub fn new(inner: C) -> Arc<Self> {
        Arc::new(Self {
            inner,
            write_started: Notify::new(),
            release: Notify::new(),
            write_finished: Notify::new(),
            finished: AtomicBool::new(false),
        })
    }

    pub async fn wait_write_started(&self) {
        self.write_started.notified().await;
    }

    pub async fn wait_write_finished(&self) {
        self.write_finished.notified().await;
    }

    pub fn release_write(&self) {
        self.release.notify_one();
    }

    pub fn finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<C: ImageCache> ImageCache for GatedWriteCache<C> {
    async fn retrieve_image(&self, key: &ImageCacheKey) -> Option<DecodedImage> {
        self.inner.retrieve_image(key).await
    }

    async fn store_image(&self, key: &ImageCacheKey, image: &DecodedImage) {
        self.write_started.notify_one();
        self.release.notified().await;
        self.inner.store_image(key, image).await;
        self.finished.store(true, Ordering::SeqCst);
        self.write_finished.notify_one();
    }

    fn on_low_memory(&self) {
        self.inner.on_low_memory();
    }
}

/// Fixed in-memory catalog that records every list query it receives.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    pub movies: HashMap<MovieID, Movie>,
    pub genres: Option<Vec<String>>,
    pub listing: Vec<MovieSummary>,
    pub unreachable: bool,
    /// Movie lookups never answer.
    pub stalled: bool,
    pub(crate) queries: Mutex<Vec<MovieQuery>>,
}

impl InMemoryCatalog {
    pub fn with_movie(mut self, movie: Movie) -> Self {
        self.movies.insert(movie.id, movie);
        self
    }

    pub fn queries(&self) -> Vec<MovieQuery> {
        self.queries.lock().expect("queries lock").clone()
    }

    fn check_reachable(&self) -> Result<(), CatalogError> {
        if self.unreachable {
            return Err(CatalogError::Transport("connection refused".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl marquee_core::CatalogService for InMemoryCatalog {
    async fn movie(&self, id: MovieID) -> Result<Option<Movie>, CatalogError> {
        self.check_reachable()?;
        if self.stalled {
            std::future::pending::<()>().await;
        }
        Ok(self.movies.get(&id).cloned())
    }

    async fn genres(&self) -> Result<Option<Vec<String>>, CatalogError> {
        self.check_reachable()?;
        Ok(self.genres.clone())
    }

    async fn movies(
        &self,
        query: &MovieQuery,
    ) -> Result<Vec<MovieSummary>, CatalogError> {
        self.check_reachable()?;
        self.queries.lock().expect("queries lock").push(query.clone());
        Ok(self.listing.clone())
    }
}
