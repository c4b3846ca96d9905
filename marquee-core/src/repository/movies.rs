use std::sync::Arc;

use marquee_model::{CastMember, Movie, MovieID, MovieQuery, MovieSummary};
use tokio_util::sync::CancellationToken;

use super::CatalogService;
use crate::error::{MediaError, Result};
use crate::image::{DecodedImage, ImageCoordinator};

/// Catalog records plus the images they point at.
#[derive(Debug, Clone)]
pub struct MovieRepository {
    catalog: Arc<dyn CatalogService>,
    images: ImageCoordinator,
}

impl MovieRepository {
    pub fn new(catalog: Arc<dyn CatalogService>, images: ImageCoordinator) -> Self {
        Self { catalog, images }
    }

    pub fn images(&self) -> &ImageCoordinator {
        &self.images
    }

    pub async fn get_movie(&self, id: MovieID) -> Result<Movie> {
        self.catalog
            .movie(id)
            .await?
            .ok_or_else(|| MediaError::NotFound(format!("Movie {id} not found")))
    }

    /// Look the movie up again and load its poster.
    ///
    /// A movie without a poster path fails with [`MediaError::MissingData`]
    /// before any image work starts. `cancel` also covers the catalog lookup.
    pub async fn get_movie_poster(
        &self,
        id: MovieID,
        cancel: &CancellationToken,
    ) -> Result<DecodedImage> {
        let movie = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(MediaError::Cancelled(format!(
                    "poster lookup for movie {id}"
                )));
            }
            movie = self.get_movie(id) => movie?,
        };
        let poster_path = movie.poster_path.as_deref().ok_or_else(|| {
            MediaError::MissingData("No movie poster path found".to_string())
        })?;
        self.images.load(poster_path, cancel).await
    }

    pub async fn get_cast_profile(
        &self,
        cast: &CastMember,
        cancel: &CancellationToken,
    ) -> Result<DecodedImage> {
        let profile_path = cast.profile_path.as_deref().ok_or_else(|| {
            MediaError::MissingData("No profile path found".to_string())
        })?;
        self.images.load(profile_path, cancel).await
    }

    pub async fn get_movie_genres(&self) -> Result<Vec<String>> {
        self.catalog
            .genres()
            .await?
            .ok_or_else(|| MediaError::MissingData("No genres found".to_string()))
    }

    pub async fn get_movies_by_query(
        &self,
        query: &MovieQuery,
    ) -> Result<Vec<MovieSummary>> {
        Ok(self.catalog.movies(query).await?)
    }

    pub fn on_low_memory(&self) {
        self.images.on_low_memory();
    }
}
