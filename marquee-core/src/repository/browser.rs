//! Screen-facing wrapper over [`MovieRepository`].
//!
//! Screens have nothing useful to do with an error beyond showing a
//! placeholder, so every failure here is logged and flattened to `None` or an
//! empty list.

use futures::future::join_all;
use marquee_model::{
    CastMember, Movie, MovieID, MovieQuery, MovieSummary, OrderCategory,
};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::MovieRepository;
use crate::error::{MediaError, Result};
use crate::image::DecodedImage;

#[derive(Debug, Clone)]
pub struct MovieBrowser {
    repository: MovieRepository,
}

impl MovieBrowser {
    pub fn new(repository: MovieRepository) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &MovieRepository {
        &self.repository
    }

    pub async fn movie(&self, id: MovieID) -> Option<Movie> {
        soften(self.repository.get_movie(id).await, || {
            format!("Unable to get movie {id}")
        })
    }

    pub async fn poster(
        &self,
        id: MovieID,
        cancel: &CancellationToken,
    ) -> Option<DecodedImage> {
        soften(self.repository.get_movie_poster(id, cancel).await, || {
            format!("Unable to get movie poster for {id}")
        })
    }

    pub async fn cast_profile(
        &self,
        cast: &CastMember,
        cancel: &CancellationToken,
    ) -> Option<DecodedImage> {
        soften(self.repository.get_cast_profile(cast, cancel).await, || {
            format!("Unable to get cast profile for {}", cast.name)
        })
    }

    /// Profile photos for the whole cast, loaded concurrently, in cast order.
    pub async fn cast_profiles(
        &self,
        movie: &Movie,
        cancel: &CancellationToken,
    ) -> Vec<Option<DecodedImage>> {
        join_all(
            movie
                .cast
                .iter()
                .map(|member| self.cast_profile(member, cancel)),
        )
        .await
    }

    pub async fn top_movies(&self, count: u32) -> Vec<MovieSummary> {
        self.list(&MovieQuery::top_rated(count), || {
            format!("Unable to get top {count} movies")
        })
        .await
    }

    pub async fn genres(&self) -> Vec<String> {
        soften(self.repository.get_movie_genres().await, || {
            "Unable to get movie genres".to_string()
        })
        .unwrap_or_default()
    }

    pub async fn movies_by_genre(
        &self,
        genre: Option<&str>,
        order: OrderCategory,
    ) -> Vec<MovieSummary> {
        let mut query = MovieQuery::all().ordered_by(order);
        if let Some(genre) = genre {
            query = query.with_genre(genre);
        }
        self.list(&query, || format!("Unable to get movie genre {genre:?}"))
            .await
    }

    pub async fn all_movies(&self) -> Vec<MovieSummary> {
        self.list(&MovieQuery::all(), || "Movie list query failure".to_string())
            .await
    }

    pub fn on_low_memory(&self) {
        self.repository.on_low_memory();
    }

    async fn list(
        &self,
        query: &MovieQuery,
        context: impl FnOnce() -> String,
    ) -> Vec<MovieSummary> {
        soften(self.repository.get_movies_by_query(query).await, context)
            .unwrap_or_default()
    }
}

fn soften<T>(result: Result<T>, context: impl FnOnce() -> String) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(MediaError::Cancelled(_)) => None,
        Err(err) => {
            debug!("{}: {err}", context());
            None
        }
    }
}
