use std::fmt::Debug;

use async_trait::async_trait;
use marquee_model::{Movie, MovieID, MovieQuery, MovieSummary};

use crate::error::CatalogError;

/// Remote movie catalog. Implemented outside this crate (GraphQL in
/// production, in-memory fixtures in tests).
#[async_trait]
pub trait CatalogService: Send + Sync + Debug {
    /// `Ok(None)` when the catalog has no record for `id`.
    async fn movie(&self, id: MovieID) -> Result<Option<Movie>, CatalogError>;

    /// `Ok(None)` when the catalog returned no genre list at all.
    async fn genres(&self) -> Result<Option<Vec<String>>, CatalogError>;

    async fn movies(
        &self,
        query: &MovieQuery,
    ) -> Result<Vec<MovieSummary>, CatalogError>;
}
