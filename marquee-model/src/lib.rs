//! Catalog data model definitions shared across Marquee crates.
#![allow(missing_docs)]

pub mod error;
pub mod ids;
pub mod movie;
pub mod query;

pub use error::{ModelError, Result as ModelResult};
pub use ids::MovieID;
pub use movie::{CastMember, Movie, MovieSummary, Person};
pub use query::{MovieQuery, OrderCategory, SortDirection};
