use std::time::Duration;

use crate::ids::MovieID;

/// A credited person with no further detail (directors).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Person {
    pub name: String,
}

/// One cast credit on a movie detail record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct CastMember {
    pub name: String,
    pub character: String,
    /// Absolute URL of the profile photo, when the catalog has one.
    #[cfg_attr(feature = "serde", serde(default))]
    pub profile_path: Option<String>,
}

/// Full movie record as returned by a single-movie lookup.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Movie {
    pub id: MovieID,
    pub title: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub overview: String,
    /// Runtime in whole minutes.
    #[cfg_attr(feature = "serde", serde(default))]
    pub runtime: u32,
    /// Average vote on a 0..=10 scale.
    #[cfg_attr(feature = "serde", serde(default))]
    pub vote_average: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub poster_path: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub genres: Vec<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub director: Person,
    #[cfg_attr(feature = "serde", serde(default))]
    pub cast: Vec<CastMember>,
}

impl Movie {
    pub fn runtime(&self) -> Duration {
        Duration::from_secs(u64::from(self.runtime) * 60)
    }

    /// Human readable runtime, e.g. `2h 7m`.
    pub fn runtime_label(&self) -> String {
        format!("{}h {}m", self.runtime / 60, self.runtime % 60)
    }

    /// Vote average mapped onto a five star scale.
    pub fn star_rating(&self) -> f32 {
        (self.vote_average / 2.0) as f32
    }

    pub fn genres_label(&self) -> String {
        self.genres.join(", ")
    }
}

/// Movie row as returned by list queries.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct MovieSummary {
    pub id: MovieID,
    pub title: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub poster_path: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub vote_average: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub popularity: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub runtime: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub genres: Vec<String>,
}
