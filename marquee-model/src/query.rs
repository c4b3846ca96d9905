use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn api_name(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.api_name())
    }
}

impl FromStr for SortDirection {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(ModelError::UnknownSortDirection(s.to_string())),
        }
    }
}

/// User-facing ordering choices for browsing a genre.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderCategory {
    Popularity,
    Runtime,
    Title,
    VoteAverage,
}

impl OrderCategory {
    pub fn all() -> &'static [OrderCategory] {
        use OrderCategory::*;
        &[Popularity, Runtime, Title, VoteAverage]
    }

    /// Field name understood by the catalog service's `orderBy` argument.
    pub fn field_name(&self) -> &'static str {
        match self {
            OrderCategory::Popularity => "popularity",
            OrderCategory::Runtime => "runtime",
            OrderCategory::Title => "title",
            OrderCategory::VoteAverage => "voteAverage",
        }
    }

    /// Titles read best A to Z; every numeric ordering shows the largest first.
    pub fn direction(&self) -> SortDirection {
        match self {
            OrderCategory::Title => SortDirection::Asc,
            OrderCategory::Popularity
            | OrderCategory::Runtime
            | OrderCategory::VoteAverage => SortDirection::Desc,
        }
    }
}

impl fmt::Display for OrderCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

impl FromStr for OrderCategory {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderCategory::all()
            .iter()
            .copied()
            .find(|c| c.field_name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ModelError::UnknownOrderCategory(s.to_string()))
    }
}

/// Filter and sort arguments for a movie list request.
///
/// Every field is optional; the default query asks for all movies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct MovieQuery {
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub genre: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub search: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub limit: Option<u32>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub offset: Option<u32>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub order_by: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub sort: Option<SortDirection>,
}

impl MovieQuery {
    pub fn all() -> Self {
        Self::default()
    }

    /// The `limit` best rated movies.
    pub fn top_rated(limit: u32) -> Self {
        Self::default()
            .with_limit(limit)
            .ordered_by(OrderCategory::VoteAverage)
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_sort(
        mut self,
        order_by: impl Into<String>,
        sort: SortDirection,
    ) -> Self {
        self.order_by = Some(order_by.into());
        self.sort = Some(sort);
        self
    }

    pub fn ordered_by(self, category: OrderCategory) -> Self {
        self.with_sort(category.field_name(), category.direction())
    }
}
