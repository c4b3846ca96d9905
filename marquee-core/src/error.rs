use thiserror::Error;

/// Why an image path could not be turned into a cache key.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("malformed image path {path:?}: {reason}")]
    Malformed { path: String, reason: String },

    #[error("image path {0:?} has no path component to derive a key from")]
    EmptyPath(String),
}

/// Failure to obtain an image over the network.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("transport error for {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected HTTP status {status} for {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("image response for {0} had no body")]
    EmptyBody(String),

    #[error("could not decode image from {url}: {reason}")]
    Decode { url: String, reason: String },

    #[error("network fetching is disabled; cannot fetch {0}")]
    Disabled(String),
}

/// Failure reported by the catalog service collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("catalog transport error: {0}")]
    Transport(String),

    #[error("catalog data error: {0}")]
    Data(String),
}

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("IO error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid image path: {0}")]
    InvalidImagePath(#[from] KeyError),

    #[error("Image fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Catalog request failed: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Not found: {0}")]
    NotFound(String),

    /// A catalog record lacked a field the request needs; nothing was fetched.
    #[error("Missing data: {0}")]
    MissingData(String),

    #[error("Operation cancelled: {0}")]
    Cancelled(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MediaError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        MediaError::Io {
            context: context.into(),
            source,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, MediaError::Cancelled(_))
    }
}

pub type Result<T> = std::result::Result<T, MediaError>;
