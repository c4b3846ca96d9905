use std::{
    fmt,
    path::{Path, PathBuf},
};

use url::Url;

use crate::constants::KEY_SEPARATOR_REPLACEMENT;
use crate::error::KeyError;

/// Base used to resolve bare paths (`/t/p/poster.jpg`) so they keep their path.
const RELATIVE_BASE: &str = "file:///";

/// Root directory for the flat image file store.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ImageCacheRoot(PathBuf);

impl ImageCacheRoot {
    /// The directory is created lazily on the first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Debug for ImageCacheRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ImageCacheRoot").field(&self.0).finish()
    }
}

/// Filesystem-safe name of one cached image.
///
/// Keys are only produced by [`image_cache_key_for`], so every value is a
/// single path segment with no separators.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ImageCacheKey(String);

impl ImageCacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ImageCacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ImageCacheKey").field(&self.0).finish()
    }
}

impl fmt::Display for ImageCacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ImageCacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Derive the cache key for an image URL or path.
///
/// Only the URI path takes part: leading separators are dropped and every
/// remaining separator becomes `_`. Host, query and fragment are ignored, so
/// `https://a/x.png` and `https://b/x.png?w=300` share a key. The path stays
/// percent-encoded.
pub fn image_cache_key_for(path: &str) -> Result<ImageCacheKey, KeyError> {
    let url = match Url::parse(path) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Url::parse(RELATIVE_BASE)
                .and_then(|base| base.join(path))
                .map_err(|err| malformed(path, err))?
        }
        Err(err) => return Err(malformed(path, err)),
    };

    let flattened: String = url
        .path()
        .trim_start_matches(['/', '\\'])
        .chars()
        .map(|c| match c {
            '/' | '\\' => KEY_SEPARATOR_REPLACEMENT,
            other => other,
        })
        .collect();

    if flattened.is_empty() {
        return Err(KeyError::EmptyPath(path.to_string()));
    }

    Ok(ImageCacheKey(flattened))
}

fn malformed(path: &str, err: url::ParseError) -> KeyError {
    KeyError::Malformed {
        path: path.to_string(),
        reason: err.to_string(),
    }
}
