use std::time::Duration;

use crate::units::ByteSize;

/// Default byte budget for decoded images held in memory.
pub const DEFAULT_MEMORY_BUDGET: ByteSize = ByteSize::from_mib(64);

/// Default timeout for a single image GET.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Subdirectory of the application cache dir holding encoded images.
pub const IMAGE_CACHE_DIR_NAME: &str = "images";

/// Character that replaces path separators when flattening a path into a key.
pub const KEY_SEPARATOR_REPLACEMENT: char = '_';

pub const DEFAULT_USER_AGENT: &str =
    concat!("marquee/", env!("CARGO_PKG_VERSION"));

/// Qualifier / organization / application triple for platform directories.
pub const APP_QUALIFIER: &str = "dev";
pub const APP_ORGANIZATION: &str = "marquee";
pub const APP_NAME: &str = "marquee";
