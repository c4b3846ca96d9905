//! Decoded bitmaps and the paths that produce them.

pub mod coordinator;
pub mod decoded;
pub mod fetcher;
pub mod slot;

pub use coordinator::ImageCoordinator;
pub use decoded::DecodedImage;
pub use fetcher::{DisabledFetcher, HttpImageFetcher, ImageFetcher};
pub use slot::BindingSlot;
