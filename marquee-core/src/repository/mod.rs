pub mod browser;
pub mod catalog;
pub mod movies;

pub use browser::MovieBrowser;
pub use catalog::CatalogService;
pub use movies::MovieRepository;
