pub mod crawler;
pub mod error;
pub mod result;

pub use crawler::{Crawler, ProgressCallback};
pub use error::CrawlError;
pub use result::FetchedPage;
