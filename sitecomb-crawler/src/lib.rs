pub mod crawler;
pub mod error;
pub mod fetch;
pub mod page;
pub mod parse;
pub mod readability;

pub use crawler::{AuditMode, Crawler, DEFAULT_EXCLUDED_EXTENSIONS, ProgressCallback};
pub use error::CrawlError;
pub use page::{PageOutcome, PageRecord};
