pub mod config;
pub mod error;
pub mod storage;
pub mod types;

pub use config::{ExtractorConfig, FetcherConfig};
pub use error::{Error, Result};
pub use storage::{ArticleStore, UnitOfWork};
pub use types::{Article, ArticleFields, ScrapedRecord};
