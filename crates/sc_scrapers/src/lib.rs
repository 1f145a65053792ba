pub mod cli;
pub mod dates;
pub mod extractor;
pub mod fetcher;
pub mod job;
pub mod logging;
pub mod reconciler;

pub use extractor::{ListingExtractor, Listings};
pub use fetcher::ProfileFetcher;
pub use job::ScrapeJob;
pub use reconciler::{Outcome, ReconcileReport, Reconciler, SkippedRecord};

pub mod prelude {
    pub use super::{ListingExtractor, ProfileFetcher, ReconcileReport, Reconciler, ScrapeJob};
    pub use sc_core::{Article, ArticleStore, Error, Result, ScrapedRecord};
}
