use sc_core::{ArticleStore, Result};
use scraper::Html;

use crate::extractor::ListingExtractor;
use crate::fetcher::ProfileFetcher;
use crate::logging::Logger;
use crate::reconciler::{ReconcileReport, Reconciler};

/// One scrape of one profile into a store.
pub struct ScrapeJob<'a> {
    fetcher: &'a ProfileFetcher,
    extractor: &'a ListingExtractor,
    store: &'a dyn ArticleStore,
}

impl<'a> ScrapeJob<'a> {
    pub fn new(
        fetcher: &'a ProfileFetcher,
        extractor: &'a ListingExtractor,
        store: &'a dyn ArticleStore,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            store,
        }
    }

    /// Fetches `username`'s profile and reconciles its listings.
    ///
    /// Errors are logged here before they are returned.
    pub async fn run(&self, username: &str, replace: bool) -> Result<ReconcileReport> {
        let logger = Logger::new().with_prefix(format!("[{}]", username.trim()));
        logger.info(&format!(
            "Starting profile scrape for user: {} (store: {})",
            username.trim(),
            self.store.name()
        ));

        match self.scrape(username, replace, &logger).await {
            Ok(report) => {
                logger.info(&format!(
                    "Scraping completed: {} created, {} updated, {} skipped",
                    report.created,
                    report.updated,
                    report.skipped_count()
                ));
                Ok(report)
            }
            Err(e) => {
                logger.error(&format!("Scraping failed: {}", e));
                Err(e)
            }
        }
    }

    async fn scrape(&self, username: &str, replace: bool, logger: &Logger) -> Result<ReconcileReport> {
        let html = self.fetcher.get_profile_page(username).await?;
        let document = Html::parse_document(&html);
        let listings = self.extractor.extract(&document);

        Reconciler::new(self.store)
            .with_logger(logger.clone())
            .reconcile(listings, replace)
            .await
    }
}
