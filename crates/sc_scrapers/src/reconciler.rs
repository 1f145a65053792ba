use chrono::{Local, NaiveDate};
use sc_core::{Article, ArticleFields, ArticleStore, Result, ScrapedRecord, UnitOfWork};

use crate::dates;
use crate::logging::Logger;

/// Column that older databases may not have yet.
pub const PUBLISHED_DATE: &str = "published_date";

/// What happened to one record.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Created(Article),
    Updated(Article),
}

/// A record the store refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    pub title: String,
    pub url: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub created: usize,
    pub updated: usize,
    pub skipped: Vec<SkippedRecord>,
}

impl ReconcileReport {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    pub fn total(&self) -> usize {
        self.created + self.updated + self.skipped.len()
    }
}

/// Merges scraped records into a store, keyed by article URL.
pub struct Reconciler<'s> {
    store: &'s dyn ArticleStore,
    today: NaiveDate,
    logger: Logger,
}

impl<'s> Reconciler<'s> {
    pub fn new(store: &'s dyn ArticleStore) -> Self {
        Self {
            store,
            today: Local::now().date_naive(),
            logger: Logger::new(),
        }
    }

    /// Reference date whose year applies to `Mon D` dates.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    pub fn fields_for(&self, record: &ScrapedRecord) -> ArticleFields {
        ArticleFields {
            title: record.title.clone(),
            subtitle: record.subtitle.clone(),
            url: record.link.clone(),
            img_url: record.image_url.clone(),
            published_date: dates::parse_published_date(&record.date, self.today),
        }
    }

    /// Upserts every record inside one unit of work.
    ///
    /// With `replace`, all stored articles are deleted first. A record the
    /// store rejects is reported as skipped; only failures of the unit of
    /// work itself are returned as errors, after rolling it back.
    pub async fn reconcile<I>(&self, records: I, replace: bool) -> Result<ReconcileReport>
    where
        I: IntoIterator<Item = ScrapedRecord>,
    {
        let mut uow = self.store.begin().await?;

        if replace {
            self.logger.info("Deleting existing articles...");
            match uow.delete_all().await {
                Ok(deleted) => self.logger.info(&format!("Deleted {} articles", deleted)),
                Err(e) => {
                    if let Err(rollback_err) = uow.rollback().await {
                        self.logger.error(&format!("Rollback failed: {}", rollback_err));
                    }
                    return Err(e);
                }
            }
        }

        let mut report = ReconcileReport::default();
        for record in records {
            let mut fields = self.fields_for(&record);
            let result = match upsert(uow.as_mut(), &fields).await {
                Err(e) if e.is_missing_column(PUBLISHED_DATE) && fields.published_date.is_some() => {
                    self.logger.warn(&format!(
                        "Store has no {} column, retrying '{}' without it",
                        PUBLISHED_DATE, fields.title
                    ));
                    fields.published_date = None;
                    upsert(uow.as_mut(), &fields).await
                }
                other => other,
            };

            match result {
                Ok(Outcome::Created(article)) => {
                    report.created += 1;
                    self.logger.info(&format!("Created: {}", article.title));
                }
                Ok(Outcome::Updated(article)) => {
                    report.updated += 1;
                    self.logger.info(&format!("Updated: {}", article.title));
                }
                Err(e) => {
                    self.logger.warn(&format!(
                        "Error processing article '{}': {}",
                        fields.title, e
                    ));
                    report.skipped.push(SkippedRecord {
                        title: fields.title,
                        url: fields.url,
                        reason: e.to_string(),
                    });
                }
            }
        }

        uow.commit().await?;
        Ok(report)
    }
}

async fn upsert(uow: &mut (dyn UnitOfWork + '_), fields: &ArticleFields) -> Result<Outcome> {
    match uow.get_by_url(&fields.url).await? {
        Some(mut article) => {
            article.apply(fields);
            uow.update(&article).await.map(Outcome::Updated)
        }
        None => uow.create(fields).await.map(Outcome::Created),
    }
}
