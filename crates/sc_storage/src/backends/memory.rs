use async_trait::async_trait;
use chrono::Utc;
use sc_core::{Article, ArticleFields, ArticleStore, Error, Result, UnitOfWork};
use std::sync::Arc;
use tokio::sync::{OwnedRwLockWriteGuard, RwLock};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    articles: Vec<Article>,
    next_id: i64,
}

impl MemoryState {
    fn check_unique_url(&self, url: &str, except_id: Option<i64>) -> Result<()> {
        if self
            .articles
            .iter()
            .any(|a| a.url == url && Some(a.id) != except_id)
        {
            return Err(Error::Validation(format!(
                "UNIQUE constraint failed: articles.url ({})",
                url
            )));
        }
        Ok(())
    }
}

/// Articles held in process memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ArticleStore for InMemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn begin<'a>(&'a self) -> Result<Box<dyn UnitOfWork + 'a>> {
        let guard = self.state.clone().write_owned().await;
        let working = (*guard).clone();
        Ok(Box::new(MemoryUnitOfWork { guard, working }))
    }

    async fn list(&self) -> Result<Vec<Article>> {
        let state = self.state.read().await;
        let mut articles = state.articles.clone();
        articles.sort_by(Article::display_order);
        Ok(articles)
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.state.read().await.articles.len())
    }
}

/// Holds the store's write lock and edits a copy, published on commit.
struct MemoryUnitOfWork {
    guard: OwnedRwLockWriteGuard<MemoryState>,
    working: MemoryState,
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn get_by_url(&mut self, url: &str) -> Result<Option<Article>> {
        Ok(self.working.articles.iter().find(|a| a.url == url).cloned())
    }

    async fn create(&mut self, fields: &ArticleFields) -> Result<Article> {
        fields.validate()?;
        self.working.check_unique_url(&fields.url, None)?;

        self.working.next_id += 1;
        let now = Utc::now();
        let article = Article {
            id: self.working.next_id,
            title: fields.title.clone(),
            subtitle: fields.subtitle.clone(),
            url: fields.url.clone(),
            img_url: fields.img_url.clone(),
            published_date: fields.published_date,
            created_at: now,
            updated_at: now,
        };
        self.working.articles.push(article.clone());
        Ok(article)
    }

    async fn update(&mut self, article: &Article) -> Result<Article> {
        article.fields().validate()?;
        self.working.check_unique_url(&article.url, Some(article.id))?;

        let stored = self
            .working
            .articles
            .iter_mut()
            .find(|a| a.id == article.id)
            .ok_or_else(|| Error::Storage(format!("Article {} not found", article.id)))?;
        stored.apply(&article.fields());
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn delete_all(&mut self) -> Result<u64> {
        let deleted = self.working.articles.len() as u64;
        self.working.articles.clear();
        Ok(deleted)
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let MemoryUnitOfWork { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}
