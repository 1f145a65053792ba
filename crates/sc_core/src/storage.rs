use async_trait::async_trait;

use crate::types::{Article, ArticleFields};
use crate::Result;

/// A record store of articles keyed by `url`.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Short backend name used in log lines
    fn name(&self) -> &str;

    /// Opens a unit of work. Nothing it does is visible until `commit`.
    async fn begin<'a>(&'a self) -> Result<Box<dyn UnitOfWork + 'a>>;

    /// All articles in display order.
    async fn list(&self) -> Result<Vec<Article>>;

    async fn count(&self) -> Result<usize>;
}

/// One atomic batch of store operations.
///
/// Dropping a unit of work without calling `commit` discards its changes.
#[async_trait]
pub trait UnitOfWork: Send {
    async fn get_by_url(&mut self, url: &str) -> Result<Option<Article>>;

    /// Inserts a new row. Fails with `Error::Validation` when the fields
    /// break a row constraint, including a duplicate `url`.
    async fn create(&mut self, fields: &ArticleFields) -> Result<Article>;

    /// Writes the mutable fields of `article` back to its row.
    async fn update(&mut self, article: &Article) -> Result<Article>;

    /// Removes every row, returning how many were deleted.
    async fn delete_all(&mut self) -> Result<u64>;

    async fn commit(self: Box<Self>) -> Result<()>;

    async fn rollback(self: Box<Self>) -> Result<()>;
}
