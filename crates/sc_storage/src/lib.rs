use sc_core::{ArticleStore, Result};
use std::path::Path;
use std::sync::Arc;

pub mod backends;

pub use backends::*;

/// Store backends selectable at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum StoreKind {
    /// Process-local store, discarded on exit
    Memory,
    /// SQLite database file
    Sqlite,
}

impl StoreKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKind::Memory => "memory",
            StoreKind::Sqlite => "sqlite",
        }
    }
}

/// Opens the store of the given kind. `database` is only read by file backends.
pub async fn create_storage(kind: StoreKind, database: &Path) -> Result<Arc<dyn ArticleStore>> {
    tracing::debug!("Opening {} store", kind.as_str());
    let store: Arc<dyn ArticleStore> = match kind {
        StoreKind::Memory => Arc::new(InMemoryStore::new()),
        StoreKind::Sqlite => Arc::new(SqliteStore::new_with_path(database).await?),
    };
    Ok(store)
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::{create_storage, StoreKind};
}
