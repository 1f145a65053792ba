use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid username: {0:?}")]
    InvalidUsername(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    /// The store's schema lacks a column the record wants to write.
    #[error("Schema drift: column `{column}` is missing")]
    SchemaDrift { column: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

impl Error {
    pub fn is_missing_column(&self, name: &str) -> bool {
        matches!(self, Error::SchemaDrift { column } if column == name)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
