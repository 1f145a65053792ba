use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sc_core::{Article, ArticleFields, ArticleStore, Error, Result, UnitOfWork};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqliteRow};
use sqlx::{Row, Sqlite, Transaction};
use std::path::{Path, PathBuf};

/// Schema revisions, applied in order and recorded in `schema_migrations`.
pub const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS articles (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL CHECK (length(title) > 0 AND length(title) <= 255),
        subtitle TEXT NOT NULL DEFAULT '' CHECK (length(subtitle) <= 255),
        url TEXT NOT NULL UNIQUE CHECK (url <> ''),
        img_url TEXT NOT NULL DEFAULT '',
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    ALTER TABLE articles ADD COLUMN published_date TEXT
    "#,
    // Add future migrations here
];

const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct SqliteStore {
    pool: SqlitePool,
    db_path: PathBuf,
}

impl SqliteStore {
    pub async fn new_with_path(db_path: &Path) -> Result<Self> {
        Self::new_at_revision(db_path, MIGRATIONS.len()).await
    }

    /// Opens the database with only the first `revision` migrations applied.
    pub async fn new_at_revision(db_path: &Path, revision: usize) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options)
            .await
            .map_err(|e| Error::Database(format!("Failed to connect to database: {}", e)))?;

        let store = Self {
            pool,
            db_path: db_path.to_path_buf(),
        };
        store.migrate(revision.min(MIGRATIONS.len())).await?;
        Ok(store)
    }

    pub fn get_db_path(&self) -> &Path {
        &self.db_path
    }

    async fn migrate(&self, revision: usize) -> Result<()> {
        sqlx::query("CREATE TABLE IF NOT EXISTS schema_migrations (version INTEGER PRIMARY KEY)")
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_error("Failed to create migrations table", e))?;

        let applied: i64 = sqlx::query("SELECT COUNT(*) AS n FROM schema_migrations")
            .fetch_one(&self.pool)
            .await
            .and_then(|row| row.try_get("n"))
            .map_err(|e| map_db_error("Failed to read migrations", e))?;

        for (i, migration) in MIGRATIONS.iter().enumerate().take(revision).skip(applied as usize) {
            let mut tx = self
                .pool
                .begin()
                .await
                .map_err(|e| map_db_error("Failed to begin migration", e))?;
            sqlx::query(migration)
                .execute(&mut *tx)
                .await
                .map_err(|e| map_db_error(&format!("Failed to run migration {}", i), e))?;
            sqlx::query("INSERT INTO schema_migrations (version) VALUES (?)")
                .bind(i as i64)
                .execute(&mut *tx)
                .await
                .map_err(|e| map_db_error(&format!("Failed to record migration {}", i), e))?;
            tx.commit()
                .await
                .map_err(|e| map_db_error(&format!("Failed to commit migration {}", i), e))?;
            tracing::debug!("Applied migration {} to {}", i, self.db_path.display());
        }
        Ok(())
    }
}

#[async_trait]
impl ArticleStore for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn begin<'a>(&'a self) -> Result<Box<dyn UnitOfWork + 'a>> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_db_error("Failed to begin transaction", e))?;
        Ok(Box::new(SqliteUnitOfWork { tx }))
    }

    async fn list(&self) -> Result<Vec<Article>> {
        let rows = sqlx::query("SELECT * FROM articles")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_db_error("Failed to list articles", e))?;

        let mut articles = rows.iter().map(row_to_article).collect::<Result<Vec<_>>>()?;
        articles.sort_by(Article::display_order);
        Ok(articles)
    }

    async fn count(&self) -> Result<usize> {
        let n: i64 = sqlx::query("SELECT COUNT(*) AS n FROM articles")
            .fetch_one(&self.pool)
            .await
            .and_then(|row| row.try_get("n"))
            .map_err(|e| map_db_error("Failed to count articles", e))?;
        Ok(n as usize)
    }
}

struct SqliteUnitOfWork {
    tx: Transaction<'static, Sqlite>,
}

#[async_trait]
impl UnitOfWork for SqliteUnitOfWork {
    async fn get_by_url(&mut self, url: &str) -> Result<Option<Article>> {
        let row = sqlx::query("SELECT * FROM articles WHERE url = ?")
            .bind(url)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| map_db_error("Failed to get article", e))?;
        row.as_ref().map(row_to_article).transpose()
    }

    async fn create(&mut self, fields: &ArticleFields) -> Result<Article> {
        fields.validate()?;
        let now = Utc::now();

        // published_date is only named when set, so an older schema still accepts the row
        let sql = if fields.published_date.is_some() {
            "INSERT INTO articles (title, subtitle, url, img_url, created_at, updated_at, published_date) \
             VALUES (?, ?, ?, ?, ?, ?, ?)"
        } else {
            "INSERT INTO articles (title, subtitle, url, img_url, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?)"
        };
        let mut query = sqlx::query(sql)
            .bind(&fields.title)
            .bind(&fields.subtitle)
            .bind(&fields.url)
            .bind(&fields.img_url)
            .bind(now.to_rfc3339())
            .bind(now.to_rfc3339());
        if let Some(date) = fields.published_date {
            query = query.bind(date.format(DATE_FORMAT).to_string());
        }

        let result = query
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_db_error("Failed to store article", e))?;

        Ok(Article {
            id: result.last_insert_rowid(),
            title: fields.title.clone(),
            subtitle: fields.subtitle.clone(),
            url: fields.url.clone(),
            img_url: fields.img_url.clone(),
            published_date: fields.published_date,
            created_at: now,
            updated_at: now,
        })
    }

    async fn update(&mut self, article: &Article) -> Result<Article> {
        article.fields().validate()?;
        let now = Utc::now();

        let sql = if article.published_date.is_some() {
            "UPDATE articles SET title = ?, subtitle = ?, url = ?, img_url = ?, updated_at = ?, \
             published_date = ? WHERE id = ?"
        } else {
            "UPDATE articles SET title = ?, subtitle = ?, url = ?, img_url = ?, updated_at = ? \
             WHERE id = ?"
        };
        let mut query = sqlx::query(sql)
            .bind(&article.title)
            .bind(&article.subtitle)
            .bind(&article.url)
            .bind(&article.img_url)
            .bind(now.to_rfc3339());
        if let Some(date) = article.published_date {
            query = query.bind(date.format(DATE_FORMAT).to_string());
        }

        let result = query
            .bind(article.id)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_db_error("Failed to update article", e))?;
        if result.rows_affected() == 0 {
            return Err(Error::Storage(format!("Article {} not found", article.id)));
        }

        let mut updated = article.clone();
        updated.updated_at = now;
        Ok(updated)
    }

    async fn delete_all(&mut self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM articles")
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_db_error("Failed to delete articles", e))?;
        Ok(result.rows_affected())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| map_db_error("Failed to commit transaction", e))
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.tx
            .rollback()
            .await
            .map_err(|e| map_db_error("Failed to roll back transaction", e))
    }
}

fn row_to_article(row: &SqliteRow) -> Result<Article> {
    let get_text = |column: &str| -> Result<String> {
        row.try_get::<String, _>(column)
            .map_err(|e| Error::Database(format!("Failed to read column {}: {}", column, e)))
    };

    let created_at = parse_timestamp(&get_text("created_at")?)?;
    let updated_at = parse_timestamp(&get_text("updated_at")?)?;

    // Missing on databases that predate the published_date migration
    let published_date = match row.try_get::<Option<String>, _>("published_date") {
        Ok(Some(text)) => Some(
            NaiveDate::parse_from_str(&text, DATE_FORMAT)
                .map_err(|e| Error::Database(format!("Failed to parse date {:?}: {}", text, e)))?,
        ),
        Ok(None) | Err(sqlx::Error::ColumnNotFound(_)) => None,
        Err(e) => return Err(map_db_error("Failed to read published_date", e)),
    };

    Ok(Article {
        id: row
            .try_get("id")
            .map_err(|e| Error::Database(format!("Failed to read column id: {}", e)))?,
        title: get_text("title")?,
        subtitle: get_text("subtitle")?,
        url: get_text("url")?,
        img_url: get_text("img_url")?,
        published_date,
        created_at,
        updated_at,
    })
}

fn parse_timestamp(text: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Database(format!("Failed to parse timestamp {:?}: {}", text, e)))
}

/// Sorts sqlx failures into the error kinds the reconciler reacts to.
fn map_db_error(context: &str, e: sqlx::Error) -> Error {
    if let sqlx::Error::Database(db) = &e {
        let message = db.message();
        if let Some(column) = missing_column(message) {
            return Error::SchemaDrift { column };
        }
        if message.contains("constraint failed") {
            return Error::Validation(message.to_string());
        }
    }
    Error::Database(format!("{}: {}", context, e))
}

fn missing_column(message: &str) -> Option<String> {
    ["no such column: ", "has no column named "]
        .iter()
        .find_map(|marker| message.split_once(marker))
        .map(|(_, rest)| {
            rest.split_whitespace()
                .next()
                .unwrap_or_default()
                .rsplit('.')
                .next()
                .unwrap_or_default()
                .to_string()
        })
        .filter(|column| !column.is_empty())
}
