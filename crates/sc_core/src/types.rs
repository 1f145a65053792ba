use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use url::Url;

use crate::{Error, Result};

/// Longest title or subtitle a stored row accepts.
pub const MAX_TEXT_LEN: usize = 255;

/// An article row as held by a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub subtitle: String,
    pub url: String,
    pub img_url: String,
    pub published_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Article {
    /// Overwrites the mutable fields with the values in `fields`.
    ///
    /// A known publication date is kept when `fields` carries none.
    pub fn apply(&mut self, fields: &ArticleFields) {
        self.title = fields.title.clone();
        self.subtitle = fields.subtitle.clone();
        self.url = fields.url.clone();
        self.img_url = fields.img_url.clone();
        if fields.published_date.is_some() {
            self.published_date = fields.published_date;
        }
    }

    pub fn fields(&self) -> ArticleFields {
        ArticleFields {
            title: self.title.clone(),
            subtitle: self.subtitle.clone(),
            url: self.url.clone(),
            img_url: self.img_url.clone(),
            published_date: self.published_date,
        }
    }

    /// Newest publication first, undated rows last, then newest row first.
    pub fn display_order(a: &Article, b: &Article) -> Ordering {
        match (a.published_date, b.published_date) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
        .then_with(|| b.created_at.cmp(&a.created_at))
    }
}

/// The fields a scrape writes into an [`Article`], keyed by `url`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleFields {
    pub title: String,
    pub subtitle: String,
    pub url: String,
    pub img_url: String,
    pub published_date: Option<NaiveDate>,
}

impl ArticleFields {
    /// Row constraints every backend enforces before writing.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::Validation("title must not be empty".to_string()));
        }
        if self.title.chars().count() > MAX_TEXT_LEN {
            return Err(Error::Validation(format!(
                "title is longer than {} characters",
                MAX_TEXT_LEN
            )));
        }
        if self.subtitle.chars().count() > MAX_TEXT_LEN {
            return Err(Error::Validation(format!(
                "subtitle is longer than {} characters",
                MAX_TEXT_LEN
            )));
        }
        if self.url.is_empty() {
            return Err(Error::Validation("url must not be empty".to_string()));
        }
        Url::parse(&self.url).map_err(|e| Error::InvalidUrl(format!("{}: {}", self.url, e)))?;
        Ok(())
    }
}

/// Raw fields pulled out of one listing block. Missing pieces are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapedRecord {
    pub title: String,
    pub subtitle: String,
    pub link: String,
    pub image_url: String,
    pub date: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fields() -> ArticleFields {
        ArticleFields {
            title: "Hello".to_string(),
            subtitle: String::new(),
            url: "https://medium.com/p/abc".to_string(),
            img_url: String::new(),
            published_date: None,
        }
    }

    fn article(id: i64, date: Option<NaiveDate>, created_secs: i64) -> Article {
        let created_at = Utc.timestamp_opt(created_secs, 0).unwrap();
        Article {
            id,
            title: format!("Article {}", id),
            subtitle: String::new(),
            url: format!("https://medium.com/p/{}", id),
            img_url: String::new(),
            published_date: date,
            created_at,
            updated_at: created_at,
        }
    }

    #[test]
    fn test_validate_accepts_minimal_fields() {
        assert!(fields().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_rows() {
        let mut f = fields();
        f.url = String::new();
        assert!(matches!(f.validate(), Err(Error::Validation(_))));

        let mut f = fields();
        f.url = "/p/abc".to_string();
        assert!(matches!(f.validate(), Err(Error::InvalidUrl(_))));

        let mut f = fields();
        f.title = "   ".to_string();
        assert!(f.validate().is_err());

        let mut f = fields();
        f.subtitle = "x".repeat(MAX_TEXT_LEN + 1);
        assert!(f.validate().is_err());
    }

    #[test]
    fn test_apply_overwrites_fields() {
        let mut a = article(1, None, 0);
        let mut f = fields();
        f.subtitle = "Sub".to_string();
        f.published_date = NaiveDate::from_ymd_opt(2024, 2, 6);
        a.apply(&f);
        assert_eq!(a.title, "Hello");
        assert_eq!(a.subtitle, "Sub");
        assert_eq!(a.url, "https://medium.com/p/abc");
        assert_eq!(a.published_date, NaiveDate::from_ymd_opt(2024, 2, 6));
        assert_eq!(a.id, 1);

        f.published_date = None;
        a.apply(&f);
        assert_eq!(a.published_date, NaiveDate::from_ymd_opt(2024, 2, 6));
    }

    #[test]
    fn test_display_order() {
        let mut rows = vec![
            article(1, None, 10),
            article(2, NaiveDate::from_ymd_opt(2023, 5, 1), 0),
            article(3, NaiveDate::from_ymd_opt(2024, 1, 1), 0),
            article(4, None, 20),
        ];
        rows.sort_by(Article::display_order);
        let ids: Vec<i64> = rows.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![3, 2, 4, 1]);
    }
}
