use sc_core::{Error, ExtractorConfig, Result, ScrapedRecord};
use scraper::html::Select;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::dates;

/// Pulls article summaries out of a profile page.
///
/// Matching is heuristic: a piece a block does not carry comes back as an
/// empty string, and a block without a title is dropped.
#[derive(Debug, Clone)]
pub struct ListingExtractor {
    base_url: Url,
    block: Selector,
    title: Selector,
    subtitle: Selector,
    link: Selector,
    image: Selector,
    date: Selector,
    max_date_len: usize,
}

impl ListingExtractor {
    pub fn new(config: &ExtractorConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| Error::InvalidUrl(format!("{}: {}", config.base_url, e)))?;

        Ok(Self {
            base_url,
            block: parse_selector(&config.block)?,
            title: parse_selector(&config.title)?,
            subtitle: parse_selector(&config.subtitle)?,
            link: parse_selector(&config.link)?,
            image: parse_selector(&config.image)?,
            date: parse_selector(&config.date)?,
            max_date_len: config.max_date_len,
        })
    }

    /// Lazily walks the listing blocks of `document` in page order.
    pub fn extract<'a>(&'a self, document: &'a Html) -> Listings<'a> {
        Listings {
            extractor: self,
            blocks: document.select(&self.block),
        }
    }

    fn parse_block(&self, block: ElementRef<'_>) -> Option<ScrapedRecord> {
        let title = first_text(block, &self.title).filter(|t| !t.is_empty())?;

        let subtitle = first_text(block, &self.subtitle).unwrap_or_default();

        let link = block
            .select(&self.link)
            .find_map(|a| a.value().attr("href"))
            .and_then(|href| self.resolve(href))
            .unwrap_or_default();

        let image_url = block
            .select(&self.image)
            .find(|img| {
                img.value().attr("alt").map(collapse_whitespace).as_deref() == Some(title.as_str())
            })
            .and_then(|img| img.value().attr("src"))
            .and_then(|src| self.resolve(src))
            .unwrap_or_default();

        let date = block
            .select(&self.date)
            .map(collapsed_text)
            .find(|text| {
                !text.is_empty()
                    && text.chars().count() <= self.max_date_len
                    && dates::looks_like_date(text)
            })
            .unwrap_or_default();

        Some(ScrapedRecord {
            title,
            subtitle,
            link,
            image_url,
            date,
        })
    }

    fn resolve(&self, reference: &str) -> Option<String> {
        let reference = reference.trim();
        if reference.is_empty() {
            return None;
        }
        self.base_url.join(reference).ok().map(String::from)
    }
}

/// Records of one page; consumed once.
pub struct Listings<'a> {
    extractor: &'a ListingExtractor,
    blocks: Select<'a, 'a>,
}

impl Iterator for Listings<'_> {
    type Item = ScrapedRecord;

    fn next(&mut self) -> Option<Self::Item> {
        for block in self.blocks.by_ref() {
            if let Some(record) = self.extractor.parse_block(block) {
                return Some(record);
            }
            tracing::debug!("Skipping listing block without a title");
        }
        None
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| Error::Config(format!("Invalid selector {:?}: {:?}", selector, e)))
}

fn first_text(block: ElementRef<'_>, selector: &Selector) -> Option<String> {
    block.select(selector).next().map(collapsed_text)
}

fn collapsed_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROFILE: &str = r#"
        <html><body>
          <article>
            <div>
              <span>Jane Doe</span>
              <span>Feb 6</span>
              <a href="/@jane/hello-world-1a2b?source=user_profile">
                <h2>  Hello
                  World </h2>
                <h3>A first post</h3>
              </a>
              <img alt="Hello World" src="https://miro.medium.com/hello.png">
              <span>4 min read</span>
            </div>
          </article>
          <article>
            <a href="/p/untitled"><h3>Only a subtitle</h3></a>
          </article>
          <article>
            <h2>Bare Title</h2>
            <img alt="Something else" src="https://miro.medium.com/other.png">
          </article>
          <article>
            <p>Jan was a long month for this writer</p>
            <a href="https://other.example.com/full"><h2>Absolute</h2></a>
            <p>Jan 3, 2021</p>
          </article>
        </body></html>
    "#;

    fn extractor() -> ListingExtractor {
        ListingExtractor::new(&ExtractorConfig::default()).unwrap()
    }

    #[test]
    fn test_extracts_full_block() {
        let document = Html::parse_document(PROFILE);
        let extractor = extractor();
        let first = extractor.extract(&document).next().unwrap();
        assert_eq!(
            first,
            ScrapedRecord {
                title: "Hello World".to_string(),
                subtitle: "A first post".to_string(),
                link: "https://medium.com/@jane/hello-world-1a2b?source=user_profile".to_string(),
                image_url: "https://miro.medium.com/hello.png".to_string(),
                date: "Feb 6".to_string(),
            }
        );
    }

    #[test]
    fn test_block_without_title_is_dropped() {
        let document = Html::parse_document(PROFILE);
        let extractor = extractor();
        let titles: Vec<String> = extractor.extract(&document).map(|r| r.title).collect();
        assert_eq!(titles, vec!["Hello World", "Bare Title", "Absolute"]);
    }

    #[test]
    fn test_missing_pieces_are_empty() {
        let document = Html::parse_document(PROFILE);
        let extractor = extractor();
        let bare = extractor.extract(&document).nth(1).unwrap();
        assert_eq!(bare.title, "Bare Title");
        assert_eq!(bare.subtitle, "");
        assert_eq!(bare.link, "");
        assert_eq!(bare.image_url, "");
        assert_eq!(bare.date, "");
    }

    #[test]
    fn test_absolute_link_and_long_text_skipped_for_date() {
        let document = Html::parse_document(PROFILE);
        let extractor = extractor();
        let last = extractor.extract(&document).last().unwrap();
        assert_eq!(last.link, "https://other.example.com/full");
        assert_eq!(last.date, "Jan 3, 2021");
    }

    #[test]
    fn test_month_named_byline_is_not_a_date() {
        let document = Html::parse_document(
            r#"<article><span>Jan Kowalski</span><span>Feb 6</span><a href="/p/a"><h2>Hi</h2></a></article>"#,
        );
        let record = extractor().extract(&document).next().unwrap();
        assert_eq!(record.date, "Feb 6");
    }

    #[test]
    fn test_image_alt_whitespace_is_collapsed() {
        let document = Html::parse_document(
            r#"<article><h2>Hello World</h2><img alt=" Hello
                World " src="/img/hello.png"></article>"#,
        );
        let record = extractor().extract(&document).next().unwrap();
        assert_eq!(record.image_url, "https://medium.com/img/hello.png");
    }

    #[test]
    fn test_empty_page_yields_nothing() {
        let document = Html::parse_document("<html><body><p>No posts yet</p></body></html>");
        assert_eq!(extractor().extract(&document).count(), 0);
    }

    #[test]
    fn test_invalid_selector_is_config_error() {
        let config = ExtractorConfig {
            block: "article[".to_string(),
            ..ExtractorConfig::default()
        };
        assert!(matches!(ListingExtractor::new(&config), Err(Error::Config(_))));
    }

    #[test]
    fn test_custom_base_url() {
        let config = ExtractorConfig::default().with_base_url("https://blog.example.com");
        let extractor = ListingExtractor::new(&config).unwrap();
        let document = Html::parse_document(r#"<article><a href="/p/abc"><h2>Hi</h2></a></article>"#);
        let record = extractor.extract(&document).next().unwrap();
        assert_eq!(record.link, "https://blog.example.com/p/abc");
    }
}
