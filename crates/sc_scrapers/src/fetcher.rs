use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use sc_core::{Error, FetcherConfig, Result};
use tracing::debug;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Downloads public profile pages with browser-style headers.
#[derive(Debug, Clone)]
pub struct ProfileFetcher {
    client: reqwest::Client,
    config: FetcherConfig,
}

impl ProfileFetcher {
    pub fn new(config: FetcherConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(&config.accept_language)
                .map_err(|e| Error::Config(format!("Invalid Accept-Language header: {}", e)))?,
        );

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    /// Strips surrounding whitespace and one leading `@`.
    pub fn normalize_username(username: &str) -> Result<String> {
        let trimmed = username.trim();
        let name = trimmed.strip_prefix('@').unwrap_or(trimmed).trim();
        if name.is_empty() || name.contains(['/', '?', '#']) || name.contains(char::is_whitespace) {
            return Err(Error::InvalidUsername(username.to_string()));
        }
        Ok(name.to_string())
    }

    pub fn profile_url(&self, username: &str) -> Result<String> {
        let name = Self::normalize_username(username)?;
        Ok(format!(
            "{}/@{}",
            self.config.profile_base.trim_end_matches('/'),
            name
        ))
    }

    /// Fetches the raw markup of `username`'s profile page.
    pub async fn get_profile_page(&self, username: &str) -> Result<String> {
        let url = self.profile_url(username)?;
        debug!("GET {}", url);

        let fetch_error = |source| Error::Fetch {
            url: url.clone(),
            source,
        };
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(fetch_error)?
            .error_for_status()
            .map_err(fetch_error)?;
        let html = response.text().await.map_err(fetch_error)?;

        debug!("Fetched {} bytes from {}", html.len(), url);
        Ok(html)
    }
}
