use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_SITE: &str = "https://medium.com";

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// How the profile page is requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// Origin the `/@username` path is appended to
    pub profile_base: String,
    pub user_agent: String,
    pub accept_language: String,
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            profile_base: DEFAULT_SITE.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl FetcherConfig {
    pub fn with_profile_base(mut self, base: impl Into<String>) -> Self {
        self.profile_base = base.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// CSS selectors the listing extractor applies to a profile page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Origin relative links are resolved against
    pub base_url: String,
    pub block: String,
    pub title: String,
    pub subtitle: String,
    pub link: String,
    pub image: String,
    pub date: String,
    /// Longer text is never taken for a date
    pub max_date_len: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SITE.to_string(),
            block: "article".to_string(),
            title: "h1, h2".to_string(),
            subtitle: "h3".to_string(),
            link: "a[href]".to_string(),
            image: "img".to_string(),
            date: "span, p".to_string(),
            max_date_len: 20,
        }
    }
}

impl ExtractorConfig {
    pub fn with_base_url(mut self, base: impl Into<String>) -> Self {
        self.base_url = base.into();
        self
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_secs)
    }
}
