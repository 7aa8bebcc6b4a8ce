use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use crate::errors::HandlerError;

pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsPage {
    pub status: u16,
    pub body: String,
}

impl NewsPage {
    /// Anything below 400 counts, so redirect pages are still digested.
    pub fn is_success(&self) -> bool {
        self.status < 400
    }
}

#[async_trait]
pub trait NewsSource: Send + Sync {
    async fn fetch_category(&self, category: &str) -> Result<NewsPage, HandlerError>;
}

#[derive(Debug, Clone)]
pub struct HttpNewsClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpNewsClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn category_url(&self, category: &str) -> String {
        match category {
            "latest" => format!("{}/", self.base_url),
            other => format!("{}/tag/{other}/", self.base_url),
        }
    }
}

#[async_trait]
impl NewsSource for HttpNewsClient {
    async fn fetch_category(&self, category: &str) -> Result<NewsPage, HandlerError> {
        let url = self.category_url(category);
        info!(category, url = %url, "fetching news page");

        let response = self.client.get(&url).send().await.map_err(classify)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(classify)?;

        Ok(NewsPage { status, body })
    }
}

fn classify(err: reqwest::Error) -> HandlerError {
    if err.is_timeout() {
        HandlerError::Timeout("TechCrunch news".to_string())
    } else {
        HandlerError::Upstream(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_maps_to_site_root() {
        let client = HttpNewsClient::new("https://techcrunch.com").expect("client builds");
        assert_eq!(client.category_url("latest"), "https://techcrunch.com/");
        assert_eq!(client.category_url("ai"), "https://techcrunch.com/tag/ai/");
    }

    #[test]
    fn statuses_below_400_count_as_success() {
        let page = |status| NewsPage {
            status,
            body: String::new(),
        };
        assert!(page(200).is_success());
        assert!(page(301).is_success());
        assert!(page(399).is_success());
        assert!(!page(404).is_success());
        assert!(!page(503).is_success());
    }
}
