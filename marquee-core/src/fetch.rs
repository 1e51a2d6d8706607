use std::time::Duration;

use tracing::info;

use crate::error::Result;

pub const DEFAULT_LISTING_URL: &str = "https://www.allmovie.com/showtimes/movies";
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Fetches the showtimes listing page. One request per call; retries are
/// left to the caller.
#[derive(Debug, Clone)]
pub struct ListingClient {
    client: reqwest::Client,
    url: String,
}

impl ListingClient {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Client with the given user agent and a bounded request timeout.
    pub fn with_user_agent(url: impl Into<String>, user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self::new(client, url))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Page body; non-success statuses are errors.
    pub async fn fetch_page(&self) -> Result<String> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?;
        info!(url = %self.url, status = %response.status(), "listing page fetched");
        Ok(response.text().await?)
    }
}
