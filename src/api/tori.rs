use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;

use crate::core::config::ToriConfig;

const USER_AGENT: &str = concat!("tori-watch/", env!("CARGO_PKG_VERSION"));

/// Where listing pages come from.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Fetches the raw markup of the search results page.
    async fn fetch_page(&self) -> Result<String>;
}

pub struct ToriClient {
    client: Client,
    search_url: String,
}

impl ToriClient {
    pub fn new(config: &ToriConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.fetch_timeout())
            .build()
            .context("Failed to build tori HTTP client")?;

        Ok(Self {
            client,
            search_url: config.search_url.clone(),
        })
    }

    pub fn search_url(&self) -> &str {
        &self.search_url
    }
}

#[async_trait]
impl ListingSource for ToriClient {
    async fn fetch_page(&self) -> Result<String> {
        let response = self
            .client
            .get(&self.search_url)
            .send()
            .await
            .context("Listing page request failed")?;
        let status = response.status();

        if !status.is_success() {
            return Err(anyhow::anyhow!("Listing page request failed: {}", status));
        }

        let body = response
            .text()
            .await
            .context("Failed to read listing page body")?;
        tracing::debug!("Fetched listing page ({} bytes)", body.len());

        Ok(body)
    }
}
