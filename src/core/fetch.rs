//! Seed page retrieval for asset-mirror

use std::time::Duration;

use log::info;
use reqwest::{Client, ClientBuilder};

use crate::core::error::{Error, Result};

/// User agent sent with every request
pub const USER_AGENT: &str = concat!("asset-mirror/", env!("CARGO_PKG_VERSION"));

/// Builds the HTTP client shared by page fetches and asset downloads
pub(crate) fn build_client(timeout: Option<Duration>) -> Result<Client> {
    let mut builder = ClientBuilder::new()
        .tcp_keepalive(Duration::from_secs(60))
        .pool_idle_timeout(Duration::from_secs(90))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(USER_AGENT);

    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }

    builder.build().map_err(Into::into)
}

/// Fetches seed page bodies over HTTP
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    /// Create a fetcher, optionally bounding each page request
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
        })
    }

    /// Fetch one page and return its body as text
    ///
    /// Fails on transport errors, non-success status codes and unreadable bodies.
    pub async fn fetch_page(&self, url: &str) -> Result<String> {
        info!("Scraping {url}");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::BadStatus(status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|e| Error::ReadError(e.to_string()))
    }
}
