use anyhow::{Context, Result};
use reqwest::blocking::Client;
use std::time::Duration;

use crate::models::SearchPage;

// Thin blocking client for the Algolia Hacker News search API. The app
// calls this from a background thread, never from the UI thread.
#[derive(Clone)]
pub struct AlgoliaClient {
    client: Client,
}

impl AlgoliaClient {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("hacker-stories/0.1 (desktop search client)")
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }

    pub fn fetch(&self, url: &str) -> Result<SearchPage> {
        let response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("request to {url} failed"))?
            .error_for_status()?;

        let mut page: SearchPage = response
            .json()
            .with_context(|| format!("could not decode response from {url}"))?;

        // Malformed hits without an id cannot be keyed or dismissed
        page.hits.retain(|hit| !hit.id.is_empty());

        Ok(page)
    }
}

impl Default for AlgoliaClient {
    fn default() -> Self {
        Self::new()
    }
}
