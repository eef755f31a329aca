use std::time::Duration;

use reqwest::Client;

use super::parser::{MndParser, TotalCountParser};
use super::MndError;
use crate::config::MndConfig;

/// Fetches menu data in two round trips: a one-row request for the total row count,
/// then one request for rows `1..=count`. The API has no "fetch all" mode.
#[derive(Clone)]
pub struct MndApi {
    client: Client,
    base_url: String,
}

impl MndApi {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, MndError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &MndConfig) -> Result<Self, MndError> {
        Self::new(config.base_url.clone(), config.timeout)
    }

    pub async fn parse<P: MndParser>(&self, parser: &P) -> Result<P::Output, MndError> {
        let first = self.request(1).await?;
        let total = TotalCountParser.parse(&first)?;
        tracing::info!("MND API reports {} rows", total);

        // The first request already covers [1, total] when there is at most one row.
        if total <= 1 {
            return parser.parse(&first);
        }
        parser.parse(&self.request(total).await?)
    }

    pub async fn total_count(&self) -> Result<u32, MndError> {
        TotalCountParser.parse(&self.request(1).await?)
    }

    async fn request(&self, end_index: u32) -> Result<String, MndError> {
        let url = format!("{}/1/{}", self.base_url, end_index);
        let body = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(body)
    }
}
