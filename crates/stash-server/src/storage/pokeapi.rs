//! PokéAPI upstream, used as the pokemon system of record

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use stash_core::{PokemonName, Source, StoreError};
use std::time::Duration;

pub struct PokeApi {
    client: Client,
    base_url: Url,
}

impl PokeApi {
    /// `base_url` is the collection URL; the pokemon name is appended as the
    /// last path segment.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid PokéAPI base URL: {}", base_url))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("PokéAPI base URL cannot have path segments: {}", base_url);
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client, base_url })
    }

    fn url_for(&self, name: &PokemonName) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(name.as_str());
        }
        url
    }
}

#[async_trait]
impl Source for PokeApi {
    type Key = PokemonName;
    type Entity = Value;

    async fn load(&self, name: &PokemonName) -> Result<Option<Value>, StoreError> {
        let url = self.url_for(name);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| StoreError::Upstream(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(StoreError::Upstream(format!("{} returned {}", url, status)));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| StoreError::Upstream(e.to_string()))?;
        Ok(Some(serde_json::from_slice(&body)?))
    }
}
