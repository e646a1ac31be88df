use super::query::{SearchQuery, next_token};
use crate::error::{Error, Result};
use crate::models::catalog::{CatalogItem, SearchResultPage, StacItemCollection};
use crate::traits::CatalogSearch;
use async_trait::async_trait;
use reqwest::Url;
use std::time::Duration;

/// STAC item search over HTTP GET
pub struct StacClient {
    client: reqwest::Client,
    search_url: Url,
    collection: String,
    page_size: u32,
}

impl StacClient {
    pub fn new(
        search_url: &str,
        collection: impl Into<String>,
        page_size: u32,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, Url::parse(search_url)?, collection, page_size))
    }

    pub fn with_client(
        client: reqwest::Client,
        search_url: Url,
        collection: impl Into<String>,
        page_size: u32,
    ) -> Self {
        StacClient {
            client,
            search_url,
            collection: collection.into(),
            page_size,
        }
    }

    pub fn request_url(&self, query: &SearchQuery) -> Url {
        let mut url = self.search_url.clone();
        url.query_pairs_mut()
            .extend_pairs(query.params(&self.collection, self.page_size));
        url
    }
}

#[async_trait]
impl CatalogSearch for StacClient {
    async fn search(&self, query: &SearchQuery) -> Result<SearchResultPage> {
        let url = self.request_url(query);
        tracing::debug!(%url, "searching STAC API");

        let response = self
            .client
            .get(url)
            .header("Accept", "application/geo+json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Status {
                status: response.status(),
            });
        }

        let body = response.bytes().await?;
        let collection: StacItemCollection = serde_json::from_slice(&body)?;

        let continuation_token = next_token(&collection.links, &self.search_url);
        if let Some(token) = &continuation_token {
            tracing::debug!(%token, "next page token");
        }

        Ok(SearchResultPage {
            items: collection
                .features
                .into_iter()
                .map(CatalogItem::from)
                .collect(),
            continuation_token,
        })
    }
}
