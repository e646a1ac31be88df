use crate::catalog::query::SearchQuery;
use crate::error::Result;
use crate::models::catalog::SearchResultPage;
use async_trait::async_trait;

#[async_trait]
pub trait CatalogSearch: Send + Sync {
    /// Fetch one page of items. A single attempt: failures are returned to the
    /// caller as is.
    async fn search(&self, query: &SearchQuery) -> Result<SearchResultPage>;
}
