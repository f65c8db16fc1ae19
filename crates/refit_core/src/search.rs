use async_trait::async_trait;
use crate::types::SearchResult;
use crate::Result;

#[async_trait]
pub trait ResultProvider: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Raw results for a query, in provider-ranked order
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>>;
}
