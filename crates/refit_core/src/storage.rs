use async_trait::async_trait;
use crate::types::{Article, PublishedPayload};
use crate::Result;

#[async_trait]
pub trait ContentApi: Send + Sync {
    /// Fetch the most recent article
    async fn latest_article(&self) -> Result<Article>;

    /// Fetch a single article by id
    async fn get_article(&self, id: u64) -> Result<Article>;

    /// Apply a sparse update to `article` (keyed by its id) and return the
    /// stored record
    async fn update_article(&self, article: &Article, payload: &PublishedPayload) -> Result<Article>;
}
