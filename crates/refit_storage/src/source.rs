use std::sync::Arc;
use tracing::{info, warn};
use refit_core::{Article, ContentApi, Result};

/// Picks the article a run works on: a configured id, or the latest one.
pub struct SourceFetcher {
    api: Arc<dyn ContentApi>,
    article_id: Option<u64>,
}

impl SourceFetcher {
    pub fn new(api: Arc<dyn ContentApi>, article_id: Option<u64>) -> Self {
        Self { api, article_id }
    }

    pub async fn fetch(&self) -> Result<Article> {
        let article = match self.article_id {
            Some(id) => {
                info!("📥 Fetching article {} from content API...", id);
                self.api.get_article(id).await?
            }
            None => {
                info!("📥 Fetching latest article from content API...");
                self.api.latest_article().await?
            }
        };
        info!("✅ Found article: \"{}\"", article.title);
        if article.body().is_empty() {
            warn!("⚠️ Article {} has neither content nor excerpt", article.id);
        }
        Ok(article)
    }
}
