use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use refit_core::{Article, ContentApi, Error, PublishedPayload, Result};

#[derive(Default)]
struct MemoryStore {
    articles: Vec<Article>,
    updates: Vec<(u64, PublishedPayload)>,
}

impl MemoryStore {
    fn latest(&self) -> Option<&Article> {
        self.articles.iter().max_by_key(|a| a.id)
    }

    fn update(&mut self, article: &Article, payload: &PublishedPayload) -> Article {
        self.updates.push((article.id, payload.clone()));
        let base = self
            .articles
            .iter()
            .find(|a| a.id == article.id)
            .cloned()
            .unwrap_or_else(|| article.clone());
        let updated = payload.apply_to(&base);
        if let Some(existing) = self.articles.iter_mut().find(|a| a.id == article.id) {
            *existing = updated.clone();
        } else {
            self.articles.push(updated.clone());
        }
        updated
    }
}

/// Content API held in memory, for offline runs and tests. Every update is
/// recorded so callers can inspect what would have been published.
#[derive(Clone, Default)]
pub struct InMemoryContentApi {
    store: Arc<RwLock<MemoryStore>>,
}

impl InMemoryContentApi {
    pub fn new(articles: Vec<Article>) -> Self {
        Self {
            store: Arc::new(RwLock::new(MemoryStore {
                articles,
                updates: Vec::new(),
            })),
        }
    }

    /// Updates received so far, as `(article id, payload)` pairs
    pub async fn updates(&self) -> Vec<(u64, PublishedPayload)> {
        self.store.read().await.updates.clone()
    }
}

#[async_trait]
impl ContentApi for InMemoryContentApi {
    async fn latest_article(&self) -> Result<Article> {
        let store = self.store.read().await;
        store
            .latest()
            .cloned()
            .ok_or_else(|| Error::SourceUnavailable("No articles found".to_string()))
    }

    async fn get_article(&self, id: u64) -> Result<Article> {
        let store = self.store.read().await;
        store
            .articles
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or_else(|| Error::SourceUnavailable(format!("Article {} not found", id)))
    }

    async fn update_article(&self, article: &Article, payload: &PublishedPayload) -> Result<Article> {
        let mut store = self.store.write().await;
        Ok(store.update(article, payload))
    }
}
