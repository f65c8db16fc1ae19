use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt;
use refit_core::config::SearchConfig;
use refit_core::types::non_blank;
use refit_core::{Error, ResultProvider, Result, SearchResult};

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<Item>,
}

#[derive(Deserialize)]
struct Item {
    #[serde(default)]
    title: String,
    link: String,
    #[serde(default)]
    snippet: String,
}

/// Google Custom Search JSON API.
pub struct GoogleSearchProvider {
    client: Client,
    api_key: Option<String>,
    engine_id: Option<String>,
    endpoint: String,
    num: usize,
}

impl fmt::Debug for GoogleSearchProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleSearchProvider")
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("engine_id", &self.engine_id)
            .field("endpoint", &self.endpoint)
            .field("num", &self.num)
            .finish()
    }
}

impl GoogleSearchProvider {
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: non_blank(config.api_key.as_deref()).map(str::to_string),
            engine_id: non_blank(config.engine_id.as_deref()).map(str::to_string),
            endpoint: config.endpoint.clone(),
            // the API caps a single page at 10 results
            num: config.raw_results.clamp(1, 10),
        }
    }
}

#[async_trait]
impl ResultProvider for GoogleSearchProvider {
    fn name(&self) -> &str {
        "Google Custom Search"
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let (key, cx) = match (&self.api_key, &self.engine_id) {
            (Some(key), Some(cx)) => (key, cx),
            _ => {
                return Err(Error::SearchProvider(
                    "GOOGLE_API_KEY and GOOGLE_SEARCH_ENGINE_ID are required".to_string(),
                ))
            }
        };

        let num = self.num.to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("key", key.as_str()), ("cx", cx.as_str()), ("q", query), ("num", num.as_str())])
            .send()
            .await
            .map_err(|e| Error::SearchProvider(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::SearchProvider(e.to_string()))?;
        if !status.is_success() {
            return Err(Error::SearchProvider(format!("HTTP {}: {}", status.as_u16(), body)));
        }

        let parsed: SearchResponse = serde_json::from_str(&body)
            .map_err(|e| Error::SearchProvider(format!("Malformed search response: {}", e)))?;
        if parsed.items.is_empty() {
            return Err(Error::SearchProvider("No search results found".to_string()));
        }

        Ok(parsed
            .items
            .into_iter()
            .map(|item| SearchResult {
                title: item.title,
                url: item.link,
                snippet: item.snippet,
            })
            .collect())
    }
}
