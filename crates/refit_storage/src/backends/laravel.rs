use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use tracing::{debug, warn};
use url::Url;
use refit_core::config::{ContentApiConfig, UpdateRoute};
use refit_core::{Article, ContentApi, Error, PublishedPayload, Result};

/// `{ success, articles|data|article, message }` as returned by the content API.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    articles: Option<ArticleData>,
    #[serde(default)]
    data: Option<ArticleData>,
    #[serde(default)]
    article: Option<Article>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ArticleData {
    Many(Vec<Article>),
    Paginated { data: Vec<Article> },
    One(Article),
}

impl ArticleData {
    fn into_vec(self) -> Vec<Article> {
        match self {
            ArticleData::Many(articles) => articles,
            ArticleData::Paginated { data } => data,
            ArticleData::One(article) => vec![article],
        }
    }
}

impl Envelope {
    fn into_articles(self) -> Vec<Article> {
        if let Some(article) = self.article {
            return vec![article];
        }
        self.articles
            .or(self.data)
            .map(ArticleData::into_vec)
            .unwrap_or_default()
    }

    fn failure_reason(&self) -> String {
        self.message
            .clone()
            .unwrap_or_else(|| "API returned unsuccessful response".to_string())
    }
}

/// REST client for the Laravel content API.
pub struct LaravelApi {
    client: Client,
    base_url: String,
    update_route: UpdateRoute,
}

impl fmt::Debug for LaravelApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LaravelApi")
            .field("client", &"<reqwest::Client>")
            .field("base_url", &self.base_url)
            .field("update_route", &self.update_route)
            .finish()
    }
}

impl LaravelApi {
    pub fn new(config: &ContentApiConfig) -> Result<Self> {
        Url::parse(&config.base_url)?;
        Ok(Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            update_route: config.update_route,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn fetch_envelope(&self, path: &str, query: &[(&str, &str)]) -> Result<Envelope> {
        let url = self.endpoint(path);
        debug!("GET {}", url);
        let response = self.client.get(&url).query(query).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(Error::SourceUnavailable(format!("HTTP {} from {}: {}", status.as_u16(), url, body)));
        }
        serde_json::from_str(&body)
            .map_err(|e| Error::SourceUnavailable(format!("Malformed response from {}: {}", url, e)))
    }
}

fn rejected(status: StatusCode, body: String) -> Error {
    Error::PublishRejected {
        status: Some(status.as_u16()),
        body,
    }
}

#[async_trait]
impl ContentApi for LaravelApi {
    async fn latest_article(&self) -> Result<Article> {
        let envelope = self.fetch_envelope("articles", &[("per_page", "1")]).await?;
        if !envelope.success {
            return Err(Error::SourceUnavailable(envelope.failure_reason()));
        }
        envelope
            .into_articles()
            .into_iter()
            .next()
            .ok_or_else(|| Error::SourceUnavailable("No articles found".to_string()))
    }

    async fn get_article(&self, id: u64) -> Result<Article> {
        let envelope = self.fetch_envelope(&format!("articles/{}", id), &[]).await?;
        if !envelope.success {
            return Err(Error::SourceUnavailable(envelope.failure_reason()));
        }
        envelope
            .into_articles()
            .into_iter()
            .next()
            .ok_or_else(|| Error::SourceUnavailable(format!("Article {} not found", id)))
    }

    async fn update_article(&self, article: &Article, payload: &PublishedPayload) -> Result<Article> {
        let url = self.endpoint(&self.update_route.path(article.id));
        debug!("PUT {}", url);
        let response = self.client.put(&url).json(payload).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(rejected(status, body));
        }

        let value: Value = match serde_json::from_str(&body) {
            Ok(value) => value,
            Err(_) => return Err(rejected(status, body)),
        };
        if value.get("success").and_then(Value::as_bool) != Some(true) {
            return Err(rejected(status, body));
        }

        // Already applied server side; an unreadable echo falls back to the payload.
        let echoed = match serde_json::from_value::<Envelope>(value) {
            Ok(envelope) => envelope.into_articles().into_iter().next(),
            Err(e) => {
                warn!("⚠️ Could not read updated article {}: {}", article.id, e);
                None
            }
        };
        Ok(echoed.unwrap_or_else(|| payload.apply_to(article)))
    }
}
