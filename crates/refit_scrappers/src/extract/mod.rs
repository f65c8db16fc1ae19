use async_trait::async_trait;
use reqwest::Client;
use std::fmt;
use std::sync::Arc;
use tracing::{error, info};
use url::Url;
use refit_core::config::ExtractorConfig;
use refit_core::{Error, Result};

pub mod document;
pub mod markdown;

pub use document::{Block, BlockKind, Document, ScraperDocument};
pub use markdown::extract_structured_text;

/// Where page HTML comes from.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_html(&self, url: &str) -> Result<String>;
}

/// Plain HTTP fetch with a browser user agent and a request timeout.
pub struct HttpPageSource {
    client: Client,
}

impl HttpPageSource {
    pub fn new(config: &ExtractorConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self { client })
    }
}

impl fmt::Debug for HttpPageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpPageSource")
            .field("client", &"<reqwest::Client>")
            .finish()
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch_html(&self, url: &str) -> Result<String> {
        let url = Url::parse(url)?;
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}

/// Structured text of an already fetched page.
pub fn extract_from_html(html: &str, config: &ExtractorConfig) -> String {
    let document = ScraperDocument::parse(html);
    extract_structured_text(&document, config)
}

pub struct ContentExtractor {
    source: Arc<dyn PageSource>,
    config: ExtractorConfig,
}

impl ContentExtractor {
    pub fn new(config: ExtractorConfig) -> Result<Self> {
        let source = Arc::new(HttpPageSource::new(&config)?);
        Ok(Self::with_source(source, config))
    }

    pub fn with_source(source: Arc<dyn PageSource>, config: ExtractorConfig) -> Self {
        Self { source, config }
    }

    /// Fetches `url` and returns its structured text. Every failure, including
    /// a page with no readable text, is an `ExtractionFailed`.
    pub async fn extract(&self, url: &str) -> Result<String> {
        info!("📄 Scraping content from: {}", url);
        let html = match self.source.fetch_html(url).await {
            Ok(html) => html,
            Err(e) => {
                error!("❌ Error scraping {}: {}", url, e);
                return Err(Error::extraction(url, e));
            }
        };

        let content = extract_from_html(&html, &self.config);
        if content.is_empty() {
            error!("❌ No readable content at {}", url);
            return Err(Error::extraction(url, "no readable content"));
        }

        info!("✅ Scraped {} characters (markdown format)", content.chars().count());
        Ok(content)
    }
}
