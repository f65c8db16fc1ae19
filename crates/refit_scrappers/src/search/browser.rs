use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Selector};
use std::path::PathBuf;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;
use refit_core::config::SearchConfig;
use refit_core::{Error, ResultProvider, Result, SearchResult};

lazy_static! {
    static ref RESULT_BLOCK: Selector = Selector::parse("div.g").unwrap();
    static ref RESULT_TITLE: Selector = Selector::parse("h3").unwrap();
    static ref RESULT_LINK: Selector = Selector::parse("a[href]").unwrap();
    static ref RESULT_SNIPPET: Selector = Selector::parse(".VwiC3b").unwrap();
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Absolute http(s) target of a result link. Redirect links (`/url?q=...`)
/// resolve to the page they point at.
pub fn resolve_result_link(base: &Url, href: &str) -> Option<String> {
    let mut url = base.join(href).ok()?;
    if url.path() == "/url" {
        let target = url
            .query_pairs()
            .find(|(k, _)| k == "q" || k == "url")
            .map(|(_, v)| v.into_owned())?;
        url = Url::parse(&target).ok()?;
    }
    match url.scheme() {
        "http" | "https" => Some(url.to_string()),
        _ => None,
    }
}

/// Organic results of a rendered search page: title, link and snippet of the
/// first `max_results` result blocks. Blocks without a title or link are
/// skipped.
pub fn parse_result_page(html: &str, base: &Url, max_results: usize) -> Vec<SearchResult> {
    let document = Html::parse_document(html);
    document
        .select(&RESULT_BLOCK)
        .take(max_results)
        .filter_map(|block| {
            let title = block.select(&RESULT_TITLE).next().map(text_of)?;
            let href = block.select(&RESULT_LINK).next()?.value().attr("href")?;
            let url = resolve_result_link(base, href)?;
            if title.is_empty() {
                return None;
            }
            let snippet = block.select(&RESULT_SNIPPET).next().map(text_of).unwrap_or_default();
            Some(SearchResult { title, url, snippet })
        })
        .collect()
}

/// Renders the public search results page in headless Chromium and scrapes it.
#[derive(Debug, Clone)]
pub struct BrowserSearchProvider {
    search_url: String,
    user_agent: String,
    executable: Option<PathBuf>,
    max_results: usize,
}

impl BrowserSearchProvider {
    pub fn new(config: &SearchConfig, user_agent: &str) -> Self {
        Self {
            search_url: config.fallback_url.clone(),
            user_agent: user_agent.to_string(),
            executable: config.browser_executable.clone(),
            max_results: config.raw_results,
        }
    }

    fn browser_config(&self) -> Result<BrowserConfig> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .arg("--disable-setuid-sandbox")
            .arg("--disable-dev-shm-usage");
        if let Some(executable) = &self.executable {
            builder = builder.chrome_executable(executable);
        }
        builder.build().map_err(Error::Browser)
    }

    async fn render(&self, url: &str) -> Result<String> {
        let session = ChromiumSession::launch(self.browser_config()?).await?;
        render_in(session, url, &self.user_agent).await
    }
}

/// A running browser that can render pages and must be shut down after use.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    async fn load(&self, url: &str, user_agent: &str) -> Result<String>;

    async fn shutdown(&mut self);
}

/// Renders `url` in `session`, then shuts the session down whether or not the
/// page loaded.
pub async fn render_in<S: BrowserSession>(mut session: S, url: &str, user_agent: &str) -> Result<String> {
    let rendered = session.load(url, user_agent).await;
    session.shutdown().await;
    rendered
}

/// Headless Chromium with its CDP handler loop running on a task.
pub struct ChromiumSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
}

impl ChromiumSession {
    pub async fn launch(config: BrowserConfig) -> Result<Self> {
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| Error::Browser(format!("Failed to launch browser: {}", e)))?;
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });
        Ok(Self { browser, handler_task })
    }
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn load(&self, url: &str, user_agent: &str) -> Result<String> {
        let browser_error = |e: chromiumoxide::error::CdpError| Error::Browser(e.to_string());

        let page = self.browser.new_page("about:blank").await.map_err(browser_error)?;
        page.set_user_agent(SetUserAgentOverrideParams::new(user_agent))
            .await
            .map_err(browser_error)?;
        page.goto(url).await.map_err(browser_error)?;
        page.wait_for_navigation().await.map_err(browser_error)?;
        page.content().await.map_err(browser_error)
    }

    async fn shutdown(&mut self) {
        if let Err(e) = self.browser.close().await {
            warn!("⚠️ Failed to close browser: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            debug!("Browser process did not exit cleanly: {}", e);
        }
        self.handler_task.abort();
    }
}

#[async_trait]
impl ResultProvider for BrowserSearchProvider {
    fn name(&self) -> &str {
        "headless browser"
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let url = Url::parse_with_params(&self.search_url, &[("q", query)])?;
        info!("🌐 Loading {}", url);
        let html = self.render(url.as_str()).await?;
        let results = parse_result_page(&html, &url, self.max_results);
        debug!("Parsed {} results from rendered page", results.len());
        Ok(results)
    }
}
