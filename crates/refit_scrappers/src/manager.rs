use std::sync::Arc;
use refit_core::config::Config;
use refit_core::{Article, Error, PublishedPayload, ReferenceArticle, Result, SearchResult, REQUIRED_REFERENCES};
use refit_inference::{create_chain, RewriteGenerator};
use refit_storage::{create_content_api, Publisher, SourceFetcher};
use crate::extract::ContentExtractor;
use crate::logging::Logger;
use crate::search::{BrowserSearchProvider, GoogleSearchProvider, ReferenceLocator};

const STAGES: usize = 5;

/// What a finished run did, for the final report.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub article_id: u64,
    pub original_title: String,
    pub updated_title: String,
    pub references: Vec<ReferenceArticle>,
    pub content_length: usize,
    pub extraction_failures: usize,
    pub published: bool,
    pub payload: PublishedPayload,
}

/// Runs one article through fetch, search, scrape, rewrite and publish.
pub struct PipelineManager {
    source: SourceFetcher,
    locator: ReferenceLocator,
    extractor: ContentExtractor,
    rewriter: RewriteGenerator,
    publisher: Publisher,
}

impl PipelineManager {
    pub fn new(
        source: SourceFetcher,
        locator: ReferenceLocator,
        extractor: ContentExtractor,
        rewriter: RewriteGenerator,
        publisher: Publisher,
    ) -> Self {
        Self {
            source,
            locator,
            extractor,
            rewriter,
            publisher,
        }
    }

    /// Wires the production components from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let api = create_content_api(&config.content_api)?;
        let primary = Arc::new(GoogleSearchProvider::new(&config.search));
        let fallback = Arc::new(BrowserSearchProvider::new(&config.search, &config.extractor.user_agent));
        let chain = Arc::new(create_chain(&config.inference)?);

        Ok(Self::new(
            SourceFetcher::new(api.clone(), config.content_api.article_id),
            ReferenceLocator::new(primary, Some(fallback)).with_limit(config.search.max_references),
            ContentExtractor::new(config.extractor.clone())?,
            RewriteGenerator::new(chain, &config.inference),
            Publisher::new(api, config.publish.clone()),
        ))
    }

    /// Scrapes the located pages in rank order until enough references are
    /// collected. Pages that fail are logged and skipped.
    pub async fn gather_references(
        &self,
        results: &[SearchResult],
    ) -> Result<([ReferenceArticle; REQUIRED_REFERENCES], usize)> {
        let log = Logger::stage(3, STAGES);
        let mut references = Vec::with_capacity(REQUIRED_REFERENCES);
        let mut failures = 0;

        for result in results {
            if references.len() == REQUIRED_REFERENCES {
                break;
            }
            match self.extractor.extract(&result.url).await {
                Ok(content) => {
                    log.debug(&format!("Scraped {} characters from {}", content.chars().count(), result.url));
                    references.push(ReferenceArticle::from_result(result, content));
                }
                Err(e) => {
                    failures += 1;
                    log.warn(&format!("⚠️ Skipping reference {}: {}", result.url, e));
                }
            }
        }

        let found = references.len();
        let references: [ReferenceArticle; REQUIRED_REFERENCES] = references
            .try_into()
            .map_err(|_| Error::InsufficientReferences {
                found,
                required: REQUIRED_REFERENCES,
            })?;
        Ok((references, failures))
    }

    pub async fn run(&self) -> Result<RunSummary> {
        Logger::new().info("🚀 Starting article update process...");

        let log = Logger::stage(1, STAGES);
        log.info("Fetching source article");
        let original: Article = self.source.fetch().await.map_err(|e| stage_failed(&log, e))?;

        let log = Logger::stage(2, STAGES);
        log.info("Searching for reference articles");
        let results = self
            .locator
            .locate(&original.title)
            .await
            .map_err(|e| stage_failed(&log, e))?;

        let log = Logger::stage(3, STAGES);
        log.info("Scraping reference articles");
        let (references, extraction_failures) = self
            .gather_references(&results)
            .await
            .map_err(|e| stage_failed(&log, e))?;
        if extraction_failures > 0 {
            log.warn(&format!("{} reference page(s) could not be scraped", extraction_failures));
        }

        let log = Logger::stage(4, STAGES);
        log.info("Rewriting article");
        let rewritten = self
            .rewriter
            .rewrite(&original, &references)
            .await
            .map_err(|e| stage_failed(&log, e))?;

        let log = Logger::stage(5, STAGES);
        log.info("Publishing updated article");
        let publication = self
            .publisher
            .publish(&original, &rewritten, &references)
            .await
            .map_err(|e| stage_failed(&log, e))?;

        Logger::new().info("✨ Process completed successfully!");
        let content_length = publication
            .payload
            .full_content
            .as_deref()
            .map(|content| content.chars().count())
            .unwrap_or_default();
        Ok(RunSummary {
            article_id: original.id,
            original_title: original.title,
            updated_title: publication.article.title,
            references: references.to_vec(),
            content_length,
            extraction_failures,
            published: publication.published,
            payload: publication.payload,
        })
    }
}

fn stage_failed(log: &Logger, e: Error) -> Error {
    log.error(&format!("❌ {}", e));
    e
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::{
        extract::{Path, State},
        http::StatusCode,
        routing::{get, put},
        Json, Router,
    };
    use refit_core::config::{ContentApiConfig, ExtractorConfig, InferenceConfig, PublishConfig};
    use refit_core::{GenerationRequest, ResultProvider, TextGenerator};
    use refit_storage::{InMemoryContentApi, LaravelApi};
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use crate::extract::PageSource;

    const REWRITE: &str = "# Best Running Shoes 2024\n\n## Intro\nFresh intro paragraph about shoes.";

    struct FixedResults(Vec<SearchResult>);

    #[async_trait]
    impl ResultProvider for FixedResults {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn search(&self, _query: &str) -> Result<Vec<SearchResult>> {
            Ok(self.0.clone())
        }
    }

    struct StaticPages(HashMap<String, String>);

    #[async_trait]
    impl PageSource for StaticPages {
        async fn fetch_html(&self, url: &str) -> Result<String> {
            self.0
                .get(url)
                .cloned()
                .ok_or_else(|| Error::External(anyhow::anyhow!("connection refused: {}", url)))
        }
    }

    #[derive(Debug, Default)]
    struct CountingModel {
        calls: AtomicUsize,
        prompt: Mutex<Option<String>>,
    }

    #[async_trait]
    impl TextGenerator for CountingModel {
        fn name(&self) -> &str {
            "counting"
        }

        async fn generate(&self, request: &GenerationRequest) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.prompt.lock().unwrap() = Some(request.prompt.clone());
            Ok(REWRITE.to_string())
        }
    }

    fn result(title: &str, url: &str) -> SearchResult {
        SearchResult {
            title: title.to_string(),
            url: url.to_string(),
            snippet: String::new(),
        }
    }

    fn page(text: &str) -> String {
        format!("<html><body><article><h2>{}</h2><p>{} in more detail.</p></article></body></html>", text, text)
    }

    fn article() -> Article {
        Article {
            id: 42,
            title: "Best Running Shoes".to_string(),
            full_content: Some("Old content about shoes.".to_string()),
            content: None,
            excerpt: None,
            author_name: Some("Jane".to_string()),
            image_url: None,
            tags: vec![],
            source_url: None,
        }
    }

    fn manager(
        api: Arc<dyn refit_core::ContentApi>,
        results: Vec<SearchResult>,
        pages: &[(&str, String)],
        model: Arc<CountingModel>,
    ) -> PipelineManager {
        let pages = StaticPages(pages.iter().map(|(u, h)| (u.to_string(), h.clone())).collect());
        PipelineManager::new(
            SourceFetcher::new(api.clone(), None),
            ReferenceLocator::new(Arc::new(FixedResults(results)), None),
            ContentExtractor::with_source(Arc::new(pages), ExtractorConfig::default()),
            RewriteGenerator::new(model, &InferenceConfig::default()),
            Publisher::new(api, PublishConfig::default()),
        )
    }

    #[tokio::test]
    async fn test_run_publishes_rewrite() {
        let api = Arc::new(InMemoryContentApi::new(vec![article()]));
        let model = Arc::new(CountingModel::default());
        let manager = manager(
            api.clone(),
            vec![
                result("Top Shoes 2024", "https://a.com"),
                result("Shoe Guide", "https://b.com"),
            ],
            &[
                ("https://a.com", page("Cushioned trainers")),
                ("https://b.com", page("Trail running picks")),
            ],
            model.clone(),
        );

        let summary = manager.run().await.unwrap();
        assert_eq!(summary.article_id, 42);
        assert_eq!(summary.updated_title, "Best Running Shoes 2024");
        assert!(summary.published);
        assert_eq!(summary.extraction_failures, 0);

        let prompt = model.prompt.lock().unwrap().clone().unwrap();
        let first = prompt.find("Cushioned trainers").unwrap();
        let second = prompt.find("Trail running picks").unwrap();
        assert!(first < second);

        let updates = api.updates().await;
        assert_eq!(updates.len(), 1);
        let (id, payload) = &updates[0];
        assert_eq!(*id, 42);
        assert_eq!(payload.title.as_deref(), Some("Best Running Shoes 2024"));
        assert_eq!(payload.excerpt.as_deref(), Some("Fresh intro paragraph about shoes."));
        let content = payload.full_content.as_deref().unwrap();
        assert!(content.starts_with("## Intro"));
        assert!(content.contains("1. [Top Shoes 2024](https://a.com)"));
        assert!(content.contains("2. [Shoe Guide](https://b.com)"));
        assert_eq!(payload.reference_urls, vec!["https://a.com", "https://b.com"]);
        assert_eq!(summary.content_length, content.chars().count());
        assert!(summary.content_length > REWRITE.chars().count());
    }

    #[tokio::test]
    async fn test_gather_references_skips_failed_page() {
        let api = Arc::new(InMemoryContentApi::new(vec![article()]));
        let model = Arc::new(CountingModel::default());
        let manager = manager(
            api,
            vec![],
            &[("https://a.com", page("First reference")), ("https://b.com", page("Second reference"))],
            model,
        );

        // Only reachable with a locator limit above two.
        let results = vec![
            result("Down", "https://down.com"),
            result("A", "https://a.com"),
            result("B", "https://b.com"),
        ];
        let (references, failures) = manager.gather_references(&results).await.unwrap();
        assert_eq!(failures, 1);
        assert_eq!(references[0].url, "https://a.com");
        assert_eq!(references[1].url, "https://b.com");
    }

    #[tokio::test]
    async fn test_top_ranked_page_failing_is_not_replaced() {
        let api = Arc::new(InMemoryContentApi::new(vec![article()]));
        let model = Arc::new(CountingModel::default());
        let manager = manager(
            api.clone(),
            vec![
                result("Down", "https://down.com"),
                result("A", "https://a.com"),
                result("B", "https://b.com"),
            ],
            &[("https://a.com", page("First reference")), ("https://b.com", page("Second reference"))],
            model.clone(),
        );

        match manager.run().await {
            Err(Error::InsufficientReferences { found, required }) => {
                assert_eq!(found, 1);
                assert_eq!(required, 2);
            }
            other => panic!("expected InsufficientReferences, got {:?}", other),
        }
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
        assert!(api.updates().await.is_empty());
    }

    #[tokio::test]
    async fn test_insufficient_references_stops_before_rewrite() {
        let api = Arc::new(InMemoryContentApi::new(vec![article()]));
        let model = Arc::new(CountingModel::default());
        let manager = manager(
            api.clone(),
            vec![result("A", "https://a.com"), result("Down", "https://down.com")],
            &[("https://a.com", page("Only reference"))],
            model.clone(),
        );

        match manager.run().await {
            Err(Error::InsufficientReferences { found, required }) => {
                assert_eq!(found, 1);
                assert_eq!(required, 2);
            }
            other => panic!("expected InsufficientReferences, got {:?}", other),
        }
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
        assert!(api.updates().await.is_empty());
    }

    #[tokio::test]
    async fn test_deny_listed_results_abort_before_rewrite() {
        let api = Arc::new(InMemoryContentApi::new(vec![article()]));
        let model = Arc::new(CountingModel::default());
        let manager = manager(
            api.clone(),
            vec![
                result("Video", "https://www.youtube.com/watch?v=1"),
                result("Thread", "https://reddit.com/r/running"),
            ],
            &[],
            model.clone(),
        );

        assert!(matches!(manager.run().await, Err(Error::NoReferencesFound(_))));
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
        assert!(api.updates().await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_source_article() {
        let api = Arc::new(InMemoryContentApi::default());
        let model = Arc::new(CountingModel::default());
        let manager = manager(api, vec![], &[], model);
        assert!(matches!(manager.run().await, Err(Error::SourceUnavailable(_))));
    }

    #[derive(Clone, Default)]
    struct Recorded {
        puts: Arc<Mutex<Vec<(u64, Value)>>>,
    }

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/api", addr)
    }

    #[tokio::test]
    async fn test_run_against_http_content_api() {
        let recorded = Recorded::default();
        let app = Router::new()
            .route(
                "/api/articles",
                get(|| async {
                    Json(json!({
                        "success": true,
                        "articles": [{
                            "id": 42,
                            "title": "Best Running Shoes",
                            "content": "Old content about shoes.",
                            "author_name": "Jane"
                        }]
                    }))
                }),
            )
            .route(
                "/api/updateArticle/:id",
                put(|State(recorded): State<Recorded>, Path(id): Path<u64>, Json(body): Json<Value>| async move {
                    recorded.puts.lock().unwrap().push((id, body));
                    (StatusCode::OK, Json(json!({ "success": true })))
                }),
            )
            .with_state(recorded.clone());
        let base_url = serve(app).await;

        let api: Arc<dyn refit_core::ContentApi> = Arc::new(
            LaravelApi::new(&ContentApiConfig {
                base_url,
                ..Default::default()
            })
            .unwrap(),
        );
        let manager = manager(
            api,
            vec![result("Top Shoes 2024", "https://a.com"), result("Shoe Guide", "https://b.com")],
            &[("https://a.com", page("Cushioned trainers")), ("https://b.com", page("Trail running picks"))],
            Arc::new(CountingModel::default()),
        );

        let summary = manager.run().await.unwrap();
        assert!(summary.published);
        assert_eq!(summary.updated_title, "Best Running Shoes 2024");

        let puts = recorded.puts.lock().unwrap().clone();
        assert_eq!(puts.len(), 1);
        let (id, body) = &puts[0];
        assert_eq!(*id, 42);
        assert_eq!(body["title"], "Best Running Shoes 2024");
        assert_eq!(body["is_optimized"], true);
        assert!(body["full_content"].as_str().unwrap().contains("## References"));
        assert_eq!(body["author_name"], "Jane");
    }
}
