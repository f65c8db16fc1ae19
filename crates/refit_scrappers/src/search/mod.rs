use std::sync::Arc;
use tracing::{info, warn};
use refit_core::{Error, ResultProvider, Result, SearchResult, REQUIRED_REFERENCES};

pub mod browser;
pub mod google;

pub use browser::BrowserSearchProvider;
pub use google::GoogleSearchProvider;

/// URL fragments that never make a useful reference page.
pub const DEFAULT_DENY_PATTERNS: &[&str] = &[
    "youtube.com",
    "facebook.com",
    "twitter.com",
    "instagram.com",
    "linkedin.com",
    "reddit.com",
    "pinterest.com",
    ".pdf",
    "/video/",
    "/watch",
];

/// Case-insensitive substring filter over result URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenyList {
    patterns: Vec<String>,
}

impl Default for DenyList {
    fn default() -> Self {
        Self::new(DEFAULT_DENY_PATTERNS.iter().copied())
    }
}

impl DenyList {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            patterns: patterns
                .into_iter()
                .map(|p| p.as_ref().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_denied(&self, url: &str) -> bool {
        let url = url.to_lowercase();
        self.patterns.iter().any(|p| url.contains(p.as_str()))
    }

    /// Keeps results whose URL passes the list, preserving rank, up to `limit`.
    pub fn filter(&self, results: Vec<SearchResult>, limit: usize) -> Vec<SearchResult> {
        results
            .into_iter()
            .filter(|r| !self.is_denied(&r.url))
            .take(limit)
            .collect()
    }
}

/// Finds the top-ranking reference pages for an article title.
///
/// The primary provider is asked first. The fallback is only used when the
/// primary fails outright; an answered query that filters down to nothing
/// ends the search.
pub struct ReferenceLocator {
    primary: Arc<dyn ResultProvider>,
    fallback: Option<Arc<dyn ResultProvider>>,
    deny_list: DenyList,
    fallback_deny_list: DenyList,
    limit: usize,
}

impl ReferenceLocator {
    pub fn new(primary: Arc<dyn ResultProvider>, fallback: Option<Arc<dyn ResultProvider>>) -> Self {
        Self {
            primary,
            fallback,
            deny_list: DenyList::default(),
            fallback_deny_list: DenyList::default(),
            limit: REQUIRED_REFERENCES,
        }
    }

    pub fn with_deny_list(mut self, deny_list: DenyList) -> Self {
        self.deny_list = deny_list;
        self
    }

    pub fn with_fallback_deny_list(mut self, deny_list: DenyList) -> Self {
        self.fallback_deny_list = deny_list;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub async fn locate(&self, query: &str) -> Result<Vec<SearchResult>> {
        info!("🔍 Searching for: \"{}\"", query);

        let results = match self.primary.search(query).await {
            Ok(raw) => self.deny_list.filter(raw, self.limit),
            Err(e) => {
                warn!("⚠️ {} failed: {}", self.primary.name(), e);
                self.locate_fallback(query).await?
            }
        };

        if results.is_empty() {
            return Err(Error::NoReferencesFound(query.to_string()));
        }
        if results.len() < self.limit {
            warn!(
                "⚠️ Only {} of {} reference links found",
                results.len(),
                self.limit
            );
        }

        info!("✅ Found {} article links", results.len());
        for (i, result) in results.iter().enumerate() {
            info!("   {}. {}", i + 1, result.title);
            info!("      {}", result.url);
        }
        Ok(results)
    }

    async fn locate_fallback(&self, query: &str) -> Result<Vec<SearchResult>> {
        let fallback = match &self.fallback {
            Some(fallback) => fallback,
            None => return Err(Error::NoReferencesFound(query.to_string())),
        };

        info!("🔄 Trying fallback method with {}...", fallback.name());
        match fallback.search(query).await {
            Ok(raw) => Ok(self.fallback_deny_list.filter(raw, self.limit)),
            Err(e) => {
                warn!("⚠️ {} failed: {}", fallback.name(), e);
                Err(Error::NoReferencesFound(query.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeProvider {
        results: Option<Vec<SearchResult>>,
        calls: AtomicUsize,
    }

    impl FakeProvider {
        fn answering(urls: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                results: Some(
                    urls.iter()
                        .enumerate()
                        .map(|(i, url)| SearchResult {
                            title: format!("Result {}", i + 1),
                            url: url.to_string(),
                            snippet: String::new(),
                        })
                        .collect(),
                ),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                results: None,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ResultProvider for FakeProvider {
        fn name(&self) -> &str {
            "fake"
        }

        async fn search(&self, _query: &str) -> Result<Vec<SearchResult>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.results
                .clone()
                .ok_or_else(|| Error::SearchProvider("quota exceeded".to_string()))
        }
    }

    #[test]
    fn test_deny_list_is_case_insensitive() {
        let deny = DenyList::default();
        assert!(deny.is_denied("https://www.YouTube.com/watch?v=1"));
        assert!(deny.is_denied("https://example.com/guide.PDF"));
        assert!(deny.is_denied("https://news.com/video/clip"));
        assert!(!deny.is_denied("https://runnersworld.com/gear"));
    }

    #[test]
    fn test_filter_keeps_rank_and_limit() {
        let deny = DenyList::default();
        let results = vec![
            SearchResult { title: "a".into(), url: "https://youtube.com/x".into(), snippet: String::new() },
            SearchResult { title: "b".into(), url: "https://b.com".into(), snippet: String::new() },
            SearchResult { title: "c".into(), url: "https://c.com".into(), snippet: String::new() },
            SearchResult { title: "d".into(), url: "https://d.com".into(), snippet: String::new() },
        ];
        let kept: Vec<_> = deny.filter(results, 2).into_iter().map(|r| r.title).collect();
        assert_eq!(kept, vec!["b", "c"]);
    }

    #[test]
    fn test_custom_deny_list() {
        let deny = DenyList::new(["Medium.com", ""]);
        assert_eq!(deny.patterns(), &["medium.com".to_string()]);
        assert!(deny.is_denied("https://medium.com/@x/post"));
        assert!(!deny.is_denied("https://youtube.com"));
    }

    #[tokio::test]
    async fn test_primary_results_filtered() {
        let primary = FakeProvider::answering(&[
            "https://www.youtube.com/watch?v=1",
            "https://a.com/shoes",
            "https://reddit.com/r/running",
            "https://b.com/guide",
            "https://c.com/more",
        ]);
        let fallback = FakeProvider::failing();
        let locator = ReferenceLocator::new(primary.clone(), Some(fallback.clone()));

        let results = locator.locate("Best Running Shoes").await.unwrap();
        let urls: Vec<_> = results.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, vec!["https://a.com/shoes", "https://b.com/guide"]);
        assert_eq!(fallback.calls(), 0);
    }

    #[tokio::test]
    async fn test_fallback_used_when_primary_fails() {
        let primary = FakeProvider::failing();
        let fallback = FakeProvider::answering(&["https://x.com/1", "https://y.com/2"]);
        let locator = ReferenceLocator::new(primary.clone(), Some(fallback.clone()));

        let results = locator.locate("query").await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(primary.calls(), 1);
        assert_eq!(fallback.calls(), 1);
    }

    #[tokio::test]
    async fn test_only_denied_results_is_not_found() {
        let primary = FakeProvider::answering(&["https://youtube.com/a", "https://facebook.com/b"]);
        let fallback = FakeProvider::answering(&["https://x.com/1"]);
        let locator = ReferenceLocator::new(primary, Some(fallback.clone()));

        assert!(matches!(
            locator.locate("query").await,
            Err(Error::NoReferencesFound(_))
        ));
        assert_eq!(fallback.calls(), 0);
    }

    #[tokio::test]
    async fn test_both_providers_failing() {
        let locator = ReferenceLocator::new(FakeProvider::failing(), Some(FakeProvider::failing()));
        assert!(matches!(
            locator.locate("query").await,
            Err(Error::NoReferencesFound(_))
        ));

        let locator = ReferenceLocator::new(FakeProvider::failing(), None);
        assert!(matches!(
            locator.locate("query").await,
            Err(Error::NoReferencesFound(_))
        ));
    }

    #[tokio::test]
    async fn test_fallback_deny_list_is_separate() {
        let fallback = FakeProvider::answering(&["https://medium.com/p", "https://youtube.com/v"]);
        let locator = ReferenceLocator::new(FakeProvider::failing(), Some(fallback))
            .with_fallback_deny_list(DenyList::new(["medium.com"]));

        let results = locator.locate("query").await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].url, "https://youtube.com/v");
    }

    #[tokio::test]
    async fn test_single_survivor_is_returned() {
        let locator = ReferenceLocator::new(FakeProvider::answering(&["https://only.com"]), None);
        let results = locator.locate("query").await.unwrap();
        assert_eq!(results.len(), 1);
    }
}
