use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_CONTENT_API_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";
pub const DEFAULT_FALLBACK_SEARCH_URL: &str = "https://www.google.com/search";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODELS: &[&str] = &["gpt-4-turbo-preview", "gpt-4o-mini", "gpt-3.5-turbo"];
pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Process-wide settings, built once at start and handed to each component.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub content_api: ContentApiConfig,
    pub search: SearchConfig,
    pub inference: InferenceConfig,
    pub extractor: ExtractorConfig,
    pub publish: PublishConfig,
}

/// Which update endpoint the content API exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateRoute {
    /// `PUT /updateArticle/{id}`
    #[default]
    UpdateArticle,
    /// `PUT /articles/{id}`
    Articles,
}

impl UpdateRoute {
    pub fn path(&self, id: u64) -> String {
        match self {
            UpdateRoute::UpdateArticle => format!("updateArticle/{}", id),
            UpdateRoute::Articles => format!("articles/{}", id),
        }
    }
}

impl FromStr for UpdateRoute {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "update-article" | "updatearticle" => Ok(UpdateRoute::UpdateArticle),
            "articles" => Ok(UpdateRoute::Articles),
            other => Err(format!("Unknown update route: {} (expected update-article or articles)", other)),
        }
    }
}

impl fmt::Display for UpdateRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateRoute::UpdateArticle => write!(f, "update-article"),
            UpdateRoute::Articles => write!(f, "articles"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ContentApiConfig {
    pub base_url: String,
    pub update_route: UpdateRoute,
    /// Process this article instead of the latest one
    pub article_id: Option<u64>,
}

impl Default for ContentApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_CONTENT_API_URL.to_string(),
            update_route: UpdateRoute::default(),
            article_id: None,
        }
    }
}

#[derive(Clone)]
pub struct SearchConfig {
    pub api_key: Option<String>,
    pub engine_id: Option<String>,
    pub endpoint: String,
    pub fallback_url: String,
    /// Raw results requested from the provider before filtering
    pub raw_results: usize,
    pub max_references: usize,
    /// Chromium binary for the fallback search; auto-detected when unset
    pub browser_executable: Option<PathBuf>,
}

impl fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchConfig")
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("engine_id", &self.engine_id)
            .field("endpoint", &self.endpoint)
            .field("fallback_url", &self.fallback_url)
            .field("raw_results", &self.raw_results)
            .field("max_references", &self.max_references)
            .field("browser_executable", &self.browser_executable)
            .finish()
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            engine_id: None,
            endpoint: DEFAULT_SEARCH_ENDPOINT.to_string(),
            fallback_url: DEFAULT_FALLBACK_SEARCH_URL.to_string(),
            raw_results: 10,
            max_references: crate::REQUIRED_REFERENCES,
            browser_executable: None,
        }
    }
}

#[derive(Clone)]
pub struct InferenceConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    /// Candidate models, tried in order until one answers
    pub models: Vec<String>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl fmt::Debug for InferenceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InferenceConfig")
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("models", &self.models)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            models: DEFAULT_MODELS.iter().map(|m| m.to_string()).collect(),
            temperature: 0.7,
            max_tokens: 4000,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub timeout: Duration,
    pub user_agent: String,
    pub max_chars: usize,
    /// A container is accepted once its converted text reaches this length
    pub min_container_chars: usize,
    /// Blocks whose trimmed text is shorter than this are dropped
    pub min_block_chars: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: BROWSER_USER_AGENT.to_string(),
            max_chars: 8000,
            min_container_chars: 500,
            min_block_chars: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PublishConfig {
    pub excerpt_length: usize,
    /// Build the payload but skip the update call
    pub dry_run: bool,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            excerpt_length: 200,
            dry_run: false,
        }
    }
}
