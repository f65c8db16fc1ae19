use std::sync::Arc;
use refit_core::config::ContentApiConfig;
use refit_core::{ContentApi, Result};

pub mod backends;
pub mod publisher;
pub mod source;

pub use backends::*;
pub use publisher::{Publication, Publisher};
pub use source::SourceFetcher;

/// Builds the content API client for a base URL; `memory://` selects the
/// in-memory backend.
pub fn create_content_api(config: &ContentApiConfig) -> Result<Arc<dyn ContentApi>> {
    if config.base_url.starts_with("memory://") {
        return Ok(Arc::new(InMemoryContentApi::default()));
    }
    Ok(Arc::new(LaravelApi::new(config)?))
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::{create_content_api, Publication, Publisher, SourceFetcher};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_memory_content_api() {
        let config = ContentApiConfig {
            base_url: "memory://".to_string(),
            ..Default::default()
        };
        let api = create_content_api(&config).unwrap();
        assert!(api.latest_article().await.is_err());
    }

    #[test]
    fn test_create_laravel_content_api() {
        assert!(create_content_api(&ContentApiConfig::default()).is_ok());
    }
}
