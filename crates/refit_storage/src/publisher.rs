use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use std::sync::Arc;
use tracing::{error, info};
use refit_core::config::PublishConfig;
use refit_core::types::non_blank;
use refit_core::{Article, ContentApi, Error, PublishedPayload, ReferenceArticle, Result};

pub const DEFAULT_TITLE: &str = "Updated Article";

lazy_static! {
    static ref TITLE_RE: Regex = Regex::new(r"(?m)^#[ \t]+(.+)$").unwrap();
}

/// Text of the first `# Title` line, if any.
pub fn extract_title(markdown: &str) -> Option<String> {
    TITLE_RE
        .captures(markdown)
        .map(|caps| caps[1].trim().to_string())
        .filter(|title| !title.is_empty())
}

/// Removes the first `# Title` line and trims the remainder.
pub fn strip_title(markdown: &str) -> String {
    TITLE_RE.replacen(markdown, 1, "").trim().to_string()
}

/// Appends the references block. Not idempotent: a second call stacks a
/// second block.
pub fn append_references(content: &str, references: &[ReferenceArticle], generated_at: DateTime<Utc>) -> String {
    let links = references
        .iter()
        .enumerate()
        .map(|(i, r)| format!("{}. [{}]({})", i + 1, r.title, r.url))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{}\n\n---\n\n## References\n\nThis article was optimized based on analysis of top-ranking content:\n\n{}\n\n*Last updated: {}*\n",
        content,
        links,
        generated_at.format("%Y-%m-%d")
    )
}

fn is_thematic_break(line: &str) -> bool {
    line.len() >= 3 && (line.chars().all(|c| c == '-') || line.chars().all(|c| c == '*') || line.chars().all(|c| c == '_'))
}

/// First non-empty line that is not a heading, cut to `max_chars` characters.
pub fn derive_excerpt(content: &str, max_chars: usize) -> Option<String> {
    content
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#') && !is_thematic_break(line))
        .map(|line| line.chars().take(max_chars).collect::<String>().trim_end().to_string())
        .filter(|excerpt| !excerpt.is_empty())
}

/// Builds the sparse update for a rewritten article.
pub fn build_payload(
    original: &Article,
    rewritten: &str,
    references: &[ReferenceArticle],
    excerpt_length: usize,
    now: DateTime<Utc>,
) -> PublishedPayload {
    let title = extract_title(rewritten)
        .or_else(|| non_blank(Some(original.title.as_str())).map(str::to_string))
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());
    let body = strip_title(rewritten);
    let full_content = append_references(&body, references, now);
    let excerpt = derive_excerpt(&full_content, excerpt_length);

    PublishedPayload {
        title: Some(title),
        excerpt,
        full_content: Some(full_content),
        author_name: non_blank(original.author_name.as_deref()).map(str::to_string),
        image_url: non_blank(original.image_url.as_deref()).map(str::to_string),
        is_optimized: true,
        optimized_at: now,
        reference_urls: references.iter().map(|r| r.url.clone()).collect(),
    }
}

/// Outcome of the publish stage.
#[derive(Debug, Clone)]
pub struct Publication {
    pub article: Article,
    pub payload: PublishedPayload,
    pub published: bool,
}

pub struct Publisher {
    api: Arc<dyn ContentApi>,
    config: PublishConfig,
}

impl Publisher {
    pub fn new(api: Arc<dyn ContentApi>, config: PublishConfig) -> Self {
        Self { api, config }
    }

    pub async fn publish(
        &self,
        original: &Article,
        rewritten: &str,
        references: &[ReferenceArticle],
    ) -> Result<Publication> {
        let payload = build_payload(original, rewritten, references, self.config.excerpt_length, Utc::now());

        if self.config.dry_run {
            info!("🧪 Dry run: skipping update of article {}", original.id);
            return Ok(Publication {
                article: payload.apply_to(original),
                payload,
                published: false,
            });
        }

        info!("💾 Updating article ID {} via API...", original.id);
        match self.api.update_article(original, &payload).await {
            Ok(article) => {
                info!("✅ Article updated successfully!");
                info!("📝 New title: {}", article.title);
                Ok(Publication {
                    article,
                    payload,
                    published: true,
                })
            }
            Err(e) => {
                error!("❌ Error updating article: {}", e);
                if let Error::PublishRejected { body, .. } = &e {
                    error!("Response: {}", body);
                }
                Err(e)
            }
        }
    }
}
