use std::sync::Arc;
use tracing::{debug, info};
use refit_core::config::InferenceConfig;
use refit_core::{Article, GenerationRequest, ReferenceArticle, Result, TextGenerator, REQUIRED_REFERENCES};

pub const SYSTEM_PROMPT: &str = "You are an expert content writer specializing in SEO-optimized articles. \
You study top-ranking content and produce articles of the same quality.";

const INSTRUCTIONS: &str = "INSTRUCTIONS:
1. Study the tone, structure, formatting and writing style of both reference articles.
2. Rewrite the original article in that style while keeping its core topic.
3. Use heading levels (##, ###) the way the reference articles do.
4. Match the depth and coverage of the reference articles.
5. Organize the content for search engines the way the references are organized.
6. Keep the article engaging, informative and well structured.
7. Be at least as detailed as the reference articles.

OUTPUT FORMAT (markdown):
# [Improved Title]

[Introduction paragraph]

## [Main Section]

[Content]

### [Subsection, if needed]

[Content]

## Conclusion

[Closing thoughts]

Output ONLY the rewritten article in markdown. No commentary, notes or explanations.";

/// Builds the user prompt. Original title and content come first, then each
/// reference's title, URL and content, in order.
pub fn build_prompt(original: &Article, references: &[ReferenceArticle; REQUIRED_REFERENCES]) -> String {
    let mut prompt = String::from(
        "TASK: Rewrite the ORIGINAL ARTICLE so it matches the style, formatting and quality of the TOP-RANKING REFERENCE ARTICLES.\n\n",
    );
    prompt.push_str(&format!(
        "ORIGINAL ARTICLE:\nTitle: {}\nContent:\n{}\n\n",
        original.title,
        original.body()
    ));
    for (i, reference) in references.iter().enumerate() {
        prompt.push_str(&format!(
            "REFERENCE ARTICLE {} (Top Ranking):\nTitle: {}\nURL: {}\nContent:\n{}\n\n",
            i + 1,
            reference.title,
            reference.url,
            reference.content
        ));
    }
    prompt.push_str(INSTRUCTIONS);
    prompt
}

/// Rewrites an article after two reference articles.
pub struct RewriteGenerator {
    generator: Arc<dyn TextGenerator>,
    temperature: f32,
    max_tokens: u32,
}

impl RewriteGenerator {
    pub fn new(generator: Arc<dyn TextGenerator>, config: &InferenceConfig) -> Self {
        Self {
            generator,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    pub fn request(&self, original: &Article, references: &[ReferenceArticle; REQUIRED_REFERENCES]) -> GenerationRequest {
        GenerationRequest {
            system: SYSTEM_PROMPT.to_string(),
            prompt: build_prompt(original, references),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }

    pub async fn rewrite(&self, original: &Article, references: &[ReferenceArticle; REQUIRED_REFERENCES]) -> Result<String> {
        info!("🤖 Rewriting article with LLM...");
        let request = self.request(original, references);
        debug!("Prompt is {} characters", request.prompt.chars().count());

        let rewritten = self.generator.generate(&request).await?;
        info!("✅ Article rewritten successfully");
        info!("📊 New content length: {} characters", rewritten.chars().count());
        Ok(rewritten)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use refit_core::Error;

    #[derive(Debug, Default)]
    struct RecordingModel {
        seen: Mutex<Option<GenerationRequest>>,
        fail: bool,
    }

    #[async_trait]
    impl TextGenerator for RecordingModel {
        fn name(&self) -> &str {
            "recording"
        }

        async fn generate(&self, request: &GenerationRequest) -> Result<String> {
            *self.seen.lock().unwrap() = Some(request.clone());
            if self.fail {
                return Err(Error::NoModelAvailable { attempted: 1 });
            }
            Ok("# Best Running Shoes 2024\n\n## Intro\n...".to_string())
        }
    }

    fn original() -> Article {
        Article {
            id: 42,
            title: "Best Running Shoes".to_string(),
            full_content: Some("Original body about shoes.".to_string()),
            content: None,
            excerpt: None,
            author_name: None,
            image_url: None,
            tags: vec![],
            source_url: None,
        }
    }

    fn references() -> [ReferenceArticle; 2] {
        [
            ReferenceArticle {
                title: "Top Shoes 2024".to_string(),
                url: "https://a.com".to_string(),
                content: "First reference content.".to_string(),
            },
            ReferenceArticle {
                title: "Shoe Guide".to_string(),
                url: "https://b.com".to_string(),
                content: "Second reference content.".to_string(),
            },
        ]
    }

    #[test]
    fn test_prompt_embeds_sources_in_order() {
        let prompt = build_prompt(&original(), &references());
        let needles = [
            "Best Running Shoes",
            "Original body about shoes.",
            "Top Shoes 2024",
            "https://a.com",
            "First reference content.",
            "Shoe Guide",
            "https://b.com",
            "Second reference content.",
        ];
        let mut cursor = 0;
        for needle in needles {
            let found = prompt[cursor..]
                .find(needle)
                .unwrap_or_else(|| panic!("{} missing or out of order", needle));
            cursor += found + needle.len();
        }
    }

    #[test]
    fn test_prompt_uses_excerpt_without_content() {
        let mut article = original();
        article.full_content = None;
        article.excerpt = Some("Only the excerpt.".to_string());
        let prompt = build_prompt(&article, &references());
        assert!(prompt.contains("Content:\nOnly the excerpt."));
    }

    #[tokio::test]
    async fn test_rewrite_passes_sampling_settings() {
        let model = Arc::new(RecordingModel::default());
        let generator = RewriteGenerator::new(model.clone(), &InferenceConfig::default());

        let output = generator.rewrite(&original(), &references()).await.unwrap();
        assert!(output.starts_with("# Best Running Shoes 2024"));

        let seen = model.seen.lock().unwrap().clone().unwrap();
        assert_eq!(seen.system, SYSTEM_PROMPT);
        assert_eq!(seen.temperature, 0.7);
        assert_eq!(seen.max_tokens, 4000);
    }

    #[tokio::test]
    async fn test_rewrite_propagates_failure() {
        let model = Arc::new(RecordingModel {
            fail: true,
            ..Default::default()
        });
        let generator = RewriteGenerator::new(model, &InferenceConfig::default());
        assert!(matches!(
            generator.rewrite(&original(), &references()).await,
            Err(Error::NoModelAvailable { .. })
        ));
    }
}
