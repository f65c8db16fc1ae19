use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Number of reference articles a rewrite is built from.
pub const REQUIRED_REFERENCES: usize = 2;

/// Article as exposed by the content API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: u64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_content: Option<String>,
    /// Body under its short key; older API revisions send only this one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_tags", skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}

impl Article {
    /// The text a rewrite starts from: the full content, then the short
    /// `content` key, then the excerpt when the API only returned a summary.
    pub fn body(&self) -> &str {
        non_blank(self.full_content.as_deref())
            .or_else(|| non_blank(self.content.as_deref()))
            .or_else(|| non_blank(self.excerpt.as_deref()))
            .unwrap_or("")
    }
}

/// Tags arrive as `null`, plain strings, or relation objects carrying a
/// `name`. Anything else is dropped.
fn lenient_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<Value>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|tag| match tag {
            Value::String(name) => Some(name),
            Value::Object(mut fields) => match fields.remove("name") {
                Some(Value::String(name)) => Some(name),
                _ => None,
            },
            _ => None,
        })
        .filter(|name| !name.trim().is_empty())
        .collect())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub snippet: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceArticle {
    pub title: String,
    pub url: String,
    pub content: String,
}

impl ReferenceArticle {
    pub fn from_result(result: &SearchResult, content: String) -> Self {
        Self {
            title: result.title.clone(),
            url: result.url.clone(),
            content,
        }
    }
}

/// Sparse update body sent back to the content API. Optional fields that are
/// absent are never serialized.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PublishedPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub is_optimized: bool,
    pub optimized_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reference_urls: Vec<String>,
}

impl PublishedPayload {
    /// Applies the payload on top of an article snapshot, for backends that do
    /// not echo the updated record.
    pub fn apply_to(&self, article: &Article) -> Article {
        let mut updated = article.clone();
        if let Some(title) = &self.title {
            updated.title = title.clone();
        }
        if let Some(excerpt) = &self.excerpt {
            updated.excerpt = Some(excerpt.clone());
        }
        if let Some(content) = &self.full_content {
            updated.full_content = Some(content.clone());
        }
        if let Some(author) = &self.author_name {
            updated.author_name = Some(author.clone());
        }
        if let Some(image) = &self.image_url {
            updated.image_url = Some(image.clone());
        }
        updated
    }
}

/// Returns the trimmed value when it carries any text.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
