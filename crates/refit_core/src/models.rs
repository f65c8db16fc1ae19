use async_trait::async_trait;
use std::fmt;
use crate::Result;

/// One chat-style generation call: a system message, a user prompt and the
/// sampling bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub system: String,
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[async_trait]
pub trait TextGenerator: Send + Sync + fmt::Debug {
    /// Identifier of the backing model, used in logs
    fn name(&self) -> &str;

    /// Run a single completion and return the generated text
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;
}
