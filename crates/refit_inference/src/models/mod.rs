use std::sync::Arc;
use reqwest::Client;
use refit_core::config::InferenceConfig;
use refit_core::types::non_blank;
use refit_core::{Error, Result, TextGenerator};

pub mod chain;
pub mod openai;

pub use chain::ModelChain;
pub use openai::OpenAiModel;

/// Builds the candidate chain from the configured model list. All candidates
/// share one HTTP client.
pub fn create_chain(config: &InferenceConfig) -> Result<ModelChain> {
    let api_key = non_blank(config.api_key.as_deref())
        .ok_or_else(|| Error::Config("OPENAI_API_KEY is required".to_string()))?;

    let models: Vec<&str> = config
        .models
        .iter()
        .map(|m| m.trim())
        .filter(|m| !m.is_empty())
        .collect();
    if models.is_empty() {
        return Err(Error::Config("At least one model must be configured".to_string()));
    }

    let client = Arc::new(Client::new());
    Ok(ModelChain::new(
        models
            .into_iter()
            .map(|model| {
                Arc::new(OpenAiModel::new(client.clone(), api_key, &config.base_url, model)) as Arc<dyn TextGenerator>
            })
            .collect(),
    ))
}
