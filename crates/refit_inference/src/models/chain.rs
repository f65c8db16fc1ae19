use std::sync::Arc;
use async_trait::async_trait;
use tracing::{info, warn};
use refit_core::{Error, GenerationRequest, Result, TextGenerator};

/// Ordered list of interchangeable backends. Each is tried once, in order;
/// the first successful answer is returned as-is.
#[derive(Debug, Clone, Default)]
pub struct ModelChain {
    candidates: Vec<Arc<dyn TextGenerator>>,
}

impl ModelChain {
    pub fn new(candidates: Vec<Arc<dyn TextGenerator>>) -> Self {
        Self { candidates }
    }

    pub fn push(&mut self, candidate: Arc<dyn TextGenerator>) {
        self.candidates.push(candidate);
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.candidates.iter().map(|c| c.name()).collect()
    }
}

#[async_trait]
impl TextGenerator for ModelChain {
    fn name(&self) -> &str {
        "chain"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let mut failures = 0;
        for candidate in &self.candidates {
            info!("🔄 Trying model: {}", candidate.name());
            match candidate.generate(request).await {
                Ok(output) => {
                    info!("✅ Success with model: {}", candidate.name());
                    return Ok(output);
                }
                Err(e) => {
                    failures += 1;
                    warn!("❌ Model {} failed: {}", candidate.name(), e);
                }
            }
        }
        Err(Error::NoModelAvailable { attempted: failures })
    }
}
