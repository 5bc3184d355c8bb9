pub mod dashscope;
pub mod openai;

use crate::config::{EmbeddingBackend, EmbeddingSettings};
use crate::domain::ports::embedding_port::EmbeddingProvider;
use std::sync::Arc;

/// Builds the provider selected by configuration.
pub fn from_settings(settings: &EmbeddingSettings) -> Arc<dyn EmbeddingProvider> {
    match settings.backend {
        EmbeddingBackend::DashScope => Arc::new(dashscope::DashScopeProvider::new(
            settings.api_key.clone(),
            settings.model.clone(),
            settings.base_url.clone(),
        )),
        EmbeddingBackend::OpenAi => Arc::new(openai::OpenAiProvider::new(
            settings.api_key.clone(),
            settings.model.clone(),
            settings.base_url.clone(),
        )),
    }
}
