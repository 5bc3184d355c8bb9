use crate::domain::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputType {
    Document,
    Query,
}

/// Turns text into fixed-dimension vectors.
///
/// Implementations return exactly one vector per input, in input order, or
/// fail as a whole. A missing credential must surface as
/// [`DomainError::Configuration`] before any network call.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, texts: &[String], input_type: InputType) -> Result<Vec<Vec<f32>>, DomainError>;
    fn dimension(&self) -> usize;
    fn name(&self) -> &str;
}
