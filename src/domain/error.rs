use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Vector engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Engine write error: {0}")]
    EngineWrite(String),

    #[error("Engine query error: {0}")]
    EngineQuery(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl DomainError {
    /// Failures a later call may recover from because engine state is re-probed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DomainError::EngineUnavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_engine_unavailable_is_retryable() {
        assert!(DomainError::EngineUnavailable("down".into()).is_retryable());
        assert!(!DomainError::Configuration("no key".into()).is_retryable());
        assert!(!DomainError::Embedding("429".into()).is_retryable());
    }

    #[test]
    fn test_display_carries_upstream_message() {
        let err = DomainError::Embedding("quota exceeded".into());
        assert_eq!(err.to_string(), "Embedding error: quota exceeded");
    }
}
