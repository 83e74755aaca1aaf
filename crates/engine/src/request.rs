use crate::error::{EngineError, Result};

/// One context-assembly request. Created fresh per call, discarded after.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextRequest {
    query: String,
    corr_id: Option<String>,
    max_tokens: Option<usize>,
}

impl ContextRequest {
    /// The query is trimmed at construction; emptiness is reported by
    /// `build_context`, not here, so callers can still attach ids first.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into().trim().to_string(),
            corr_id: None,
            max_tokens: None,
        }
    }

    /// Attach an opaque correlation id, threaded through logging only.
    #[must_use]
    pub fn with_corr_id(mut self, corr_id: impl Into<String>) -> Self {
        self.corr_id = Some(corr_id.into());
        self
    }

    /// Override the engine token budget for this request. Zero is a
    /// configuration error, not a degraded request.
    pub fn with_max_tokens(mut self, max_tokens: usize) -> Result<Self> {
        if max_tokens == 0 {
            return Err(EngineError::InvalidConfig(
                "request max_tokens must be > 0".to_string(),
            ));
        }
        self.max_tokens = Some(max_tokens);
        Ok(self)
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[must_use]
    pub fn corr_id(&self) -> Option<&str> {
        self.corr_id.as_deref()
    }

    #[must_use]
    pub const fn max_tokens(&self) -> Option<usize> {
        self.max_tokens
    }
}
