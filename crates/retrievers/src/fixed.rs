use async_trait::async_trait;
use context_engine::Retriever;
use context_protocol::RawHit;

/// Canned retriever: returns the same triples for any query, truncated to
/// `k`. Useful in tests and as the smallest example of wiring an external
/// backend behind the `Retriever` seam.
#[derive(Debug, Clone, Default)]
pub struct FixedRetriever {
    hits: Vec<RawHit>,
}

impl FixedRetriever {
    #[must_use]
    pub fn new(hits: Vec<RawHit>) -> Self {
        Self { hits }
    }
}

#[async_trait]
impl Retriever for FixedRetriever {
    async fn search(&self, _query: &str, k: usize) -> anyhow::Result<Vec<RawHit>> {
        Ok(self.hits.iter().take(k).cloned().collect())
    }
}
