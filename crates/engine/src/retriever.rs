use async_trait::async_trait;
use context_protocol::RawHit;
use std::sync::Arc;

/// Capability interface for one retrieval backend.
///
/// The engine owns no retrieval logic: each configured tier is handed exactly
/// one of these by the caller and queried sequentially. Raw scores are
/// adapter-defined and unbounded; the engine rescales them per call. A
/// retriever must be safe to call repeatedly and from concurrent requests.
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn search(&self, query: &str, k: usize) -> anyhow::Result<Vec<RawHit>>;
}

#[async_trait]
impl<T: Retriever + ?Sized> Retriever for Arc<T> {
    async fn search(&self, query: &str, k: usize) -> anyhow::Result<Vec<RawHit>> {
        (**self).search(query, k).await
    }
}
