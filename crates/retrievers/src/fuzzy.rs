use crate::document::{bounded_prefix, DocumentSet};
use async_trait::async_trait;
use context_engine::Retriever;
use context_protocol::RawHit;
use nucleo_matcher::{pattern::Pattern, Matcher};

/// How much of a document body participates in fuzzy scoring.
const CONTENT_PREVIEW_CHARS: usize = 200;

/// Fuzzy retriever over an in-memory corpus using nucleo-matcher.
///
/// Scores paths and a bounded content preview, keeping the best of the two.
/// Raw nucleo scores (u32) are surfaced as-is; rescaling into [0, 1] is the
/// engine's job, not the adapter's.
pub struct FuzzyRetriever {
    docs: DocumentSet,
}

impl FuzzyRetriever {
    #[must_use]
    pub fn new(docs: DocumentSet) -> Self {
        Self { docs }
    }
}

#[async_trait]
impl Retriever for FuzzyRetriever {
    async fn search(&self, query: &str, k: usize) -> anyhow::Result<Vec<RawHit>> {
        let pattern = Pattern::parse(
            query,
            nucleo_matcher::pattern::CaseMatching::Smart,
            nucleo_matcher::pattern::Normalization::Smart,
        );
        // nucleo's matcher is a mutable scratch buffer; one per call keeps
        // `search` shareable across concurrent requests.
        let mut matcher = Matcher::new(nucleo_matcher::Config::DEFAULT);

        let mut scored: Vec<(usize, u32)> = self
            .docs
            .documents()
            .iter()
            .enumerate()
            .filter_map(|(idx, doc)| {
                let path_haystack = nucleo_matcher::Utf32String::from(doc.path.as_str());
                let path_score = pattern.score(path_haystack.slice(..), &mut matcher);

                let preview = bounded_prefix(&doc.content, CONTENT_PREVIEW_CHARS);
                let content_haystack = nucleo_matcher::Utf32String::from(preview);
                let content_score = pattern.score(content_haystack.slice(..), &mut matcher);

                let best = [path_score, content_score].into_iter().flatten().max()?;
                Some((idx, best))
            })
            .collect();

        // Ties break on document order (paths are sorted) for determinism.
        scored.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        scored.truncate(k);

        let docs = self.docs.documents();
        Ok(scored
            .into_iter()
            .map(|(idx, score)| RawHit::new(docs[idx].path.clone(), score as f32, docs[idx].snippet()))
            .collect())
    }
}
