use crate::document::DocumentSet;
use async_trait::async_trait;
use context_engine::Retriever;
use context_protocol::RawHit;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-z0-9_]+").expect("token regex must compile"));

/// Keyword retriever: tf·idf-weighted term matching over the corpus.
///
/// Term and document-frequency tables are built once at construction; a
/// `search` call only walks the precomputed counts. Zero-scoring documents
/// are not returned.
pub struct KeywordRetriever {
    docs: DocumentSet,
    term_counts: Vec<HashMap<String, usize>>,
    doc_freq: HashMap<String, usize>,
}

impl KeywordRetriever {
    #[must_use]
    pub fn new(docs: DocumentSet) -> Self {
        let mut term_counts = Vec::with_capacity(docs.len());
        let mut doc_freq: HashMap<String, usize> = HashMap::new();

        for doc in docs.documents() {
            let mut counts: HashMap<String, usize> = HashMap::new();
            for token in tokenize(&doc.content) {
                *counts.entry(token).or_insert(0) += 1;
            }
            for term in counts.keys() {
                *doc_freq.entry(term.clone()).or_insert(0) += 1;
            }
            term_counts.push(counts);
        }

        Self {
            docs,
            term_counts,
            doc_freq,
        }
    }

    fn score(&self, idx: usize, terms: &HashSet<String>) -> f32 {
        let n = self.docs.len() as f32;
        let counts = &self.term_counts[idx];

        terms
            .iter()
            .filter_map(|term| {
                let tf = *counts.get(term)? as f32;
                let df = *self.doc_freq.get(term)? as f32;
                Some(tf * (1.0 + n / df).ln())
            })
            .sum()
    }
}

fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    TOKEN_RE
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

#[async_trait]
impl Retriever for KeywordRetriever {
    async fn search(&self, query: &str, k: usize) -> anyhow::Result<Vec<RawHit>> {
        let terms: HashSet<String> = tokenize(query).into_iter().collect();
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(usize, f32)> = (0..self.docs.len())
            .filter_map(|idx| {
                let score = self.score(idx, &terms);
                (score > 0.0).then_some((idx, score))
            })
            .collect();

        // Ties break on document order (paths are sorted) for determinism.
        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        scored.truncate(k);

        let docs = self.docs.documents();
        Ok(scored
            .into_iter()
            .map(|(idx, score)| RawHit::new(docs[idx].path.clone(), score, docs[idx].snippet()))
            .collect())
    }
}
