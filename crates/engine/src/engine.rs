use crate::assemble::assemble;
use crate::budget::pack;
use crate::config::EngineConfig;
use crate::dedupe::dedupe_best;
use crate::error::{EngineError, Result};
use crate::normalize::{normalize_scores, sanitize_hits};
use crate::request::ContextRequest;
use context_protocol::{ContextResult, Match, Tier};
use std::cmp::Ordering;

/// The context-assembly pipeline: tiered retrieval → normalize → threshold →
/// dedupe → budget-pack → assemble.
///
/// Tiers are visited strictly sequentially in fixed order; the only
/// suspension points are the retriever calls. All per-request state is
/// transient, so one engine value serves concurrent requests without locks.
pub struct ContextEngine {
    config: EngineConfig,
}

impl ContextEngine {
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The sole public entry point: run one request through the pipeline.
    ///
    /// Returns a well-formed empty result when nothing qualifies. A failing
    /// retriever aborts the request; callers wanting per-tier isolation wrap
    /// the adapter.
    pub async fn build_context(&self, request: &ContextRequest) -> Result<ContextResult> {
        if request.query().is_empty() {
            return Err(EngineError::EmptyQuery);
        }

        let corr = request.corr_id().unwrap_or("-");
        let mut collected: Vec<Match> = Vec::new();

        for tier in Tier::ALL {
            let Some(retriever) = self.config.retriever(tier) else {
                continue;
            };
            let policy = self.config.tier_config(tier);

            let hits = retriever
                .search(request.query(), policy.top_k())
                .await
                .map_err(|source| EngineError::Retriever { tier, source })?;
            if hits.is_empty() {
                log::debug!("[{corr}] tier '{tier}': no results");
                continue;
            }

            let hits = sanitize_hits(tier, hits);
            let scores: Vec<f32> = hits.iter().map(|h| h.score).collect();
            let normalized = normalize_scores(&scores);

            let before = collected.len();
            for (hit, score) in hits.into_iter().zip(normalized) {
                if score < policy.min_score() {
                    continue;
                }
                collected.push(Match {
                    path: hit.path,
                    score,
                    tier,
                    snippet: hit.snippet,
                });
            }
            log::debug!(
                "[{corr}] tier '{tier}': {} matches past threshold {}",
                collected.len() - before,
                policy.min_score()
            );
        }

        let mut ranked = dedupe_best(collected);
        // Stable sort: equal scores keep first-encounter (tier) order.
        ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

        let budget = request
            .max_tokens()
            .unwrap_or_else(|| self.config.max_context_tokens());
        let packed = pack(&ranked, budget, self.config.token_counter());

        let result = assemble(packed, ranked);
        log::info!(
            "[{corr}] assembled {} of {} qualified matches into {} files (budget {budget})",
            result.files_used.len(),
            result.meta.hits,
            result.meta.sources.len()
        );

        Ok(result)
    }
}
