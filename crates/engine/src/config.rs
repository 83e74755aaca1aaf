use crate::budget::{HeuristicTokenCounter, TokenCounter};
use crate::error::{EngineError, Result};
use crate::retriever::Retriever;
use context_protocol::Tier;
use std::collections::HashMap;
use std::sync::Arc;

pub const DEFAULT_TOP_K: usize = 6;
pub const DEFAULT_MIN_SCORE: f32 = 0.35;
pub const DEFAULT_MAX_CONTEXT_TOKENS: usize = 2400;

/// Per-tier retrieval policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierConfig {
    top_k: usize,
    min_score: f32,
}

impl TierConfig {
    /// Fails fast on `top_k == 0` or a `min_score` outside [0, 1]; these are
    /// programmer errors, never clamped.
    pub fn new(top_k: usize, min_score: f32) -> Result<Self> {
        if top_k == 0 {
            return Err(EngineError::InvalidConfig(
                "tier top_k must be >= 1".to_string(),
            ));
        }
        if !min_score.is_finite() || !(0.0..=1.0).contains(&min_score) {
            return Err(EngineError::InvalidConfig(format!(
                "tier min_score must be in [0.0, 1.0] (got {min_score})"
            )));
        }
        Ok(Self { top_k, min_score })
    }

    #[must_use]
    pub const fn top_k(&self) -> usize {
        self.top_k
    }

    #[must_use]
    pub const fn min_score(&self) -> f32 {
        self.min_score
    }
}

impl Default for TierConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            min_score: DEFAULT_MIN_SCORE,
        }
    }
}

/// Immutable engine configuration, constructed once by the caller and shared
/// read-only across requests. The engine never reads the environment.
pub struct EngineConfig {
    retrievers: HashMap<Tier, Arc<dyn Retriever>>,
    tier_overrides: HashMap<Tier, TierConfig>,
    default_tier: TierConfig,
    max_context_tokens: usize,
    token_counter: Arc<dyn TokenCounter>,
}

impl EngineConfig {
    #[must_use]
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    /// The registered retriever for a tier, if any. An unwired tier is a
    /// supported configuration, not an error.
    #[must_use]
    pub fn retriever(&self, tier: Tier) -> Option<&Arc<dyn Retriever>> {
        self.retrievers.get(&tier)
    }

    /// Effective policy for a tier: the override when present, the default
    /// otherwise.
    #[must_use]
    pub fn tier_config(&self, tier: Tier) -> TierConfig {
        self.tier_overrides
            .get(&tier)
            .copied()
            .unwrap_or(self.default_tier)
    }

    #[must_use]
    pub const fn max_context_tokens(&self) -> usize {
        self.max_context_tokens
    }

    #[must_use]
    pub fn token_counter(&self) -> &dyn TokenCounter {
        self.token_counter.as_ref()
    }

    #[must_use]
    pub fn configured_tiers(&self) -> Vec<Tier> {
        Tier::ALL
            .into_iter()
            .filter(|tier| self.retrievers.contains_key(tier))
            .collect()
    }
}

impl std::fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineConfig")
            .field("tiers", &self.configured_tiers())
            .field("tier_overrides", &self.tier_overrides)
            .field("default_tier", &self.default_tier)
            .field("max_context_tokens", &self.max_context_tokens)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
pub struct EngineConfigBuilder {
    retrievers: HashMap<Tier, Arc<dyn Retriever>>,
    tier_overrides: HashMap<Tier, TierConfig>,
    default_tier: Option<TierConfig>,
    max_context_tokens: Option<usize>,
    token_counter: Option<Arc<dyn TokenCounter>>,
}

impl EngineConfigBuilder {
    /// Register the retriever owned by `tier`. Registering the same tier
    /// twice replaces the earlier instance.
    #[must_use]
    pub fn retriever(mut self, tier: Tier, retriever: Arc<dyn Retriever>) -> Self {
        self.retrievers.insert(tier, retriever);
        self
    }

    #[must_use]
    pub fn tier_override(mut self, tier: Tier, config: TierConfig) -> Self {
        self.tier_overrides.insert(tier, config);
        self
    }

    #[must_use]
    pub fn default_tier(mut self, config: TierConfig) -> Self {
        self.default_tier = Some(config);
        self
    }

    #[must_use]
    pub fn max_context_tokens(mut self, tokens: usize) -> Self {
        self.max_context_tokens = Some(tokens);
        self
    }

    #[must_use]
    pub fn token_counter(mut self, counter: Arc<dyn TokenCounter>) -> Self {
        self.token_counter = Some(counter);
        self
    }

    /// Validate and freeze. An empty retriever map is legal; a zero token
    /// budget is not.
    pub fn build(self) -> Result<EngineConfig> {
        let max_context_tokens = self.max_context_tokens.unwrap_or(DEFAULT_MAX_CONTEXT_TOKENS);
        if max_context_tokens == 0 {
            return Err(EngineError::InvalidConfig(
                "max_context_tokens must be > 0".to_string(),
            ));
        }

        Ok(EngineConfig {
            retrievers: self.retrievers,
            tier_overrides: self.tier_overrides,
            default_tier: self.default_tier.unwrap_or_default(),
            max_context_tokens,
            token_counter: self
                .token_counter
                .unwrap_or_else(|| Arc::new(HeuristicTokenCounter)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn tier_config_rejects_zero_top_k() {
        let err = TierConfig::new(0, 0.5).unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig(_)), "{err}");
    }

    #[test]
    fn tier_config_rejects_out_of_range_min_score() {
        assert!(TierConfig::new(3, -0.1).is_err());
        assert!(TierConfig::new(3, 1.5).is_err());
        assert!(TierConfig::new(3, f32::NAN).is_err());
        assert!(TierConfig::new(3, 0.0).is_ok());
        assert!(TierConfig::new(3, 1.0).is_ok());
    }

    #[test]
    fn builder_rejects_zero_token_budget() {
        let err = EngineConfig::builder()
            .max_context_tokens(0)
            .build()
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig(_)), "{err}");
    }

    #[test]
    fn defaults_are_applied() {
        let config = EngineConfig::builder().build().unwrap();
        assert_eq!(config.max_context_tokens(), DEFAULT_MAX_CONTEXT_TOKENS);
        assert_eq!(config.tier_config(Tier::Code).top_k(), DEFAULT_TOP_K);
        assert_eq!(config.tier_config(Tier::Code).min_score(), DEFAULT_MIN_SCORE);
        assert!(config.configured_tiers().is_empty());
    }

    #[test]
    fn override_shadows_default_per_tier() {
        let custom = TierConfig::new(12, 0.0).unwrap();
        let config = EngineConfig::builder()
            .tier_override(Tier::Code, custom)
            .build()
            .unwrap();

        assert_eq!(config.tier_config(Tier::Code), custom);
        assert_eq!(config.tier_config(Tier::Global), TierConfig::default());
    }
}
