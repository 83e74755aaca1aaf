use anyhow::{anyhow, Context, Result};
use context_engine::{
    EngineConfigBuilder, TierConfig, DEFAULT_MAX_CONTEXT_TOKENS, DEFAULT_MIN_SCORE, DEFAULT_TOP_K,
};
use context_protocol::Tier;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

const ENV_MAX_TOKENS: &str = "CONTEXT_ASSEMBLY_MAX_TOKENS";
const ENV_TOP_K: &str = "CONTEXT_ASSEMBLY_TOP_K";
const ENV_MIN_SCORE: &str = "CONTEXT_ASSEMBLY_MIN_SCORE";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSettings {
    max_context_tokens: Option<usize>,
    top_k: Option<usize>,
    min_score: Option<f32>,
    #[serde(default)]
    tiers: HashMap<String, RawTierSettings>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTierSettings {
    top_k: Option<usize>,
    min_score: Option<f32>,
}

/// Resolved knobs for one run: file settings, then env overrides, then CLI
/// flags on top. The engine itself never reads any of these sources; the
/// resulting immutable `EngineConfig` is built exactly once.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub max_context_tokens: usize,
    pub top_k: usize,
    pub min_score: f32,
    pub tier_overrides: Vec<(Tier, Option<usize>, Option<f32>)>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_context_tokens: DEFAULT_MAX_CONTEXT_TOKENS,
            top_k: DEFAULT_TOP_K,
            min_score: DEFAULT_MIN_SCORE,
            tier_overrides: Vec::new(),
        }
    }
}

impl Settings {
    /// Read the optional settings file and apply process-env overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let settings = match path {
            Some(path) => {
                let bytes = std::fs::read(path)
                    .with_context(|| format!("Failed to read settings file {}", path.display()))?;
                Self::from_bytes(&bytes)
                    .with_context(|| format!("Invalid settings file {}", path.display()))?
            }
            None => Self::default(),
        };
        settings.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Settings files are accepted as JSON first, TOML as fallback.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let raw: RawSettings = match serde_json::from_slice(bytes) {
            Ok(raw) => raw,
            Err(json_err) => {
                let utf8 = std::str::from_utf8(bytes).map_err(|err| anyhow!("{json_err}; {err}"))?;
                toml::from_str(utf8).map_err(|toml_err| {
                    anyhow!(
                        "Settings are not valid JSON or TOML ({json_err}); TOML parse error: {toml_err}"
                    )
                })?
            }
        };
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawSettings) -> Result<Self> {
        let defaults = Self::default();
        let mut tier_overrides = Vec::new();

        // Sort the override keys so construction order never depends on map
        // iteration.
        let mut tier_names: Vec<&String> = raw.tiers.keys().collect();
        tier_names.sort();
        for name in tier_names {
            let tier: Tier = name
                .parse()
                .map_err(|err: String| anyhow!("Invalid tier key in settings: {err}"))?;
            let tier_raw = &raw.tiers[name];
            tier_overrides.push((tier, tier_raw.top_k, tier_raw.min_score));
        }

        Ok(Self {
            max_context_tokens: raw.max_context_tokens.unwrap_or(defaults.max_context_tokens),
            top_k: raw.top_k.unwrap_or(defaults.top_k),
            min_score: raw.min_score.unwrap_or(defaults.min_score),
            tier_overrides,
        })
    }

    /// Apply env overrides through a lookup function, so tests never mutate
    /// process state.
    pub fn apply_env_with(mut self, get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(value) = get(ENV_MAX_TOKENS) {
            self.max_context_tokens = value
                .trim()
                .parse()
                .with_context(|| format!("{ENV_MAX_TOKENS} must be a positive integer"))?;
        }
        if let Some(value) = get(ENV_TOP_K) {
            self.top_k = value
                .trim()
                .parse()
                .with_context(|| format!("{ENV_TOP_K} must be a positive integer"))?;
        }
        if let Some(value) = get(ENV_MIN_SCORE) {
            self.min_score = value
                .trim()
                .parse()
                .with_context(|| format!("{ENV_MIN_SCORE} must be a float in [0.0, 1.0]"))?;
        }
        Ok(self)
    }

    /// Start an engine config from these settings; the caller wires
    /// retrievers onto the returned builder.
    pub fn engine_config(&self) -> Result<EngineConfigBuilder> {
        let default_tier = TierConfig::new(self.top_k, self.min_score)?;
        let mut builder = context_engine::EngineConfig::builder()
            .default_tier(default_tier)
            .max_context_tokens(self.max_context_tokens);

        for (tier, top_k, min_score) in &self.tier_overrides {
            let config = TierConfig::new(
                top_k.unwrap_or(self.top_k),
                min_score.unwrap_or(self.min_score),
            )?;
            builder = builder.tier_override(*tier, config);
        }

        Ok(builder)
    }
}
