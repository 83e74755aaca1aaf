mod assemble;
mod budget;
mod config;
mod dedupe;
mod engine;
mod error;
mod normalize;
mod request;
mod retriever;

pub use budget::{HeuristicTokenCounter, TokenCounter};
pub use config::{
    EngineConfig, EngineConfigBuilder, TierConfig, DEFAULT_MAX_CONTEXT_TOKENS, DEFAULT_MIN_SCORE,
    DEFAULT_TOP_K,
};
pub use dedupe::dedupe_best;
pub use engine::ContextEngine;
pub use error::{EngineError, Result};
pub use normalize::{normalize_scores, sanitize_hits};
pub use request::ContextRequest;
pub use retriever::Retriever;

pub use context_protocol::{ContextMeta, ContextResult, Match, RawHit, Tier};
