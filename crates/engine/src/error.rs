use context_protocol::Tier;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Empty query")]
    EmptyQuery,

    #[error("Retriever for tier '{tier}' failed: {source}")]
    Retriever {
        tier: Tier,
        #[source]
        source: anyhow::Error,
    },
}
