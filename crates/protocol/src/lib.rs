use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Ordered retrieval tiers.
///
/// The declaration order is the retrieval order and must not be reshuffled:
/// the engine visits tiers exactly as listed here. Final ranking is by score
/// after the cross-tier merge, not by tier position.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Global,
    Context,
    ProjectDocs,
    Code,
}

impl Tier {
    /// All tiers in retrieval order.
    pub const ALL: [Tier; 4] = [Tier::Global, Tier::Context, Tier::ProjectDocs, Tier::Code];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Tier::Global => "global",
            Tier::Context => "context",
            Tier::ProjectDocs => "project_docs",
            Tier::Code => "code",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "global" => Ok(Tier::Global),
            "context" => Ok(Tier::Context),
            "project_docs" | "project-docs" => Ok(Tier::ProjectDocs),
            "code" => Ok(Tier::Code),
            other => Err(format!("Unknown tier '{other}'")),
        }
    }
}

/// One raw retriever hit, before normalization.
///
/// The score scale is adapter-defined and unbounded; only the relative order
/// within one `search` call is meaningful.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawHit {
    pub path: String,
    pub score: f32,
    pub snippet: String,
}

impl RawHit {
    pub fn new(path: impl Into<String>, score: f32, snippet: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            score,
            snippet: snippet.into(),
        }
    }
}

/// A normalized, threshold-surviving match attributed to the tier that
/// produced its winning score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Match {
    pub path: String,
    /// Always in [0.0, 1.0] after normalization.
    pub score: f32,
    pub tier: Tier,
    pub snippet: String,
}

/// Aggregate provenance for one assembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ContextMeta {
    /// Matches that qualified after dedup, including those the budget left out.
    pub hits: usize,
    /// Highest deduplicated score, 0.0 when nothing qualified.
    pub max_score: f32,
    /// Deduplicated packed paths, in packing order.
    pub sources: Vec<String>,
}

impl Default for ContextMeta {
    fn default() -> Self {
        Self {
            hits: 0,
            max_score: 0.0,
            sources: Vec::new(),
        }
    }
}

/// The assembled context block plus provenance, the engine's sole output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ContextResult {
    pub context: String,
    /// Packed paths in packing order.
    pub files_used: Vec<String>,
    /// All deduplicated matches, descending score.
    pub matches: Vec<Match>,
    pub meta: ContextMeta,
}

impl ContextResult {
    /// The well-formed empty result returned when nothing qualified.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            context: String::new(),
            files_used: Vec::new(),
            matches: Vec::new(),
            meta: ContextMeta::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn tier_order_is_fixed() {
        assert_eq!(
            Tier::ALL,
            [Tier::Global, Tier::Context, Tier::ProjectDocs, Tier::Code]
        );
    }

    #[test]
    fn tier_round_trips_through_str() {
        for tier in Tier::ALL {
            assert_eq!(tier.as_str().parse::<Tier>().unwrap(), tier);
        }
        assert!("embedding".parse::<Tier>().is_err());
    }

    #[test]
    fn tier_serializes_snake_case() {
        let json = serde_json::to_string(&Tier::ProjectDocs).unwrap();
        assert_eq!(json, "\"project_docs\"");
    }

    #[test]
    fn empty_result_is_well_formed() {
        let result = ContextResult::empty();
        assert_eq!(result.context, "");
        assert!(result.files_used.is_empty());
        assert!(result.matches.is_empty());
        assert_eq!(result.meta.hits, 0);
        assert_eq!(result.meta.max_score, 0.0);
        assert!(result.meta.sources.is_empty());
    }

    #[test]
    fn result_round_trips_through_json() {
        let result = ContextResult {
            context: "[1] code src/lib.rs\nfn main() {}".to_string(),
            files_used: vec!["src/lib.rs".to_string()],
            matches: vec![Match {
                path: "src/lib.rs".to_string(),
                score: 1.0,
                tier: Tier::Code,
                snippet: "fn main() {}".to_string(),
            }],
            meta: ContextMeta {
                hits: 1,
                max_score: 1.0,
                sources: vec!["src/lib.rs".to_string()],
            },
        };

        let json = serde_json::to_string(&result).unwrap();
        let back: ContextResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }
}
