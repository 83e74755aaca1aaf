use crate::budget::PackedBlock;
use context_protocol::{ContextMeta, ContextResult, Match};
use std::collections::HashSet;

/// Traceability header prepended to every packed snippet.
pub(crate) fn format_block(ordinal: usize, entry: &Match) -> String {
    format!("[{ordinal}] {} {}\n{}", entry.tier, entry.path, entry.snippet)
}

/// Shape the final result from the packed blocks and the full ranked
/// candidate list.
///
/// `meta.hits` and `meta.max_score` reflect everything that qualified after
/// dedup, not only what fit in budget; `files_used` and `meta.sources`
/// reflect only what was packed.
pub(crate) fn assemble(packed: Vec<PackedBlock>, ranked: Vec<Match>) -> ContextResult {
    let context = packed
        .iter()
        .map(|block| block.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    let files_used: Vec<String> = packed.into_iter().map(|block| block.path).collect();

    let mut seen = HashSet::new();
    let mut sources = Vec::new();
    for path in &files_used {
        if seen.insert(path.as_str()) {
            sources.push(path.clone());
        }
    }

    let max_score = ranked.iter().map(|m| m.score).fold(0.0f32, f32::max);

    ContextResult {
        context,
        files_used,
        meta: ContextMeta {
            hits: ranked.len(),
            max_score,
            sources,
        },
        matches: ranked,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use context_protocol::Tier;
    use pretty_assertions::assert_eq;

    fn block(ordinal: usize, path: &str, snippet: &str) -> PackedBlock {
        let entry = Match {
            path: path.to_string(),
            score: 1.0,
            tier: Tier::ProjectDocs,
            snippet: snippet.to_string(),
        };
        PackedBlock {
            text: format_block(ordinal, &entry),
            path: path.to_string(),
            tokens: 1,
        }
    }

    #[test]
    fn header_carries_tier_path_and_ordinal() {
        let entry = Match {
            path: "docs/guide.md".to_string(),
            score: 0.8,
            tier: Tier::ProjectDocs,
            snippet: "Install with cargo.".to_string(),
        };

        assert_eq!(
            format_block(3, &entry),
            "[3] project_docs docs/guide.md\nInstall with cargo."
        );
    }

    #[test]
    fn blocks_join_with_blank_lines() {
        let result = assemble(
            vec![block(1, "a.md", "Alpha"), block(2, "b.md", "Beta")],
            Vec::new(),
        );

        assert_eq!(
            result.context,
            "[1] project_docs a.md\nAlpha\n\n[2] project_docs b.md\nBeta"
        );
        assert_eq!(result.files_used, vec!["a.md", "b.md"]);
        assert_eq!(result.meta.sources, vec!["a.md", "b.md"]);
    }

    #[test]
    fn meta_counts_qualified_not_packed() {
        let ranked = vec![
            Match {
                path: "a.md".to_string(),
                score: 0.9,
                tier: Tier::Global,
                snippet: "A".to_string(),
            },
            Match {
                path: "b.md".to_string(),
                score: 0.4,
                tier: Tier::Code,
                snippet: "B".to_string(),
            },
        ];

        let result = assemble(vec![block(1, "a.md", "A")], ranked);

        assert_eq!(result.meta.hits, 2);
        assert_eq!(result.meta.max_score, 0.9);
        assert_eq!(result.files_used, vec!["a.md"]);
        assert_eq!(result.matches.len(), 2);
    }

    #[test]
    fn empty_inputs_give_empty_result() {
        let result = assemble(Vec::new(), Vec::new());
        assert_eq!(result, ContextResult::empty());
    }
}
