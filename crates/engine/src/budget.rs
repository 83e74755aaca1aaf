use crate::assemble::format_block;
use context_protocol::Match;

/// Estimates the token cost of a piece of text.
///
/// Implementations must be deterministic; accuracy beyond order of magnitude
/// is not required by the packer.
pub trait TokenCounter: Send + Sync {
    fn count(&self, text: &str) -> usize;
}

impl<F> TokenCounter for F
where
    F: Fn(&str) -> usize + Send + Sync,
{
    fn count(&self, text: &str) -> usize {
        self(text)
    }
}

/// Fallback estimator: `ceil(chars / 4)`, minimum 1 for non-empty text.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicTokenCounter;

impl TokenCounter for HeuristicTokenCounter {
    fn count(&self, text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }
        text.chars().count().div_ceil(4)
    }
}

/// One snippet admitted by the packer, header already applied.
#[derive(Debug, Clone)]
pub(crate) struct PackedBlock {
    pub text: String,
    pub path: String,
    pub tokens: usize,
}

/// Greedy all-or-nothing packing over score-ranked candidates.
///
/// A candidate that does not fit is skipped entirely, never truncated; later,
/// cheaper candidates are still considered. Ordinals are 1-based within the
/// packed set, so the header text of a block depends on how many blocks were
/// admitted before it.
pub(crate) fn pack(candidates: &[Match], budget: usize, counter: &dyn TokenCounter) -> Vec<PackedBlock> {
    let mut packed: Vec<PackedBlock> = Vec::new();
    let mut used_tokens = 0usize;

    for candidate in candidates {
        let text = format_block(packed.len() + 1, candidate);
        let tokens = counter.count(&text);

        if used_tokens + tokens > budget {
            log::debug!(
                "Skipping '{}' ({} tokens would exceed budget {} at {})",
                candidate.path,
                tokens,
                budget,
                used_tokens
            );
            continue;
        }

        used_tokens += tokens;
        packed.push(PackedBlock {
            text,
            path: candidate.path.clone(),
            tokens,
        });
    }

    log::debug!(
        "Packed {}/{} candidates ({used_tokens}/{budget} tokens)",
        packed.len(),
        candidates.len()
    );

    packed
}

#[cfg(test)]
mod tests {
    use super::*;
    use context_protocol::Tier;
    use pretty_assertions::assert_eq;

    fn candidate(path: &str, score: f32, snippet: &str) -> Match {
        Match {
            path: path.to_string(),
            score,
            tier: Tier::Global,
            snippet: snippet.to_string(),
        }
    }

    #[test]
    fn heuristic_counter_rounds_up() {
        let counter = HeuristicTokenCounter;
        assert_eq!(counter.count(""), 0);
        assert_eq!(counter.count("a"), 1);
        assert_eq!(counter.count("abcd"), 1);
        assert_eq!(counter.count("abcde"), 2);
        assert_eq!(counter.count(&"x".repeat(400)), 100);
    }

    #[test]
    fn heuristic_counter_counts_chars_not_bytes() {
        let counter = HeuristicTokenCounter;
        // Four 3-byte characters are still four chars, one token.
        assert_eq!(counter.count("日本語字"), 1);
    }

    #[test]
    fn closures_are_counters() {
        let by_len = |text: &str| text.len();
        assert_eq!(TokenCounter::count(&by_len, "abcdef"), 6);
    }

    #[test]
    fn oversized_candidate_is_skipped_not_truncated() {
        let by_len = |text: &str| text.len();
        let candidates = vec![
            candidate("first.md", 1.0, &format!("First{}", " x".repeat(40))),
            candidate("second.md", 0.5, "Second"),
        ];

        let packed = pack(&candidates, 40, &by_len);

        assert_eq!(packed.len(), 1);
        assert_eq!(packed[0].path, "second.md");
        assert!(packed[0].text.contains("Second"));
    }

    #[test]
    fn packing_respects_budget_sum() {
        let counter = HeuristicTokenCounter;
        let candidates: Vec<Match> = (0..20)
            .map(|i| candidate(&format!("f{i}.md"), 1.0 - i as f32 * 0.01, &"body ".repeat(30)))
            .collect();

        let packed = pack(&candidates, 120, &counter);

        let total: usize = packed.iter().map(|b| b.tokens).sum();
        assert!(total <= 120, "{total} tokens exceed budget");
        assert!(!packed.is_empty());
    }

    #[test]
    fn zero_budget_packs_nothing() {
        let counter = HeuristicTokenCounter;
        let candidates = vec![candidate("a.md", 1.0, "Alpha")];
        assert!(pack(&candidates, 0, &counter).is_empty());
    }

    #[test]
    fn ordinals_follow_packed_order() {
        let by_len = |text: &str| text.len();
        let candidates = vec![
            candidate("a.md", 1.0, &"long ".repeat(50)),
            candidate("b.md", 0.9, "B"),
            candidate("c.md", 0.8, "C"),
        ];

        let packed = pack(&candidates, 40, &by_len);

        // a.md is skipped, so b.md takes ordinal 1 and c.md ordinal 2.
        assert_eq!(packed.len(), 2);
        assert!(packed[0].text.starts_with("[1] "));
        assert!(packed[1].text.starts_with("[2] "));
    }
}
