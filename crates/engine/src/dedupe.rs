use context_protocol::Match;
use std::collections::HashMap;

/// Cross-tier dedup by path, keeping the highest-scoring occurrence.
///
/// The kept entry carries the tier that produced the winning score, not the
/// first tier visited. Equal scores keep the first-visited occurrence, so
/// tier order stays the deterministic arbiter. Output preserves
/// first-encounter order for stable tie-breaking downstream.
#[must_use]
pub fn dedupe_best(matches: Vec<Match>) -> Vec<Match> {
    let mut kept: Vec<Match> = Vec::with_capacity(matches.len());
    let mut by_path: HashMap<String, usize> = HashMap::new();

    for candidate in matches {
        match by_path.get(&candidate.path) {
            Some(&idx) => {
                if candidate.score > kept[idx].score {
                    kept[idx] = candidate;
                }
            }
            None => {
                by_path.insert(candidate.path.clone(), kept.len());
                kept.push(candidate);
            }
        }
    }

    kept
}
