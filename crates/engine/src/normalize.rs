use context_protocol::{RawHit, Tier};

/// Raw score spreads below this are treated as a uniform batch.
const SCORE_EPSILON: f32 = 1e-6;

/// Min-max rescale one retrieval call's raw scores into [0, 1].
///
/// A batch whose scores are all effectively equal maps to 1.0 across the
/// board: a uniform batch is uniformly relevant rather than 0/0-degenerate.
/// Normalization is local to the call — it never compares across tiers, so a
/// tier of weak matches still gets a top result at 1.0.
#[must_use]
pub fn normalize_scores(scores: &[f32]) -> Vec<f32> {
    if scores.is_empty() {
        return Vec::new();
    }

    let lo = scores.iter().copied().fold(f32::INFINITY, f32::min);
    let hi = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);

    if hi - lo < SCORE_EPSILON {
        return vec![1.0; scores.len()];
    }

    scores.iter().map(|s| (s - lo) / (hi - lo)).collect()
}

/// Drop malformed hits before normalization: empty paths and non-finite
/// scores are data-quality failures of a single hit, never of the batch.
pub fn sanitize_hits(tier: Tier, hits: Vec<RawHit>) -> Vec<RawHit> {
    hits.into_iter()
        .filter_map(|hit| {
            let path = hit.path.trim().to_string();
            if path.is_empty() {
                log::warn!("Dropping hit with empty path from tier '{tier}'");
                return None;
            }
            if !hit.score.is_finite() {
                log::warn!("Dropping hit '{path}' with non-finite score from tier '{tier}'");
                return None;
            }
            Some(RawHit {
                path,
                score: hit.score,
                snippet: hit.snippet,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn linear_rescale_spans_unit_interval() {
        let normalized = normalize_scores(&[0.2, 0.6, 1.0]);
        assert_eq!(normalized, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn uniform_batch_maps_to_one() {
        assert_eq!(normalize_scores(&[0.4, 0.4, 0.4]), vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn single_hit_maps_to_one() {
        assert_eq!(normalize_scores(&[0.2]), vec![1.0]);
    }

    #[test]
    fn empty_batch_stays_empty() {
        assert!(normalize_scores(&[]).is_empty());
    }

    #[test]
    fn negative_raw_scores_are_fine() {
        let normalized = normalize_scores(&[-10.0, 0.0, 10.0]);
        assert_eq!(normalized, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn sanitize_drops_empty_paths_and_nan_scores() {
        let hits = vec![
            RawHit::new("  ", 0.5, "blank"),
            RawHit::new("ok.md", f32::NAN, "nan"),
            RawHit::new("inf.md", f32::INFINITY, "inf"),
            RawHit::new(" keep.md ", 0.5, "keep"),
        ];

        let sane = sanitize_hits(Tier::Global, hits);

        assert_eq!(sane.len(), 1);
        assert_eq!(sane[0].path, "keep.md");
    }

    proptest! {
        #[test]
        fn normalized_scores_stay_in_unit_interval(
            scores in proptest::collection::vec(-1.0e6f32..1.0e6, 1..64)
        ) {
            for score in normalize_scores(&scores) {
                prop_assert!((0.0..=1.0).contains(&score), "score {score} out of range");
            }
        }

        #[test]
        fn equal_batches_always_map_to_one(
            value in -1.0e6f32..1.0e6,
            len in 1usize..32
        ) {
            let scores = vec![value; len];
            prop_assert!(normalize_scores(&scores).iter().all(|s| *s == 1.0));
        }
    }
}
