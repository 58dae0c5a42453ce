//! Slot auction: mandatory doses first, weighted draws for the rest.
//!
//! # Invariants
//! - Every mandatory candidate is returned, even past `digest_size`.
//! - No candidate is returned twice.
//! - Result size is `digest_size` whenever enough candidates exist and the
//!   mandatory set does not overflow.

use log::debug;
use rand::Rng;

/// A candidate paired with its urgency score.
#[derive(Debug, Clone, PartialEq)]
pub struct Scored<T> {
    pub item: T,
    pub score: f64,
}

impl<T> Scored<T> {
    pub fn new(item: T, score: f64) -> Self {
        Self { item, score }
    }

    pub fn is_mandatory(&self) -> bool {
        self.score == f64::INFINITY
    }
}

/// Selects the digest contents from scored candidates.
///
/// Mandatory (infinitely scored) candidates are always taken. If they alone
/// exceed `digest_size` they are returned without any optional candidate.
/// Remaining slots are filled by [`sample_without_replacement`].
pub fn run_auction<T, R: Rng>(candidates: Vec<Scored<T>>, digest_size: usize, rng: &mut R) -> Vec<T> {
    let (mandatory, optional): (Vec<_>, Vec<_>) =
        candidates.into_iter().partition(Scored::is_mandatory);

    let mut selected: Vec<T> = mandatory.into_iter().map(|candidate| candidate.item).collect();
    if selected.len() > digest_size {
        debug!(
            "event=digest_select module=selection status=overflow mandatory={} digest_size={}",
            selected.len(),
            digest_size
        );
        return selected;
    }

    let remaining_slots = digest_size - selected.len();
    let optional_count = optional.len();
    selected.extend(sample_without_replacement(optional, remaining_slots, rng));
    debug!(
        "event=digest_select module=selection status=ok selected={} optional_pool={} digest_size={}",
        selected.len(),
        optional_count,
        digest_size
    );
    selected
}

/// Draws up to `slots` candidates, each round proportional to score.
///
/// Weights are `max(0, score)`. A round whose pool carries no positive
/// weight falls back to a uniform draw, so zero-weight candidates still fill
/// slots once the weighted ones are used up.
pub fn sample_without_replacement<T, R: Rng>(
    candidates: Vec<Scored<T>>,
    slots: usize,
    rng: &mut R,
) -> Vec<T> {
    let mut pool: Vec<(T, f64)> = candidates
        .into_iter()
        .map(|candidate| (candidate.item, sampling_weight(candidate.score)))
        .collect();
    let mut picked = Vec::with_capacity(slots.min(pool.len()));

    while picked.len() < slots && !pool.is_empty() {
        let total: f64 = pool.iter().map(|(_, weight)| *weight).sum();
        let index = if total > 0.0 && total.is_finite() {
            draw_weighted(&pool, total, rng)
        } else {
            rng.gen_range(0..pool.len())
        };
        let (item, _) = pool.remove(index);
        picked.push(item);
    }

    picked
}

// NaN collapses to 0 through `f64::max`.
fn sampling_weight(score: f64) -> f64 {
    score.max(0.0)
}

/// Inverse-CDF draw over positive weights. `total` must be positive.
fn draw_weighted<T, R: Rng>(pool: &[(T, f64)], total: f64, rng: &mut R) -> usize {
    let target = rng.gen_range(0.0..total);
    let mut cumulative = 0.0;
    let mut last_positive = 0;
    for (index, (_, weight)) in pool.iter().enumerate() {
        if *weight <= 0.0 {
            continue;
        }
        cumulative += weight;
        last_positive = index;
        if cumulative >= target {
            return index;
        }
    }
    // Rounding can leave `cumulative` a hair below `target`.
    last_positive
}

#[cfg(test)]
mod tests {
    use super::{run_auction, sample_without_replacement, Scored};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn scored(items: &[(&'static str, f64)]) -> Vec<Scored<&'static str>> {
        items
            .iter()
            .map(|(item, score)| Scored::new(*item, *score))
            .collect()
    }

    #[test]
    fn mandatory_overflow_returns_all_mandatory_only() {
        let mut rng = StdRng::seed_from_u64(1);
        let candidates = scored(&[
            ("a", f64::INFINITY),
            ("b", 5.0),
            ("c", f64::INFINITY),
            ("d", f64::INFINITY),
        ]);
        let selected = run_auction(candidates, 2, &mut rng);
        let ids: HashSet<_> = selected.into_iter().collect();
        assert_eq!(ids, HashSet::from(["a", "c", "d"]));
    }

    #[test]
    fn mandatory_exactly_filling_slots_leaves_no_optional() {
        let mut rng = StdRng::seed_from_u64(2);
        let candidates = scored(&[("a", f64::INFINITY), ("b", 5.0), ("c", f64::INFINITY)]);
        let selected = run_auction(candidates, 2, &mut rng);
        assert_eq!(selected.len(), 2);
        assert!(!selected.contains(&"b"));
    }

    #[test]
    fn fills_remaining_slots_without_duplicates() {
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let candidates = scored(&[
                ("m", f64::INFINITY),
                ("a", 1.0),
                ("b", 2.0),
                ("c", 0.0),
                ("d", 3.5),
            ]);
            let selected = run_auction(candidates, 3, &mut rng);
            assert_eq!(selected.len(), 3);
            assert!(selected.contains(&"m"));
            let unique: HashSet<_> = selected.iter().collect();
            assert_eq!(unique.len(), selected.len());
        }
    }

    #[test]
    fn zero_weight_pool_falls_back_to_uniform() {
        let mut rng = StdRng::seed_from_u64(3);
        let candidates = scored(&[("a", 0.0), ("b", 0.0), ("c", 0.0)]);
        let selected = sample_without_replacement(candidates, 2, &mut rng);
        assert_eq!(selected.len(), 2);
        assert_ne!(selected[0], selected[1]);
    }

    #[test]
    fn positive_weights_are_drawn_before_zero_weights() {
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let candidates = scored(&[("zero", 0.0), ("one", 1.0), ("two", 2.0)]);
            let selected = sample_without_replacement(candidates, 3, &mut rng);
            assert_eq!(selected.len(), 3);
            assert_eq!(selected[2], "zero");
        }
    }

    #[test]
    fn nan_and_negative_scores_weigh_nothing() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let candidates = scored(&[("nan", f64::NAN), ("neg", -4.0), ("pos", 0.1)]);
            let selected = sample_without_replacement(candidates, 1, &mut rng);
            assert_eq!(selected, vec!["pos"]);
        }
    }

    #[test]
    fn exhausted_pool_returns_fewer_than_slots() {
        let mut rng = StdRng::seed_from_u64(4);
        let selected = run_auction(scored(&[("a", 1.0)]), 5, &mut rng);
        assert_eq!(selected, vec!["a"]);
    }

    #[test]
    fn heavier_candidate_wins_most_single_slot_draws() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut heavy_wins = 0;
        for _ in 0..200 {
            let candidates = scored(&[("light", 1.0), ("heavy", 9.0)]);
            if sample_without_replacement(candidates, 1, &mut rng) == vec!["heavy"] {
                heavy_wins += 1;
            }
        }
        assert!(heavy_wins > 150, "heavy won {heavy_wins}/200");
    }
}
