//! Random derangement generation for the gift draw.
//!
//! # Responsibility
//! - Map every participant to a distinct other participant.
//! - Guarantee termination for any input of at least two distinct ids.
//!
//! # Invariants
//! - Output is a permutation of the input with no fixed points.
//! - Inputs with fewer than two ids or repeated ids are rejected before any
//!   randomness is consumed.
//!
//! Greedy sequential picking can corner itself when the only id left in the
//! pool is the giver's own. Such attempts are discarded and restarted from
//! scratch. After `max_greedy_attempts` failures the generator switches to a
//! shuffled cyclic rotation, which is fixed-point free by construction.

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::hash::Hash;

/// Greedy attempts before falling back to cyclic rotation.
pub const MAX_GREEDY_ATTEMPTS: u32 = 64;

/// Minimum number of entrants for a valid draw.
pub const MIN_PARTICIPANTS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawError {
    /// Fewer than `MIN_PARTICIPANTS` entrants.
    InsufficientParticipants { count: usize },
    /// The same id was supplied more than once.
    DuplicateParticipant(String),
}

impl Display for DrawError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InsufficientParticipants { count } => write!(
                f,
                "at least {MIN_PARTICIPANTS} participants are required for a draw, got {count}"
            ),
            Self::DuplicateParticipant(id) => write!(f, "participant listed twice: {id}"),
        }
    }
}

impl Error for DrawError {}

/// Which construction produced a derangement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawStrategy {
    GreedyRetry,
    CyclicFallback,
}

impl DrawStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GreedyRetry => "greedy",
            Self::CyclicFallback => "cyclic_fallback",
        }
    }
}

/// A fixed-point free assignment over the input ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Derangement<T> {
    /// `(giver, recipient)` pairs in input order of givers.
    pub pairs: Vec<(T, T)>,
    pub strategy: DrawStrategy,
    /// Greedy attempts consumed, including the successful one.
    pub greedy_attempts: u32,
}

/// Draws a random derangement of `ids`.
///
/// # Errors
/// - `InsufficientParticipants` when `ids.len() < 2`.
/// - `DuplicateParticipant` when an id repeats.
pub fn derange<T, R>(
    ids: &[T],
    rng: &mut R,
    max_greedy_attempts: u32,
) -> Result<Derangement<T>, DrawError>
where
    T: Copy + Eq + Hash + Debug,
    R: Rng,
{
    if ids.len() < MIN_PARTICIPANTS {
        return Err(DrawError::InsufficientParticipants { count: ids.len() });
    }

    let mut seen = HashSet::with_capacity(ids.len());
    for id in ids {
        if !seen.insert(*id) {
            return Err(DrawError::DuplicateParticipant(format!("{id:?}")));
        }
    }

    for attempt in 1..=max_greedy_attempts {
        if let Some(pairs) = greedy_attempt(ids, rng) {
            return Ok(Derangement {
                pairs,
                strategy: DrawStrategy::GreedyRetry,
                greedy_attempts: attempt,
            });
        }
    }

    Ok(Derangement {
        pairs: cyclic_rotation(ids, rng),
        strategy: DrawStrategy::CyclicFallback,
        greedy_attempts: max_greedy_attempts,
    })
}

/// One pass of sequential picking. `None` when the pass cornered itself.
fn greedy_attempt<T, R>(ids: &[T], rng: &mut R) -> Option<Vec<(T, T)>>
where
    T: Copy + Eq,
    R: Rng,
{
    let mut remaining = ids.to_vec();
    let mut pairs = Vec::with_capacity(ids.len());

    for &giver in ids {
        let candidates: Vec<usize> = remaining
            .iter()
            .enumerate()
            .filter(|(_, candidate)| **candidate != giver)
            .map(|(index, _)| index)
            .collect();
        if candidates.is_empty() {
            return None;
        }

        let chosen = candidates[rng.random_range(0..candidates.len())];
        pairs.push((giver, remaining.swap_remove(chosen)));
    }

    Some(pairs)
}

/// Shuffles the ids and hands each one to its successor in that order.
fn cyclic_rotation<T, R>(ids: &[T], rng: &mut R) -> Vec<(T, T)>
where
    T: Copy + Eq + Hash,
    R: Rng,
{
    let mut order = ids.to_vec();
    order.shuffle(rng);

    let mut pairs: Vec<(T, T)> = order
        .iter()
        .enumerate()
        .map(|(index, giver)| (*giver, order[(index + 1) % order.len()]))
        .collect();

    // Report pairs in the caller's giver order.
    let rank: HashMap<T, usize> =
        ids.iter().enumerate().map(|(index, id)| (*id, index)).collect();
    pairs.sort_by_key(|(giver, _)| rank[giver]);
    pairs
}

#[cfg(test)]
mod tests {
    use super::{derange, DrawError, DrawStrategy, MAX_GREEDY_ATTEMPTS};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn assert_derangement(ids: &[u32], pairs: &[(u32, u32)]) {
        assert_eq!(pairs.len(), ids.len());
        let givers: Vec<u32> = pairs.iter().map(|(giver, _)| *giver).collect();
        assert_eq!(givers, ids, "givers must follow input order");

        let recipients: HashSet<u32> = pairs.iter().map(|(_, recipient)| *recipient).collect();
        assert_eq!(recipients.len(), ids.len(), "recipients must not repeat");
        for (giver, recipient) in pairs {
            assert_ne!(giver, recipient, "{giver} drew themselves");
            assert!(ids.contains(recipient));
        }
    }

    #[test]
    fn rejects_empty_and_single_inputs() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            derange::<u32, _>(&[], &mut rng, MAX_GREEDY_ATTEMPTS).unwrap_err(),
            DrawError::InsufficientParticipants { count: 0 }
        );
        assert_eq!(
            derange(&[7u32], &mut rng, MAX_GREEDY_ATTEMPTS).unwrap_err(),
            DrawError::InsufficientParticipants { count: 1 }
        );
    }

    #[test]
    fn rejects_duplicate_ids() {
        let mut rng = StdRng::seed_from_u64(2);
        let err = derange(&[1u32, 2, 1], &mut rng, MAX_GREEDY_ATTEMPTS).unwrap_err();
        assert!(matches!(err, DrawError::DuplicateParticipant(_)));
    }

    #[test]
    fn two_participants_swap() {
        let mut rng = StdRng::seed_from_u64(3);
        let result = derange(&[10u32, 20], &mut rng, MAX_GREEDY_ATTEMPTS).unwrap();
        assert_eq!(result.pairs, vec![(10, 20), (20, 10)]);
    }

    #[test]
    fn three_participants_always_form_a_cycle() {
        let ids = [1u32, 2, 3];
        let valid = [
            vec![(1, 2), (2, 3), (3, 1)],
            vec![(1, 3), (2, 1), (3, 2)],
        ];
        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let result = derange(&ids, &mut rng, MAX_GREEDY_ATTEMPTS).unwrap();
            assert!(valid.contains(&result.pairs), "seed {seed}: {:?}", result.pairs);
        }
    }

    #[test]
    fn many_sizes_produce_derangements() {
        for size in 2..40u32 {
            let ids: Vec<u32> = (0..size).collect();
            let mut rng = StdRng::seed_from_u64(u64::from(size));
            let result = derange(&ids, &mut rng, MAX_GREEDY_ATTEMPTS).unwrap();
            assert_derangement(&ids, &result.pairs);
            assert!(result.greedy_attempts >= 1);
        }
    }

    #[test]
    fn fallback_produces_derangement_when_greedy_is_disabled() {
        let ids: Vec<u32> = (100..125).collect();
        let mut rng = StdRng::seed_from_u64(9);
        let result = derange(&ids, &mut rng, 0).unwrap();
        assert_eq!(result.strategy, DrawStrategy::CyclicFallback);
        assert_eq!(result.greedy_attempts, 0);
        assert_derangement(&ids, &result.pairs);
    }

    #[test]
    fn same_seed_gives_same_draw() {
        let ids: Vec<u32> = (0..12).collect();
        let first = derange(&ids, &mut StdRng::seed_from_u64(42), MAX_GREEDY_ATTEMPTS).unwrap();
        let second = derange(&ids, &mut StdRng::seed_from_u64(42), MAX_GREEDY_ATTEMPTS).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn three_participants_reach_both_cycles() {
        let ids = [1u32, 2, 3];
        let outcomes: HashSet<Vec<(u32, u32)>> = (0..64)
            .map(|seed| {
                derange(&ids, &mut StdRng::seed_from_u64(seed), MAX_GREEDY_ATTEMPTS)
                    .unwrap()
                    .pairs
            })
            .collect();
        assert_eq!(outcomes.len(), 2);
    }
}
