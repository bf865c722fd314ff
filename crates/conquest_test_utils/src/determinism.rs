//! Determinism testing utilities.
//!
//! Provides a harness for verifying that a planning pass
//! produces identical plans given identical inputs.
//!
//! # Testing Strategy
//!
//! A planning pass must be a pure function of the snapshot, the player
//! and the seed. Sources of non-determinism include:
//!
//! - **Floating-point math**: Efficiency scores use fixed-point arithmetic
//!   via [`conquest_core::math::Fixed`] throughout.
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   Territories, options and tallies are always iterated in id order.
//!
//! - **System randomness**: Seeded passes draw only from their own
//!   generator.
//!
//! - **Shared state**: The snapshot is borrowed immutably, so a pass can
//!   never see another pass's tentative purchases.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: Same seed, same plan
//! 2. **Property tests**: Random snapshots still plan deterministically
//! 3. **Parallel tests**: Running N passes on N threads all match

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use conquest_core::ai::{PlannerConfig, PurchasePlan, PurchasePlanner};
use conquest_core::player::PlayerId;
use conquest_core::snapshot::GameSnapshot;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
}

impl DeterminismResult {
    fn from_hashes(hashes: Vec<u64>) -> Self {
        Self {
            is_deterministic: hashes.windows(2).all(|w| w[0] == w[1]),
            hashes,
        }
    }

    /// Get all unique hashes (should be 1 for a deterministic pass).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that every run agreed, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Planning is non-deterministic!\n\
                 Runs: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a computation multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run
/// * `setup` - Function to create the input
/// * `run` - Function producing the output from the input
/// * `hash` - Function to fingerprint the output
///
/// # Example
///
/// ```ignore
/// use conquest_test_utils::determinism::verify_determinism;
///
/// let result = verify_determinism(
///     5,
///     || standard_snapshot(40),
///     |snapshot| plan_for(snapshot, RED, 7),
///     plan_hash,
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, O, Setup, Run, HashFn>(
    runs: usize,
    setup: Setup,
    run: Run,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Run: Fn(&S) -> O,
    HashFn: Fn(&O) -> u64,
{
    let hashes = (0..runs)
        .map(|_| {
            let input = setup();
            hash(&run(&input))
        })
        .collect();
    DeterminismResult::from_hashes(hashes)
}

/// Plan once with a seeded, randomized planner.
///
/// # Panics
///
/// Panics if the pass fails.
#[must_use]
pub fn plan_for(snapshot: &GameSnapshot, player: PlayerId, seed: u64) -> PurchasePlan {
    plan_with(snapshot, player, PlannerConfig::seeded(seed))
}

/// Plan once with an explicit configuration.
///
/// # Panics
///
/// Panics if the pass fails.
#[must_use]
pub fn plan_with(snapshot: &GameSnapshot, player: PlayerId, config: PlannerConfig) -> PurchasePlan {
    match PurchasePlanner::new(snapshot, config).plan(player) {
        Ok(plan) => plan,
        Err(e) => panic!("planning pass for {player} failed: {e}"),
    }
}

/// Fingerprint of a plan's serialized form.
///
/// # Panics
///
/// Panics if the plan cannot be serialized.
#[must_use]
pub fn plan_hash(plan: &PurchasePlan) -> u64 {
    match bincode::serialize(plan) {
        Ok(bytes) => compute_hash(&bytes),
        Err(e) => panic!("plan serialization failed: {e}"),
    }
}

/// Plan `runs` times with the same seed and compare the plans.
#[must_use]
pub fn verify_plan_determinism(
    snapshot: &GameSnapshot,
    player: PlayerId,
    seed: u64,
    runs: usize,
) -> DeterminismResult {
    verify_determinism(
        runs,
        || snapshot.clone(),
        |s| plan_for(s, player, seed),
        plan_hash,
    )
}

/// Run N passes on scoped threads and collect plan hashes.
///
/// Each thread plans against its own clone of the snapshot. This catches
/// non-determinism that only shows up under thread scheduling or memory
/// layout differences.
#[must_use]
pub fn run_parallel_plans(
    snapshot: &GameSnapshot,
    player: PlayerId,
    seed: u64,
    num_passes: usize,
) -> DeterminismResult {
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..num_passes)
            .map(|_| {
                s.spawn(|| {
                    let local = snapshot.clone();
                    plan_hash(&plan_for(&local, player, seed))
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| match h.join() {
                Ok(hash) => hash,
                Err(_) => panic!("planning thread panicked"),
            })
            .collect()
    });
    DeterminismResult::from_hashes(hashes)
}

/// Verify that a pass leaves the snapshot byte-for-byte unchanged.
///
/// # Panics
///
/// Panics if the snapshot cannot be serialized.
#[must_use]
pub fn verify_snapshot_untouched(snapshot: &GameSnapshot, player: PlayerId, seed: u64) -> bool {
    let before = match snapshot.serialize() {
        Ok(bytes) => bytes,
        Err(e) => panic!("snapshot serialization failed: {e}"),
    };
    let _plan = plan_for(snapshot, player, seed);
    match snapshot.serialize() {
        Ok(after) => after == before,
        Err(_) => false,
    }
}

/// Verify that a bincode round trip keeps the snapshot's state hash.
#[must_use]
pub fn verify_serialization_determinism(snapshot: &GameSnapshot) -> bool {
    let Ok(hash_before) = snapshot.state_hash() else {
        return false;
    };
    let Ok(bytes) = snapshot.serialize() else {
        return false;
    };
    let Ok(restored) = GameSnapshot::deserialize(&bytes) else {
        return false;
    };
    restored.state_hash().is_ok_and(|hash_after| hash_after == hash_before)
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::players::{BLUE, RED};
    use crate::fixtures::standard_snapshot;
    use crate::strategies::{arb_planning_case, arb_seed};
    use proptest::prelude::*;

    #[test]
    fn test_verify_determinism_simple() {
        let result = verify_determinism(3, || 40u64, |n| n * 2, |n| *n);

        assert!(result.is_deterministic);
        assert_eq!(result.hashes, vec![80, 80, 80]);
    }

    #[test]
    fn test_non_determinism_is_reported() {
        let result = DeterminismResult::from_hashes(vec![1, 2, 1]);
        assert!(!result.is_deterministic);
        assert_eq!(result.unique_hashes(), vec![1, 2]);
    }

    #[test]
    #[should_panic(expected = "non-deterministic")]
    fn test_assert_deterministic_panics_on_mismatch() {
        DeterminismResult::from_hashes(vec![1, 2]).assert_deterministic();
    }

    #[test]
    fn test_standard_map_plans_are_repeatable() {
        let snapshot = standard_snapshot(40);
        verify_plan_determinism(&snapshot, RED, 11, 4).assert_deterministic();
        verify_plan_determinism(&snapshot, BLUE, 11, 4).assert_deterministic();
    }

    #[test]
    fn test_parallel_plans_match() {
        let snapshot = standard_snapshot(60);
        run_parallel_plans(&snapshot, RED, 3, 8).assert_deterministic();
    }

    #[test]
    fn test_snapshot_untouched_by_planning() {
        assert!(verify_snapshot_untouched(&standard_snapshot(40), RED, 5));
    }

    #[test]
    fn test_serialization_preserves_state_hash() {
        assert!(verify_serialization_determinism(&standard_snapshot(25)));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_random_cases_plan_deterministically(case in arb_planning_case()) {
            let snapshot = case.snapshot();
            let result = verify_plan_determinism(&snapshot, RED, case.seed, 2);
            prop_assert!(result.is_deterministic, "hashes {:?}", result.hashes);
        }

        #[test]
        fn prop_any_seed_leaves_snapshot_untouched(seed in arb_seed()) {
            prop_assert!(verify_snapshot_untouched(&standard_snapshot(50), RED, seed));
        }
    }
}
