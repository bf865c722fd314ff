//! Efficiency-weighted random choice.
//!
//! Each option gets a slice of `[0, 100)` proportional to its efficiency.
//! A uniform draw from the injected generator picks the slice. Options are
//! visited in the order given, so a seeded generator always makes the same
//! choice for the same table.

use rand::Rng;

use crate::error::{GameError, Result};
use crate::math::{percentage, Fixed, HUNDRED};

/// Pick one option with probability proportional to its efficiency.
///
/// # Errors
///
/// Returns [`GameError::EmptySelection`] for an empty table and
/// [`GameError::InvalidWeights`] when a weight is negative, every weight is
/// zero, or the weights overflow.
pub fn select_weighted<'a, K, R: Rng>(
    efficiencies: &'a [(K, Fixed)],
    rng: &mut R,
) -> Result<&'a K> {
    let total = total_weight(efficiencies)?;
    let draw = Fixed::from_bits(rng.random_range(0..HUNDRED.to_bits()));
    tracing::trace!(%total, %draw, options = efficiencies.len(), "weighted draw");

    let mut cumulative = Fixed::ZERO;
    for (key, efficiency) in efficiencies {
        cumulative = cumulative.saturating_add(percentage(*efficiency, total));
        if *efficiency > Fixed::ZERO && cumulative >= draw {
            return Ok(key);
        }
    }
    // Rounding can leave the cumulative share just short of the draw.
    efficiencies
        .last()
        .map(|(key, _)| key)
        .ok_or(GameError::EmptySelection)
}

/// Pick the option with the highest efficiency; ties keep the earliest.
///
/// # Errors
///
/// Same contract as [`select_weighted`].
pub fn select_best<K>(efficiencies: &[(K, Fixed)]) -> Result<&K> {
    total_weight(efficiencies)?;
    let mut best: Option<&(K, Fixed)> = None;
    for entry in efficiencies {
        if best.map_or(true, |b| entry.1 > b.1) {
            best = Some(entry);
        }
    }
    best.map(|(key, _)| key).ok_or(GameError::EmptySelection)
}

fn total_weight<K>(efficiencies: &[(K, Fixed)]) -> Result<Fixed> {
    if efficiencies.is_empty() {
        return Err(GameError::EmptySelection);
    }
    let mut total = Fixed::ZERO;
    for (index, (_, efficiency)) in efficiencies.iter().enumerate() {
        if *efficiency < Fixed::ZERO {
            return Err(GameError::InvalidWeights(format!(
                "weight {index} is negative ({efficiency})"
            )));
        }
        total = total
            .checked_add(*efficiency)
            .ok_or_else(|| GameError::InvalidWeights("weights overflow".to_string()))?;
    }
    if total == Fixed::ZERO {
        return Err(GameError::InvalidWeights("all weights are zero".to_string()));
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn table(weights: &[(&'static str, i32)]) -> Vec<(&'static str, Fixed)> {
        weights
            .iter()
            .map(|&(key, w)| (key, Fixed::from_num(w)))
            .collect()
    }

    #[test]
    fn test_distribution_follows_weights() {
        let options = table(&[("A", 75), ("B", 25)]);
        let mut rng = StdRng::seed_from_u64(42);
        let draws = 100_000;
        let mut a = 0;
        for _ in 0..draws {
            if *select_weighted(&options, &mut rng).unwrap() == "A" {
                a += 1;
            }
        }
        let b = draws - a;
        assert!((74_000..=76_000).contains(&a), "A picked {a} times");
        let ratio = f64::from(a) / f64::from(b);
        assert!((2.8..=3.2).contains(&ratio), "ratio {ratio}");
    }

    #[test]
    fn test_same_seed_same_choices() {
        let options = table(&[("A", 1), ("B", 2), ("C", 3)]);
        let run = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..50)
                .map(|_| *select_weighted(&options, &mut rng).unwrap())
                .collect::<Vec<_>>()
        };
        assert_eq!(run(7), run(7));
    }

    #[test]
    fn test_zero_weight_never_chosen() {
        let options = table(&[("never", 0), ("always", 5)]);
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..1_000 {
            assert_eq!(*select_weighted(&options, &mut rng).unwrap(), "always");
        }
    }

    #[test]
    fn test_contract_violations() {
        let mut rng = StdRng::seed_from_u64(1);
        let empty: Vec<(&str, Fixed)> = Vec::new();
        assert!(matches!(
            select_weighted(&empty, &mut rng),
            Err(GameError::EmptySelection)
        ));
        assert!(matches!(
            select_weighted(&table(&[("A", 0), ("B", 0)]), &mut rng),
            Err(GameError::InvalidWeights(_))
        ));
        assert!(matches!(
            select_weighted(&table(&[("A", 3), ("B", -1)]), &mut rng),
            Err(GameError::InvalidWeights(_))
        ));
    }

    #[test]
    fn test_select_best_keeps_first_on_tie() {
        let options = table(&[("A", 2), ("B", 5), ("C", 5)]);
        assert_eq!(*select_best(&options).unwrap(), "B");
    }
}
