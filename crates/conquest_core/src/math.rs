//! Fixed-point math utilities for deterministic planning.
//!
//! Efficiency scores and selection probabilities use fixed-point
//! arithmetic so that a seeded planning pass picks the same units on
//! every platform.

use fixed::types::I32F32;

/// Fixed-point number type for efficiency and probability math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
/// Range: approximately -2,147,483,648 to 2,147,483,647
/// Precision: approximately 0.00000000023
pub type Fixed = I32F32;

/// One hundred, the upper bound of cumulative selection percentages.
pub const HUNDRED: Fixed = Fixed::from_bits(100 << 32);

/// Serde support for fixed-point numbers.
///
/// Serializes fixed-point numbers as their raw bit representation (i64)
/// to preserve exact precision across serialization boundaries.
pub mod fixed_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as its raw bit representation.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_bits().serialize(serializer)
    }

    /// Deserialize a fixed-point number from its raw bit representation.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = i64::deserialize(deserializer)?;
        Ok(Fixed::from_bits(bits))
    }
}

/// `numerator / denominator` as a fixed-point value.
///
/// A zero denominator yields zero rather than panicking; a unit that costs
/// nothing has no meaningful cost efficiency.
#[must_use]
pub fn ratio(numerator: i32, denominator: i32) -> Fixed {
    if denominator == 0 {
        return Fixed::ZERO;
    }
    Fixed::from_num(numerator)
        .checked_div(Fixed::from_num(denominator))
        .unwrap_or(Fixed::ZERO)
}

/// Share of `part` in `total`, scaled to `[0, 100]`.
#[must_use]
pub fn percentage(part: Fixed, total: Fixed) -> Fixed {
    if total <= Fixed::ZERO {
        return Fixed::ZERO;
    }
    part.checked_div(total)
        .and_then(|share| share.checked_mul(HUNDRED))
        .unwrap_or(Fixed::ZERO)
}
