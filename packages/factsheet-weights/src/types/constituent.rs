//! Constituent weights and the plausibility band.

use serde::{Deserialize, Serialize};

/// Lower bound of an acceptable weight sum (percent).
pub const WEIGHT_SUM_MIN: f64 = 90.0;

/// Upper bound of an acceptable weight sum (percent).
pub const WEIGHT_SUM_MAX: f64 = 110.0;

/// One asset and its percentage weight within a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstituentWeight {
    /// Ticker or canonical asset label
    pub name: String,

    /// Percentage, 0 < weight <= 100
    pub weight: f64,
}

impl ConstituentWeight {
    /// Create a new constituent.
    pub fn new(name: impl Into<String>, weight: f64) -> Self {
        Self {
            name: name.into(),
            weight,
        }
    }

    /// A single-asset holding at 100%.
    pub fn whole(name: impl Into<String>) -> Self {
        Self::new(name, 100.0)
    }
}

/// Sum of all weights.
pub fn weight_sum(constituents: &[ConstituentWeight]) -> f64 {
    constituents.iter().map(|c| c.weight).sum()
}

/// Whether `sum` lies inside the [90, 110] band.
pub fn is_plausible_sum(sum: f64) -> bool {
    (WEIGHT_SUM_MIN..=WEIGHT_SUM_MAX).contains(&sum)
}

/// Non-empty and inside the plausibility band.
pub fn is_plausible(constituents: &[ConstituentWeight]) -> bool {
    !constituents.is_empty() && is_plausible_sum(weight_sum(constituents))
}

/// Round to two decimals, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Rescale weights so they sum to 100 when the raw sum is plausible.
///
/// Sums outside the band are returned unchanged so the caller can see
/// the result is implausible. A sum of exactly 100 is left untouched.
pub fn normalize_to_100(constituents: Vec<ConstituentWeight>) -> Vec<ConstituentWeight> {
    let sum = weight_sum(&constituents);
    if !is_plausible_sum(sum) || sum == 100.0 {
        return constituents;
    }
    let factor = 100.0 / sum;
    constituents
        .into_iter()
        .map(|c| ConstituentWeight::new(c.name, round2(c.weight * factor)))
        .collect()
}
