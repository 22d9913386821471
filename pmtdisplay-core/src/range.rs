//! Display ranges with the degenerate-pair auto convention.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Inclusive `[min, max]` display range for one quantity.
///
/// A degenerate pair (`min == max`) means "auto-range from data". This also
/// applies to a zero-width range such as `[3, 3]`; there is no way to request
/// a single-value cut.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisplayRange {
    pub min: f64,
    pub max: f64,
}

impl DisplayRange {
    /// The default auto sentinel, `[0, 0]`.
    pub const AUTO: Self = Self { min: 0.0, max: 0.0 };

    /// Creates a new range.
    #[inline]
    #[must_use]
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Returns true if the range defers to the data.
    #[inline]
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn is_auto(&self) -> bool {
        self.min == self.max
    }

    /// Returns true if `value` survives the cut. Auto ranges keep everything.
    #[inline]
    #[must_use]
    pub fn accepts(&self, value: f64) -> bool {
        self.is_auto() || (value >= self.min && value <= self.max)
    }

    /// Resolves the bounds to display: the explicit range, or the data
    /// bounds of `values` when auto.
    #[must_use]
    pub fn resolve(&self, values: &[f64]) -> (f64, f64) {
        if self.is_auto() {
            data_bounds(values)
        } else {
            (self.min, self.max)
        }
    }
}

impl From<[f64; 2]> for DisplayRange {
    fn from(v: [f64; 2]) -> Self {
        Self::new(v[0], v[1])
    }
}

impl std::fmt::Display for DisplayRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_auto() {
            write!(f, "auto")
        } else {
            write!(f, "[{}, {}]", self.min, self.max)
        }
    }
}

/// Minimum and maximum of `values`, ignoring NaN.
///
/// An empty (or all-NaN) slice yields `(0.0, 0.0)`.
#[must_use]
pub fn data_bounds(values: &[f64]) -> (f64, f64) {
    let (min, max) = values
        .iter()
        .copied()
        .filter(|v| !v.is_nan())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if min <= max {
        (min, max)
    } else {
        (0.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degenerate_range_is_auto() {
        assert!(DisplayRange::AUTO.is_auto());
        assert!(DisplayRange::default().is_auto());
        assert!(DisplayRange::new(3.0, 3.0).is_auto());
        assert!(DisplayRange::new(-1.0, -1.0).is_auto());
        assert!(!DisplayRange::new(-1.0, 1.0).is_auto());
    }

    #[test]
    fn test_accepts_is_inclusive() {
        let range = DisplayRange::new(1.0, 2.0);
        assert!(range.accepts(1.0));
        assert!(range.accepts(2.0));
        assert!(!range.accepts(0.999));
        assert!(!range.accepts(2.001));
        assert!(DisplayRange::new(3.0, 3.0).accepts(1e9));
    }

    #[test]
    fn test_resolve() {
        let values = [4.0, -2.0, 7.5];
        assert_eq!(DisplayRange::new(3.0, 3.0).resolve(&values), (-2.0, 7.5));
        assert_eq!(DisplayRange::new(0.0, 5.0).resolve(&values), (0.0, 5.0));
        assert_eq!(DisplayRange::AUTO.resolve(&[]), (0.0, 0.0));
    }

    #[test]
    fn test_data_bounds_ignores_nan() {
        assert_eq!(data_bounds(&[f64::NAN, 1.0, 3.0]), (1.0, 3.0));
        assert_eq!(data_bounds(&[f64::NAN]), (0.0, 0.0));
    }
}
