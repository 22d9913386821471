//! Detector elements and geometry.
//!
//! Geometry archives number elements from 1, while hit records refer to
//! them from 0. [`ElementIndex`] is always the 0-based form; the only way to
//! build one from a geometry number is [`ElementIndex::from_geometry_number`].

use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// 0-based detector element index, as used by hit records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ElementIndex(pub u32);

impl ElementIndex {
    /// Creates an index from a 0-based hit value.
    #[inline]
    #[must_use]
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    /// Converts a 1-based geometry element number to the 0-based index.
    ///
    /// # Errors
    /// Returns [`Error::InvalidElementNumber`] for numbers below 1 or above
    /// `u32::MAX`.
    pub fn from_geometry_number(number: i64) -> Result<Self> {
        if number < 1 {
            return Err(Error::InvalidElementNumber(number));
        }
        u32::try_from(number - 1)
            .map(Self)
            .map_err(|_| Error::InvalidElementNumber(number))
    }

    /// Returns the 1-based geometry number of this element.
    #[inline]
    #[must_use]
    pub fn geometry_number(self) -> i64 {
        i64::from(self.0) + 1
    }

    /// Returns the raw 0-based value.
    #[inline]
    #[must_use]
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for ElementIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Position in detector coordinates (centimeters).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    /// Creates a new position.
    #[inline]
    #[must_use]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

impl From<[f64; 3]> for Position {
    fn from(v: [f64; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

/// A single photomultiplier tube.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DetectorElement {
    /// 0-based index, matching hit records.
    pub index: ElementIndex,
    /// Fixed position of the tube.
    pub position: Position,
}

/// Full detector geometry, loaded once per run.
#[derive(Debug, Clone, Default)]
pub struct Geometry {
    elements: Vec<DetectorElement>,
    lookup: HashMap<ElementIndex, usize>,
}

impl Geometry {
    /// Builds the geometry from parallel arrays of 1-based element numbers
    /// and positions.
    ///
    /// # Errors
    /// Fails if the arrays differ in length, a number is below 1, or the
    /// same number appears twice.
    pub fn from_arrays(numbers: &[i64], positions: &[[f64; 3]]) -> Result<Self> {
        if numbers.len() != positions.len() {
            return Err(Error::LengthMismatch {
                what: "geometry positions",
                expected: numbers.len(),
                actual: positions.len(),
            });
        }

        let elements = numbers
            .iter()
            .zip(positions)
            .map(|(&number, &xyz)| {
                Ok(DetectorElement {
                    index: ElementIndex::from_geometry_number(number)?,
                    position: Position::from(xyz),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Self::from_elements(elements)
    }

    /// Builds the geometry from already converted elements.
    ///
    /// # Errors
    /// Returns [`Error::DuplicateElement`] if two elements share an index.
    pub fn from_elements(elements: Vec<DetectorElement>) -> Result<Self> {
        let mut lookup = HashMap::with_capacity(elements.len());
        for (slot, element) in elements.iter().enumerate() {
            if lookup.insert(element.index, slot).is_some() {
                return Err(Error::DuplicateElement(element.index.as_u32() + 1));
            }
        }
        Ok(Self { elements, lookup })
    }

    /// All elements in archive order.
    #[must_use]
    pub fn elements(&self) -> &[DetectorElement] {
        &self.elements
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns true if the geometry has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Position of an element.
    ///
    /// # Errors
    /// Returns [`Error::UnknownElement`] if the index is not in the geometry.
    pub fn position(&self, index: ElementIndex) -> Result<Position> {
        self.lookup
            .get(&index)
            .map(|&slot| self.elements[slot].position)
            .ok_or(Error::UnknownElement(index.as_u32()))
    }

    /// Half the span of x over all elements: the barrel radius used when
    /// unrolling the cylinder. Zero for an empty geometry.
    #[must_use]
    pub fn barrel_radius(&self) -> f64 {
        let (min, max) = self
            .elements
            .iter()
            .map(|e| e.position.x)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| {
                (lo.min(x), hi.max(x))
            });
        if min.is_finite() && max.is_finite() {
            (max - min) / 2.0
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_geometry_number_conversion() {
        assert_eq!(ElementIndex::from_geometry_number(1).unwrap(), ElementIndex(0));
        assert_eq!(ElementIndex::from_geometry_number(42).unwrap(), ElementIndex(41));
        assert_eq!(ElementIndex(41).geometry_number(), 42);
        assert!(matches!(
            ElementIndex::from_geometry_number(0),
            Err(Error::InvalidElementNumber(0))
        ));
        assert!(ElementIndex::from_geometry_number(-3).is_err());
    }

    #[test]
    fn test_geometry_lookup_is_zero_based() {
        let geo = Geometry::from_arrays(
            &[1, 2, 3],
            &[[1.0, 0.0, 0.0], [2.0, 0.0, 0.0], [3.0, 0.0, 0.0]],
        )
        .unwrap();
        assert_eq!(geo.len(), 3);
        assert_relative_eq!(geo.position(ElementIndex(0)).unwrap().x, 1.0);
        assert_relative_eq!(geo.position(ElementIndex(2)).unwrap().x, 3.0);
        assert!(matches!(
            geo.position(ElementIndex(3)),
            Err(Error::UnknownElement(3))
        ));
    }

    #[test]
    fn test_geometry_rejects_bad_input() {
        assert!(matches!(
            Geometry::from_arrays(&[1, 2], &[[0.0; 3]]),
            Err(Error::LengthMismatch { .. })
        ));
        assert!(matches!(
            Geometry::from_arrays(&[4, 4], &[[0.0; 3], [1.0; 3]]),
            Err(Error::DuplicateElement(4))
        ));
    }

    #[test]
    fn test_barrel_radius() {
        let geo = Geometry::from_arrays(
            &[1, 2, 3],
            &[[-370.0, 0.0, 0.0], [100.0, 0.0, 0.0], [372.0, 10.0, 0.0]],
        )
        .unwrap();
        assert_relative_eq!(geo.barrel_radius(), 371.0);
        assert_relative_eq!(Geometry::default().barrel_radius(), 0.0);
    }
}
