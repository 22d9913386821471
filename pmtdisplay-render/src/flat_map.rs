//! Unrolled-cylinder mapping from element positions to flat pixels.
//!
//! The detector is a vertical cylinder (axis along y). Tubes above or below
//! the cap threshold sit on the top or bottom cap and keep their (x, z)
//! layout; barrel tubes are unrolled by azimuth, so their horizontal pixel
//! is the arc length `R·atan2(z, x)` and their vertical pixel is y.
//!
//! The map is built once from the full geometry. Each element is mapped
//! independently, so the build runs as a parallel iterator.

use std::collections::HashMap;

use pmtdisplay_core::{ElementIndex, Error, Geometry, Position, Result};
use rayon::prelude::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// |y| above which a tube belongs to a cap (cm).
pub const CAP_Y_THRESHOLD: f64 = 500.0;
/// Horizontal offset shared by caps and barrel (cm).
pub const X_OFFSET: f64 = 1162.7;
/// Vertical offset of the top cap (cm).
pub const TOP_CAP_Y_OFFSET: f64 = 2165.2;
/// Vertical offset of the bottom cap (cm).
pub const BOTTOM_CAP_Y_OFFSET: f64 = 370.1;
/// Vertical offset of the barrel (cm).
pub const BARREL_Y_OFFSET: f64 = 1267.7;

/// Part of the cylinder a tube sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Region {
    TopCap,
    BottomCap,
    Barrel,
}

impl Region {
    /// Classifies a tube by its y coordinate.
    #[inline]
    #[must_use]
    pub fn of(position: &Position) -> Self {
        if position.y > CAP_Y_THRESHOLD {
            Region::TopCap
        } else if position.y < -CAP_Y_THRESHOLD {
            Region::BottomCap
        } else {
            Region::Barrel
        }
    }
}

/// Unrounded flat position of a tube, given the barrel radius.
#[must_use]
pub fn project(position: &Position, radius: f64) -> (f64, f64, Region) {
    let region = Region::of(position);
    let (x, y) = match region {
        Region::TopCap => (position.x + X_OFFSET, TOP_CAP_Y_OFFSET + position.z),
        Region::BottomCap => (position.x + X_OFFSET, BOTTOM_CAP_Y_OFFSET + position.z),
        Region::Barrel => {
            let theta = position.z.atan2(position.x);
            (radius * theta + X_OFFSET, position.y + BARREL_Y_OFFSET)
        }
    };
    (x, y, region)
}

/// Integer pixel on the flat layout: `x` is the image column, `y` the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FlatCoord {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl FlatCoord {
    /// Creates a new flat coordinate.
    #[inline]
    #[must_use]
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Rounds a projected position to the nearest pixel (ties to even).
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_projection(x: f64, y: f64) -> Self {
        Self {
            x: x.round_ties_even() as i32,
            y: y.round_ties_even() as i32,
        }
    }
}

/// Bounding box of all mapped pixels (inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlatExtent {
    /// Leftmost column.
    pub min_x: i32,
    /// Rightmost column.
    pub max_x: i32,
    /// Lowest row.
    pub min_y: i32,
    /// Highest row.
    pub max_y: i32,
}

/// Element index to flat pixel, one entry per geometry element.
#[derive(Debug, Clone, Default)]
pub struct FlatMap {
    coords: HashMap<ElementIndex, FlatCoord>,
    radius: f64,
}

impl FlatMap {
    /// Maps every element of the geometry.
    ///
    /// The barrel radius is taken from the whole geometry before any element
    /// is mapped.
    #[must_use]
    pub fn from_geometry(geometry: &Geometry) -> Self {
        let radius = geometry.barrel_radius();
        let coords: HashMap<ElementIndex, FlatCoord> = geometry
            .elements()
            .par_iter()
            .map(|element| {
                let (x, y, _) = project(&element.position, radius);
                (element.index, FlatCoord::from_projection(x, y))
            })
            .collect();
        log::debug!(
            "flat map built for {} elements, barrel radius {radius:.1} cm",
            coords.len()
        );
        Self { coords, radius }
    }

    /// Flat pixel of an element.
    ///
    /// # Errors
    /// Returns [`Error::UnknownElement`] if the element is not in the map.
    #[inline]
    pub fn get(&self, index: ElementIndex) -> Result<FlatCoord> {
        self.coords
            .get(&index)
            .copied()
            .ok_or(Error::UnknownElement(index.as_u32()))
    }

    /// Barrel radius used for the unrolling.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Number of mapped elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    /// Returns true if no element is mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Iterates over all mappings in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (ElementIndex, FlatCoord)> + '_ {
        self.coords.iter().map(|(&k, &v)| (k, v))
    }

    /// Pixel bounding box, or `None` for an empty map.
    #[must_use]
    pub fn extent(&self) -> Option<FlatExtent> {
        self.coords.values().fold(None, |acc, c| {
            Some(match acc {
                None => FlatExtent {
                    min_x: c.x,
                    max_x: c.x,
                    min_y: c.y,
                    max_y: c.y,
                },
                Some(e) => FlatExtent {
                    min_x: e.min_x.min(c.x),
                    max_x: e.max_x.max(c.x),
                    min_y: e.min_y.min(c.y),
                    max_y: e.max_y.max(c.y),
                },
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_region_thresholds_are_strict() {
        assert_eq!(Region::of(&Position::new(0.0, 500.0, 0.0)), Region::Barrel);
        assert_eq!(Region::of(&Position::new(0.0, 500.1, 0.0)), Region::TopCap);
        assert_eq!(Region::of(&Position::new(0.0, -500.0, 0.0)), Region::Barrel);
        assert_eq!(
            Region::of(&Position::new(0.0, -500.1, 0.0)),
            Region::BottomCap
        );
    }

    #[test]
    fn test_barrel_projection() {
        // theta = pi/2 for a tube on +z.
        let (x, y, region) = project(&Position::new(0.0, 100.0, 300.0), 200.0);
        assert_eq!(region, Region::Barrel);
        assert_relative_eq!(x, 200.0 * std::f64::consts::FRAC_PI_2 + X_OFFSET);
        assert_relative_eq!(y, 100.0 + BARREL_Y_OFFSET);
    }

    #[test]
    fn test_rounding_ties_to_even() {
        assert_eq!(FlatCoord::from_projection(2.5, 3.5), FlatCoord::new(2, 4));
        assert_eq!(FlatCoord::from_projection(-0.6, 10.4), FlatCoord::new(-1, 10));
    }

    #[test]
    fn test_lookup_uses_zero_based_index() {
        let geo = Geometry::from_arrays(&[1, 2], &[[0.0, 600.0, 0.0], [0.0, -600.0, 0.0]])
            .unwrap();
        let map = FlatMap::from_geometry(&geo);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(ElementIndex(0)).unwrap(), FlatCoord::new(1163, 2165));
        assert_eq!(map.get(ElementIndex(1)).unwrap(), FlatCoord::new(1163, 370));
        assert!(matches!(
            map.get(ElementIndex(2)),
            Err(Error::UnknownElement(2))
        ));
    }

    #[test]
    fn test_extent() {
        assert!(FlatMap::default().extent().is_none());
        let geo = Geometry::from_arrays(
            &[1, 2],
            &[[-100.0, 600.0, 50.0], [100.0, -600.0, -50.0]],
        )
        .unwrap();
        let extent = FlatMap::from_geometry(&geo).extent().unwrap();
        assert_eq!(extent.min_x, 1063);
        assert_eq!(extent.max_x, 1263);
        assert_eq!(extent.min_y, 320);
        assert_eq!(extent.max_y, 2215);
    }
}
