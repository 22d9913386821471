//! Flat intensity image of one event quantity.
//!
//! Every accepted hit paints a square block (corners removed) around its
//! element's flat pixel. Hits are painted in recorded order and later hits
//! overwrite earlier ones; there is no blending.

use pmtdisplay_core::{DisplayRange, ElementIndex, Error, Result};

use crate::colormap::Colormap;
use crate::config::RenderConfig;
use crate::flat_map::{FlatMap, BARREL_Y_OFFSET, X_OFFSET};

/// Axis extent of the image in detector units: `[left, right, bottom, top]`.
pub const IMAGE_EXTENT: [f64; 4] = [-X_OFFSET, X_OFFSET, -BARREL_Y_OFFSET, BARREL_Y_OFFSET];

/// Horizontal axis label for flat images.
pub const X_AXIS_LABEL: &str = "Distance CCW on perimeter from x-axis (cm)";

/// Vertical axis label for flat images.
pub const Y_AXIS_LABEL: &str = "Y (cm)";

/// A row-major grid of painted hit values with its colour bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatImage {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
    vmin: f64,
    vmax: f64,
    painted_hits: usize,
    clipped_cells: usize,
}

impl FlatImage {
    /// Creates a zero-filled image.
    #[must_use]
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
            vmin: 0.0,
            vmax: 0.0,
            painted_hits: 0,
            clipped_cells: 0,
        }
    }

    /// Number of rows (flat y).
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns (flat x).
    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Row-major cell values.
    #[must_use]
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Value at `(row, col)`, or `None` outside the grid.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.rows && col < self.cols {
            Some(self.data[row * self.cols + col])
        } else {
            None
        }
    }

    /// Colour scale bounds `(vmin, vmax)`.
    #[must_use]
    pub fn bounds(&self) -> (f64, f64) {
        (self.vmin, self.vmax)
    }

    /// Number of hits that passed the range cut and were painted.
    #[must_use]
    pub fn painted_hits(&self) -> usize {
        self.painted_hits
    }

    /// Number of block cells that fell outside the grid.
    #[must_use]
    pub fn clipped_cells(&self) -> usize {
        self.clipped_cells
    }

    /// Paints one cell. Returns false if the cell is outside the grid.
    fn paint(&mut self, row: i64, col: i64, value: f64) -> bool {
        let (Ok(row), Ok(col)) = (usize::try_from(row), usize::try_from(col)) else {
            return false;
        };
        if row >= self.rows || col >= self.cols {
            return false;
        }
        self.data[row * self.cols + col] = value;
        true
    }

    /// Rasterize to RGBA bytes (row-major, row 0 first).
    #[must_use]
    pub fn to_rgba(&self, colormap: Colormap) -> Vec<u8> {
        let mut pixels = Vec::with_capacity(self.data.len() * 4);
        for &value in &self.data {
            pixels.extend_from_slice(&colormap.apply_in(value, self.vmin, self.vmax));
        }
        pixels
    }
}

/// Paints `values` at the flat pixels of `elements`.
///
/// Hits whose value lies outside a non-degenerate `range` are skipped. The
/// colour bounds are the range itself, or the data bounds of all `values`
/// when the range is auto.
///
/// # Errors
/// Returns [`Error::LengthMismatch`] if the columns differ in length and
/// [`Error::UnknownElement`] if a hit refers to an unmapped element.
pub fn render_image(
    map: &FlatMap,
    elements: &[u32],
    values: &[f64],
    range: DisplayRange,
    config: &RenderConfig,
) -> Result<FlatImage> {
    if values.len() != elements.len() {
        return Err(Error::LengthMismatch {
            what: "image values",
            expected: elements.len(),
            actual: values.len(),
        });
    }

    let mut image = FlatImage::new(config.image_rows, config.image_cols);
    let half = i64::from(config.block_half_width);

    for (&element, &value) in elements.iter().zip(values) {
        if !range.accepts(value) {
            continue;
        }
        let coord = map.get(ElementIndex(element))?;
        for dr in -half..=half {
            for dc in -half..=half {
                if dr.abs() == half && dc.abs() == half {
                    continue;
                }
                let row = i64::from(coord.y) + dr;
                let col = i64::from(coord.x) + dc;
                if !image.paint(row, col, value) {
                    image.clipped_cells += 1;
                }
            }
        }
        image.painted_hits += 1;
    }

    if image.clipped_cells > 0 {
        log::debug!("{} block cells fell outside the image", image.clipped_cells);
    }

    let (vmin, vmax) = range.resolve(values);
    image.vmin = vmin;
    image.vmax = vmax;
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pmtdisplay_core::Geometry;

    fn one_tube_map() -> FlatMap {
        // Element number 6 (index 5) on the top cap at flat (1163, 2165).
        let geo = Geometry::from_arrays(&[6], &[[0.0, 600.0, 0.0]]).unwrap();
        FlatMap::from_geometry(&geo)
    }

    #[test]
    fn test_block_shape_skips_corners() {
        let map = one_tube_map();
        let image = render_image(&map, &[5], &[4.0], DisplayRange::AUTO, &RenderConfig::default()).unwrap();
        let painted = image.data().iter().filter(|&&v| v == 4.0).count();
        assert_eq!(painted, 49 - 4);
        assert_eq!(image.get(2165, 1163), Some(4.0));
        assert_eq!(image.get(2165 + 3, 1163 + 2), Some(4.0));
        assert_eq!(image.get(2165 + 3, 1163 + 3), Some(0.0));
        assert_eq!(image.get(2165 - 3, 1163 - 3), Some(0.0));
    }

    #[test]
    fn test_clipping_at_grid_edge() {
        let map = one_tube_map();
        let config = RenderConfig {
            image_rows: 2166,
            image_cols: 2317,
            ..RenderConfig::default()
        };
        let image = render_image(&map, &[5], &[1.0], DisplayRange::AUTO, &config).unwrap();
        // Rows 2166..=2168 are outside: 3 rows of the block, corners excluded.
        assert_eq!(image.clipped_cells(), 5 + 7 + 7);
        assert_eq!(image.painted_hits(), 1);
    }

    #[test]
    fn test_unknown_element_fails() {
        let map = one_tube_map();
        let err = render_image(&map, &[9], &[1.0], DisplayRange::AUTO, &RenderConfig::default());
        assert!(matches!(err, Err(Error::UnknownElement(9))));
    }

    #[test]
    fn test_length_mismatch() {
        let map = one_tube_map();
        let err = render_image(&map, &[5, 5], &[1.0], DisplayRange::AUTO, &RenderConfig::default());
        assert!(matches!(err, Err(Error::LengthMismatch { .. })));
    }
}
