//! Rendering configuration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::colormap::Colormap;

/// Tunables shared by all frame renderers.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RenderConfig {
    /// Rows of the flat image grid (flat y).
    pub image_rows: usize,
    /// Columns of the flat image grid (flat x).
    pub image_cols: usize,
    /// Half width of the square painted per hit; 3 gives a 7x7 block.
    pub block_half_width: i32,
    /// Time bins of the charge-vs-time histogram.
    pub time_bins: usize,
    /// Charge bins of the charge-vs-time histogram.
    pub charge_bins: usize,
    /// Scatter marker area per unit charge.
    pub marker_scale: f64,
    /// Colormap used when rasterizing frames.
    pub colormap: Colormap,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            image_rows: 2506,
            image_cols: 2317,
            block_half_width: 3,
            time_bins: 100,
            charge_bins: 100,
            marker_scale: 3.0,
            colormap: Colormap::CubehelixReversed,
        }
    }
}
