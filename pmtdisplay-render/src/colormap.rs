//! Colormap definitions and application logic.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Available colormaps for frame rasterization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Colormap {
    /// Reversed cubehelix - white through purple and green to black.
    #[default]
    CubehelixReversed,
    /// Viridis (approximate) - blue to teal to green to yellow.
    Viridis,
    /// Hot (Thermal) - red to yellow to white.
    Hot,
    /// Grayscale - black to white.
    Grayscale,
}

impl Colormap {
    /// All colormaps, in menu order.
    pub const ALL: [Colormap; 4] = [
        Colormap::CubehelixReversed,
        Colormap::Viridis,
        Colormap::Hot,
        Colormap::Grayscale,
    ];
}

impl std::fmt::Display for Colormap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Colormap::CubehelixReversed => write!(f, "Cubehelix (reversed)"),
            Colormap::Viridis => write!(f, "Viridis"),
            Colormap::Hot => write!(f, "Hot (Thermal)"),
            Colormap::Grayscale => write!(f, "Grayscale"),
        }
    }
}

/// Convert f64 to u8 with clamping to [0, 255].
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn f64_to_u8(value: f64) -> u8 {
    let clamped = value.clamp(0.0, 255.0);
    clamped.round() as u8
}

/// Green's cubehelix with start 0.5, rotations -1.5, hue 1 and gamma 1.
fn cubehelix(val: f64) -> [f64; 3] {
    const START: f64 = 0.5;
    const ROTATIONS: f64 = -1.5;
    const HUE: f64 = 1.0;

    let amp = HUE * val * (1.0 - val) / 2.0;
    let phi = 2.0 * std::f64::consts::PI * (START / 3.0 + ROTATIONS * val);
    let (sin, cos) = phi.sin_cos();
    [
        val + amp * (-0.148_61 * cos + 1.782_77 * sin),
        val + amp * (-0.292_27 * cos - 0.906_49 * sin),
        val + amp * (1.972_94 * cos),
    ]
}

impl Colormap {
    /// Apply the colormap to a normalized value [0, 1] and return RGBA bytes.
    ///
    /// Values outside [0, 1] are clamped; NaN maps to the low end.
    #[must_use]
    pub fn apply(self, val: f64) -> [u8; 4] {
        let val = if val.is_nan() { 0.0 } else { val.clamp(0.0, 1.0) };
        match self {
            Colormap::CubehelixReversed => {
                let [r, g, b] = cubehelix(1.0 - val);
                [
                    f64_to_u8(r * 255.0),
                    f64_to_u8(g * 255.0),
                    f64_to_u8(b * 255.0),
                    255,
                ]
            }
            Colormap::Grayscale => {
                let v = f64_to_u8(val * 255.0);
                [v, v, v, 255]
            }
            Colormap::Hot => {
                if val < 0.5 {
                    let g = f64_to_u8(val * 2.0 * 255.0);
                    [255, g, 0, 255]
                } else {
                    let b = f64_to_u8((val - 0.5) * 2.0 * 255.0);
                    [255, 255, b, 255]
                }
            }
            Colormap::Viridis => {
                let r = f64_to_u8(255.0 * val.powi(2));
                let g = f64_to_u8(255.0 * val);
                let b = f64_to_u8(255.0 * (1.0 - val));
                [r, g, b, 255]
            }
        }
    }

    /// Map `value` linearly from `[lo, hi]` onto the colormap.
    ///
    /// A zero-width span maps everything to the low end.
    #[must_use]
    pub fn apply_in(self, value: f64, lo: f64, hi: f64) -> [u8; 4] {
        let span = hi - lo;
        let norm = if span > 0.0 { (value - lo) / span } else { 0.0 };
        self.apply(norm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cubehelix_reversed_endpoints() {
        // Low values are white, high values black.
        assert_eq!(Colormap::CubehelixReversed.apply(0.0), [255, 255, 255, 255]);
        assert_eq!(Colormap::CubehelixReversed.apply(1.0), [0, 0, 0, 255]);
    }

    #[test]
    fn test_apply_clamps() {
        assert_eq!(Colormap::Grayscale.apply(-3.0), [0, 0, 0, 255]);
        assert_eq!(Colormap::Grayscale.apply(7.0), [255, 255, 255, 255]);
        assert_eq!(Colormap::Grayscale.apply(f64::NAN), [0, 0, 0, 255]);
    }

    #[test]
    fn test_apply_in_zero_span() {
        assert_eq!(
            Colormap::Grayscale.apply_in(5.0, 5.0, 5.0),
            Colormap::Grayscale.apply(0.0)
        );
        assert_eq!(
            Colormap::Grayscale.apply_in(10.0, 0.0, 20.0),
            [128, 128, 128, 255]
        );
    }
}
