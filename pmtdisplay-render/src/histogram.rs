//! Charge-versus-time 2D histogram.
//!
//! Counts are stored row-major by charge bin: `counts[q * n_time_bins + t]`.
//! Bins are equal width and half-open, except the last bin of each axis
//! which also includes the upper edge. Entries outside the axis bounds are
//! dropped.

use pmtdisplay_core::{DisplayRange, Error, Result};

use crate::colormap::Colormap;
use crate::config::RenderConfig;

/// Widens a zero-width axis by half a unit on each side.
#[allow(clippy::float_cmp)]
fn widen_degenerate((lo, hi): (f64, f64)) -> (f64, f64) {
    if lo == hi {
        (lo - 0.5, hi + 0.5)
    } else {
        (lo, hi)
    }
}

/// Bin index of `value` on an axis of `n` bins over `[lo, hi]`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::float_cmp
)]
fn bin_index(value: f64, (lo, hi): (f64, f64), n: usize) -> Option<usize> {
    if n == 0 || value.is_nan() || value < lo || value > hi {
        return None;
    }
    if value == hi {
        return Some(n - 1);
    }
    let bin = ((value - lo) / (hi - lo) * n as f64) as usize;
    Some(bin.min(n - 1))
}

/// A 2D histogram of hit charge (y axis) against hit time (x axis).
#[derive(Debug, Clone, PartialEq)]
pub struct ChargeTimeHistogram {
    /// Flattened counts, indexed `[charge_bin][time_bin]`.
    counts: Vec<u64>,

    /// Number of time bins (x).
    n_time_bins: usize,

    /// Number of charge bins (y).
    n_charge_bins: usize,

    /// Time axis bounds.
    time_range: (f64, f64),

    /// Charge axis bounds.
    charge_range: (f64, f64),
}

impl ChargeTimeHistogram {
    /// Create an empty histogram. Zero-width axes are widened to one unit.
    #[must_use]
    pub fn new(
        n_time_bins: usize,
        n_charge_bins: usize,
        time_range: (f64, f64),
        charge_range: (f64, f64),
    ) -> Self {
        Self {
            counts: vec![0u64; n_time_bins * n_charge_bins],
            n_time_bins,
            n_charge_bins,
            time_range: widen_degenerate(time_range),
            charge_range: widen_degenerate(charge_range),
        }
    }

    /// Add one entry. Returns false if it fell outside the axes.
    pub fn fill(&mut self, time: f64, charge: f64) -> bool {
        let Some(t) = bin_index(time, self.time_range, self.n_time_bins) else {
            return false;
        };
        let Some(q) = bin_index(charge, self.charge_range, self.n_charge_bins) else {
            return false;
        };
        self.counts[q * self.n_time_bins + t] += 1;
        true
    }

    /// Count in a bin.
    #[must_use]
    #[inline]
    pub fn get(&self, time_bin: usize, charge_bin: usize) -> Option<u64> {
        if time_bin < self.n_time_bins && charge_bin < self.n_charge_bins {
            Some(self.counts[charge_bin * self.n_time_bins + time_bin])
        } else {
            None
        }
    }

    /// Flattened counts, indexed `[charge_bin][time_bin]`.
    #[must_use]
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// Number of time bins.
    #[must_use]
    #[inline]
    pub fn n_time_bins(&self) -> usize {
        self.n_time_bins
    }

    /// Number of charge bins.
    #[must_use]
    #[inline]
    pub fn n_charge_bins(&self) -> usize {
        self.n_charge_bins
    }

    /// Time axis bounds.
    #[must_use]
    pub fn time_range(&self) -> (f64, f64) {
        self.time_range
    }

    /// Charge axis bounds.
    #[must_use]
    pub fn charge_range(&self) -> (f64, f64) {
        self.charge_range
    }

    /// Sum of all bins.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Largest bin count (0 when empty).
    #[must_use]
    pub fn max_count(&self) -> u64 {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    /// Rasterize to RGBA bytes, one pixel per bin, highest charge in row 0.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn to_rgba(&self, colormap: Colormap) -> Vec<u8> {
        let max = self.max_count() as f64;
        let mut pixels = Vec::with_capacity(self.counts.len() * 4);
        for q in (0..self.n_charge_bins).rev() {
            let row = &self.counts[q * self.n_time_bins..(q + 1) * self.n_time_bins];
            for &count in row {
                pixels.extend_from_slice(&colormap.apply_in(count as f64, 0.0, max));
            }
        }
        pixels
    }
}

/// Bins hits into a charge-versus-time histogram.
///
/// Each axis spans the data bounds of its column unless its range is
/// non-degenerate.
///
/// # Errors
/// Returns [`Error::LengthMismatch`] if the columns differ in length.
pub fn render_histogram(
    times: &[f64],
    charges: &[f64],
    time_range: DisplayRange,
    charge_range: DisplayRange,
    config: &RenderConfig,
) -> Result<ChargeTimeHistogram> {
    if charges.len() != times.len() {
        return Err(Error::LengthMismatch {
            what: "histogram charges",
            expected: times.len(),
            actual: charges.len(),
        });
    }

    let mut histogram = ChargeTimeHistogram::new(
        config.time_bins,
        config.charge_bins,
        time_range.resolve(times),
        charge_range.resolve(charges),
    );
    let dropped = times
        .iter()
        .zip(charges)
        .filter(|&(&t, &q)| !histogram.fill(t, q))
        .count();
    if dropped > 0 {
        log::debug!("{dropped} hits outside the histogram axes");
    }
    Ok(histogram)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bin_edges() {
        let mut hs = ChargeTimeHistogram::new(10, 10, (0.0, 10.0), (0.0, 10.0));
        assert!(hs.fill(0.0, 0.0));
        assert!(hs.fill(9.999, 5.0));
        assert!(hs.fill(10.0, 10.0));
        assert!(!hs.fill(10.001, 1.0));
        assert!(!hs.fill(-0.1, 1.0));
        assert_eq!(hs.get(0, 0), Some(1));
        assert_eq!(hs.get(9, 5), Some(1));
        assert_eq!(hs.get(9, 9), Some(1));
        assert_eq!(hs.total(), 3);
        assert_eq!(hs.get(10, 0), None);
    }

    #[test]
    fn test_degenerate_axis_is_widened() {
        let mut hs = ChargeTimeHistogram::new(100, 100, (5.0, 5.0), (2.0, 2.0));
        assert_eq!(hs.time_range(), (4.5, 5.5));
        assert!(hs.fill(5.0, 2.0));
        assert_eq!(hs.get(50, 50), Some(1));
    }

    #[test]
    fn test_to_rgba_puts_high_charge_first() {
        let mut hs = ChargeTimeHistogram::new(2, 2, (0.0, 2.0), (0.0, 2.0));
        hs.fill(0.5, 1.5);
        let rgba = hs.to_rgba(Colormap::Grayscale);
        assert_eq!(rgba.len(), 16);
        assert_eq!(&rgba[0..4], &[255, 255, 255, 255]);
        assert_eq!(&rgba[8..12], &[0, 0, 0, 255]);
    }
}
