//! Numeric conversion utilities for pmtdisplay-gui.

/// Convert usize to f32 with allowed precision loss.
#[allow(clippy::cast_precision_loss)]
pub fn usize_to_f32(value: usize) -> f32 {
    value as f32
}

/// Convert usize to f64 with allowed precision loss.
#[allow(clippy::cast_precision_loss)]
pub fn usize_to_f64(value: usize) -> f64 {
    value as f64
}

/// Convert f64 to f32 for screen coordinates.
#[allow(clippy::cast_possible_truncation)]
pub fn f64_to_f32(value: f64) -> f32 {
    value as f32
}

/// Compact value label for axis and colour bar ticks.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn format_value(value: f64) -> String {
    if value == 0.0 || (1e-2..1e5).contains(&value.abs()) {
        format!("{value:.2}")
    } else {
        format!("{value:.2e}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(0.0), "0.00");
        assert_eq!(format_value(12.346), "12.35");
        assert_eq!(format_value(-3.5), "-3.50");
        assert_eq!(format_value(250_000.0), "2.50e5");
    }
}
