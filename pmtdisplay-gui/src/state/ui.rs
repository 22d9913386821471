//! Text-entry state for the toolbar controls.

use pmtdisplay_core::DisplayRange;

/// Contents of the editable toolbar fields.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// Event number field.
    pub event_entry: String,
    /// zmin field; the active view's quantity.
    pub zmin: String,
    /// zmax field.
    pub zmax: String,
    /// Time axis minimum, Q vs T view only.
    pub tmin: String,
    /// Time axis maximum, Q vs T view only.
    pub tmax: String,
    /// Plot coordinate under the pointer.
    pub cursor: Option<[f64; 2]>,
}

impl UiState {
    /// Fields for a freshly opened event.
    pub fn new(event: usize) -> Self {
        let (zmin, zmax) = range_text(DisplayRange::AUTO);
        let (tmin, tmax) = range_text(DisplayRange::AUTO);
        Self {
            event_entry: event.to_string(),
            zmin,
            zmax,
            tmin,
            tmax,
            cursor: None,
        }
    }
}

/// Field text for a range.
pub fn range_text(range: DisplayRange) -> (String, String) {
    (range.min.to_string(), range.max.to_string())
}

/// Parses a min/max field pair. Two empty fields mean auto.
///
/// # Errors
/// Returns a message for unparsable numbers or `min > max`.
pub fn parse_range(min: &str, max: &str) -> Result<DisplayRange, String> {
    let (min, max) = (min.trim(), max.trim());
    if min.is_empty() && max.is_empty() {
        return Ok(DisplayRange::AUTO);
    }
    let parse = |text: &str| {
        text.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| format!("'{text}' is not a number"))
    };
    let (min, max) = (parse(min)?, parse(max)?);
    if min > max {
        return Err(format!("zmin {min} is greater than zmax {max}"));
    }
    Ok(DisplayRange::new(min, max))
}

/// Parses the event number field. An empty field means "no number typed".
///
/// # Errors
/// Returns a message if the text is not a non-negative integer.
pub fn parse_event(entry: &str) -> Result<Option<usize>, String> {
    let entry = entry.trim();
    if entry.is_empty() {
        return Ok(None);
    }
    entry
        .parse::<usize>()
        .map(Some)
        .map_err(|_| format!("'{entry}' is not an event number"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_range() {
        assert!(parse_range("", "").unwrap().is_auto());
        assert!(parse_range("0", "0").unwrap().is_auto());
        assert_eq!(
            parse_range(" -2.5", "10 ").unwrap(),
            DisplayRange::new(-2.5, 10.0)
        );
        assert!(parse_range("5", "1").is_err());
        assert!(parse_range("a", "1").is_err());
        assert!(parse_range("1", "").is_err());
    }

    #[test]
    fn test_parse_event() {
        assert_eq!(parse_event("").unwrap(), None);
        assert_eq!(parse_event(" 12 ").unwrap(), Some(12));
        assert!(parse_event("-1").is_err());
    }

    #[test]
    fn test_new_state_shows_auto_ranges() {
        let state = UiState::new(3);
        assert_eq!(state.event_entry, "3");
        assert_eq!(state.zmin, "0");
        assert_eq!(state.zmax, "0");
    }
}
