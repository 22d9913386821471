//! View selection and the frame renderer.
//!
//! [`Renderer`] owns the geometry and its flat map for the whole run and
//! turns the current event into a [`Frame`] for the selected [`ViewKind`].

use pmtdisplay_core::{DisplayRange, Event, Geometry, Quantity, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::RenderConfig;
use crate::flat_map::FlatMap;
use crate::histogram::{render_histogram, ChargeTimeHistogram};
use crate::image::{render_image, FlatImage};
use crate::scatter::{render_scatter, Scatter3D};

/// Which display is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ViewKind {
    /// Flat image of hit charges.
    #[default]
    Charge,
    /// Flat image of hit times.
    Time,
    /// Charge versus time histogram.
    ChargeVsTime,
    /// Hits at their 3D tube positions.
    Scatter3D,
}

impl ViewKind {
    /// All views, in button order.
    pub const ALL: [ViewKind; 4] = [
        ViewKind::Charge,
        ViewKind::Time,
        ViewKind::ChargeVsTime,
        ViewKind::Scatter3D,
    ];

    /// Short button label.
    #[must_use]
    pub fn short_label(self) -> &'static str {
        match self {
            ViewKind::Charge => "Q",
            ViewKind::Time => "T",
            ViewKind::ChargeVsTime => "QT",
            ViewKind::Scatter3D => "3D",
        }
    }

    /// Plot title for an event.
    #[must_use]
    pub fn title(self, event_number: usize) -> String {
        match self {
            ViewKind::Charge => format!("Charges for event {event_number}"),
            ViewKind::Time => format!("Times for event {event_number}"),
            ViewKind::ChargeVsTime => format!("Q vs T for event {event_number}"),
            ViewKind::Scatter3D => format!("Hits for event {event_number}"),
        }
    }

    /// Quantity whose range the z-range controls edit for this view.
    #[must_use]
    pub fn z_quantity(self) -> Quantity {
        match self {
            ViewKind::Charge | ViewKind::ChargeVsTime => Quantity::Charge,
            ViewKind::Time | ViewKind::Scatter3D => Quantity::Time,
        }
    }
}

impl std::fmt::Display for ViewKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewKind::Charge => write!(f, "Charge"),
            ViewKind::Time => write!(f, "Time"),
            ViewKind::ChargeVsTime => write!(f, "Charge vs Time"),
            ViewKind::Scatter3D => write!(f, "3D"),
        }
    }
}

/// One display range per quantity.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ViewRanges {
    /// Charge range, used by the charge image and the histogram y axis.
    pub charge: DisplayRange,
    /// Time range, used by the time image, the histogram x axis and the
    /// 3D time cut.
    pub time: DisplayRange,
}

impl ViewRanges {
    /// Range of a quantity.
    #[must_use]
    pub fn get(&self, quantity: Quantity) -> DisplayRange {
        match quantity {
            Quantity::Charge => self.charge,
            Quantity::Time => self.time,
        }
    }

    /// Mutable range of a quantity.
    pub fn get_mut(&mut self, quantity: Quantity) -> &mut DisplayRange {
        match quantity {
            Quantity::Charge => &mut self.charge,
            Quantity::Time => &mut self.time,
        }
    }
}

/// A rendered artifact.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// Charge or time image.
    Image(FlatImage),
    /// Charge versus time histogram.
    Histogram(ChargeTimeHistogram),
    /// 3D hit scatter.
    Scatter(Scatter3D),
}

/// Holds the run-wide geometry and flat map and renders events.
#[derive(Debug, Clone)]
pub struct Renderer {
    geometry: Geometry,
    flat_map: FlatMap,
    config: RenderConfig,
}

impl Renderer {
    /// Builds the flat map once from the geometry.
    #[must_use]
    pub fn new(geometry: Geometry, config: RenderConfig) -> Self {
        let flat_map = FlatMap::from_geometry(&geometry);
        Self {
            geometry,
            flat_map,
            config,
        }
    }

    /// The detector geometry.
    #[must_use]
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// The flat map built from the geometry.
    #[must_use]
    pub fn flat_map(&self) -> &FlatMap {
        &self.flat_map
    }

    /// Rendering configuration.
    #[must_use]
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Mutable rendering configuration.
    pub fn config_mut(&mut self) -> &mut RenderConfig {
        &mut self.config
    }

    /// Renders `event` for `view`.
    ///
    /// # Errors
    /// Returns [`pmtdisplay_core::Error::UnknownElement`] if a hit refers to
    /// an element outside the geometry.
    pub fn render(&self, view: ViewKind, event: &Event, ranges: &ViewRanges) -> Result<Frame> {
        let frame = match view {
            ViewKind::Charge | ViewKind::Time => {
                let quantity = view.z_quantity();
                Frame::Image(render_image(
                    &self.flat_map,
                    event.elements(),
                    event.values(quantity),
                    ranges.get(quantity),
                    &self.config,
                )?)
            }
            ViewKind::ChargeVsTime => Frame::Histogram(render_histogram(
                event.values(Quantity::Time),
                event.values(Quantity::Charge),
                ranges.time,
                ranges.charge,
                &self.config,
            )?),
            ViewKind::Scatter3D => Frame::Scatter(render_scatter(
                &self.geometry,
                event.elements(),
                event.values(Quantity::Charge),
                event.values(Quantity::Time),
                ranges.time,
                event.tracks(),
                &self.config,
            )?),
        };
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_titles_and_labels() {
        assert_eq!(ViewKind::Charge.title(3), "Charges for event 3");
        assert_eq!(ViewKind::ChargeVsTime.title(0), "Q vs T for event 0");
        assert_eq!(ViewKind::Scatter3D.short_label(), "3D");
    }

    #[test]
    fn test_z_quantity() {
        assert_eq!(ViewKind::Charge.z_quantity(), Quantity::Charge);
        assert_eq!(ViewKind::Time.z_quantity(), Quantity::Time);
        assert_eq!(ViewKind::Scatter3D.z_quantity(), Quantity::Time);
    }

    #[test]
    fn test_ranges_by_quantity() {
        let mut ranges = ViewRanges::default();
        *ranges.get_mut(Quantity::Time) = DisplayRange::new(1.0, 2.0);
        assert_eq!(ranges.time, DisplayRange::new(1.0, 2.0));
        assert!(ranges.get(Quantity::Charge).is_auto());
    }
}
