//! Per-event hit storage.
//!
//! Hits are stored in Structure of Arrays (`SoA`) form, the same layout the
//! archives use: one column of element indices and one column per scalar
//! quantity. Columns are validated to have equal lengths on construction.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::element::{ElementIndex, Position};
use crate::{Error, Result};

/// Scalar quantity recorded per hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Quantity {
    /// Collected charge (photoelectrons).
    Charge,
    /// Hit time (nanoseconds).
    Time,
}

impl Quantity {
    /// Axis label for plots of this quantity.
    #[must_use]
    pub fn axis_label(self) -> &'static str {
        match self {
            Quantity::Charge => "Charge (pe)",
            Quantity::Time => "Time (ns)",
        }
    }
}

impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Quantity::Charge => write!(f, "charge"),
            Quantity::Time => write!(f, "time"),
        }
    }
}

/// One recorded hit.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HitRecord {
    pub element: ElementIndex,
    pub charge: f64,
    pub time: f64,
}

impl HitRecord {
    /// Creates a new hit.
    #[inline]
    #[must_use]
    pub fn new(element: u32, charge: f64, time: f64) -> Self {
        Self {
            element: ElementIndex(element),
            charge,
            time,
        }
    }

    /// Value of the requested quantity.
    #[inline]
    #[must_use]
    pub fn value(&self, quantity: Quantity) -> f64 {
        match quantity {
            Quantity::Charge => self.charge,
            Quantity::Time => self.time,
        }
    }
}

/// A simulated particle trajectory, used by the 3D view only.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParticleTrack {
    /// PDG particle code.
    pub pid: i32,
    /// Energy (MeV).
    pub energy: f64,
    pub start: Position,
    pub stop: Position,
}

/// All hits of one event, plus optional particle tracks.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Event {
    pmt: Vec<u32>,
    charge: Vec<f64>,
    time: Vec<f64>,
    tracks: Vec<ParticleTrack>,
}

impl Event {
    /// Builds an event from parallel hit columns.
    ///
    /// # Errors
    /// Returns [`Error::LengthMismatch`] if the charge or time column does
    /// not match the element column.
    pub fn new(pmt: Vec<u32>, charge: Vec<f64>, time: Vec<f64>) -> Result<Self> {
        if charge.len() != pmt.len() {
            return Err(Error::LengthMismatch {
                what: "hit charges",
                expected: pmt.len(),
                actual: charge.len(),
            });
        }
        if time.len() != pmt.len() {
            return Err(Error::LengthMismatch {
                what: "hit times",
                expected: pmt.len(),
                actual: time.len(),
            });
        }
        Ok(Self {
            pmt,
            charge,
            time,
            tracks: Vec::new(),
        })
    }

    /// Builds an event from hit records.
    #[must_use]
    pub fn from_hits(hits: &[HitRecord]) -> Self {
        Self {
            pmt: hits.iter().map(|h| h.element.as_u32()).collect(),
            charge: hits.iter().map(|h| h.charge).collect(),
            time: hits.iter().map(|h| h.time).collect(),
            tracks: Vec::new(),
        }
    }

    /// Attaches particle tracks.
    #[must_use]
    pub fn with_tracks(mut self, tracks: Vec<ParticleTrack>) -> Self {
        self.tracks = tracks;
        self
    }

    /// Returns the number of hits.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pmt.len()
    }

    /// Returns true if the event has no hits.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pmt.is_empty()
    }

    /// 0-based element index column.
    #[must_use]
    pub fn elements(&self) -> &[u32] {
        &self.pmt
    }

    /// Column of the requested quantity.
    #[must_use]
    pub fn values(&self, quantity: Quantity) -> &[f64] {
        match quantity {
            Quantity::Charge => &self.charge,
            Quantity::Time => &self.time,
        }
    }

    /// Particle tracks, in archive order (index 0 is the primary).
    #[must_use]
    pub fn tracks(&self) -> &[ParticleTrack] {
        &self.tracks
    }

    /// Iterates over hits in recorded order.
    pub fn hits(&self) -> impl Iterator<Item = HitRecord> + '_ {
        self.pmt
            .iter()
            .zip(&self.charge)
            .zip(&self.time)
            .map(|((&pmt, &charge), &time)| HitRecord::new(pmt, charge, time))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_columns() {
        let event = Event::new(vec![4, 7], vec![1.5, 2.5], vec![10.0, 12.0]).unwrap();
        assert_eq!(event.len(), 2);
        assert_eq!(event.values(Quantity::Charge), &[1.5, 2.5]);
        assert_eq!(event.values(Quantity::Time), &[10.0, 12.0]);

        let hits: Vec<HitRecord> = event.hits().collect();
        assert_eq!(hits[1], HitRecord::new(7, 2.5, 12.0));
        assert_eq!(hits[1].value(Quantity::Time), 12.0);
    }

    #[test]
    fn test_event_length_mismatch() {
        let err = Event::new(vec![1, 2, 3], vec![1.0, 2.0], vec![0.0; 3]).unwrap_err();
        assert!(matches!(
            err,
            Error::LengthMismatch {
                expected: 3,
                actual: 2,
                ..
            }
        ));
        assert!(Event::new(vec![1], vec![1.0], vec![]).is_err());
    }

    #[test]
    fn test_from_hits_and_tracks() {
        let hits = [HitRecord::new(5, 10.0, 1.0), HitRecord::new(5, 20.0, 2.0)];
        let track = ParticleTrack {
            pid: 13,
            energy: 500.0,
            start: Position::default(),
            stop: Position::new(0.0, 100.0, 0.0),
        };
        let event = Event::from_hits(&hits).with_tracks(vec![track]);
        assert_eq!(event.elements(), &[5, 5]);
        assert_eq!(event.tracks().len(), 1);
        assert!(Event::default().is_empty());
    }
}
