//! 3D scatter of hits at their tube positions, with particle tracks.

use pmtdisplay_core::{
    DisplayRange, ElementIndex, Error, Geometry, ParticleTrack, Position, Result,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::colormap::Colormap;
use crate::config::RenderConfig;

/// Particle species drawn as track overlays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Species {
    /// PDG 11.
    Electron,
    /// PDG 13.
    Muon,
    /// PDG 22.
    Photon,
}

impl Species {
    /// Species for a PDG code; only electrons (11), muons (13) and photons
    /// (22) are drawn.
    #[must_use]
    pub fn from_pid(pid: i32) -> Option<Self> {
        match pid {
            11 => Some(Species::Electron),
            13 => Some(Species::Muon),
            22 => Some(Species::Photon),
            _ => None,
        }
    }

    /// Line colour as RGB.
    #[must_use]
    pub fn color(self) -> [u8; 3] {
        match self {
            Species::Electron => [255, 0, 0],
            Species::Muon => [0, 255, 0],
            Species::Photon => [0, 255, 255],
        }
    }
}

impl std::fmt::Display for Species {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Species::Electron => write!(f, "electron"),
            Species::Muon => write!(f, "muon"),
            Species::Photon => write!(f, "photon"),
        }
    }
}

/// One hit marker.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScatterPoint {
    /// Element the hit belongs to.
    pub element: ElementIndex,
    /// Tube position in detector coordinates.
    pub position: Position,
    /// Marker area, proportional to charge.
    pub marker_size: f64,
    /// Hit time; drives the marker colour.
    pub time: f64,
}

/// One straight track segment with its energy label.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrackSegment {
    /// Particle species.
    pub species: Species,
    /// Track start.
    pub start: Position,
    /// Track stop.
    pub stop: Position,
    /// Kinetic energy in MeV.
    pub energy: f64,
    /// Label drawn at the start point.
    pub label: String,
}

/// Hits and tracks of one event in detector coordinates.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Scatter3D {
    points: Vec<ScatterPoint>,
    tracks: Vec<TrackSegment>,
    time_bounds: (f64, f64),
}

impl Scatter3D {
    /// Hit markers.
    #[must_use]
    pub fn points(&self) -> &[ScatterPoint] {
        &self.points
    }

    /// Track overlays.
    #[must_use]
    pub fn tracks(&self) -> &[TrackSegment] {
        &self.tracks
    }

    /// Colour scale bounds for time.
    #[must_use]
    pub fn time_bounds(&self) -> (f64, f64) {
        self.time_bounds
    }

    /// Marker colour of a point.
    #[must_use]
    pub fn color_of(&self, point: &ScatterPoint, colormap: Colormap) -> [u8; 4] {
        let (lo, hi) = self.time_bounds;
        colormap.apply_in(point.time, lo, hi)
    }
}

/// Track overlays for an event: the primary at index 0 is skipped, and only
/// electrons, muons and photons are kept.
#[must_use]
pub fn select_tracks(tracks: &[ParticleTrack]) -> Vec<TrackSegment> {
    tracks
        .iter()
        .skip(1)
        .filter_map(|track| {
            Species::from_pid(track.pid).map(|species| TrackSegment {
                species,
                start: track.start,
                stop: track.stop,
                energy: track.energy,
                label: format!("{:.1} MeV", track.energy),
            })
        })
        .collect()
}

/// Places hits at their tube positions, sized by charge and coloured by
/// time.
///
/// Hits whose time lies outside a non-degenerate `time_range` are dropped.
///
/// # Errors
/// Returns [`Error::LengthMismatch`] if the columns differ in length and
/// [`Error::UnknownElement`] if a hit refers to an element missing from the
/// geometry.
pub fn render_scatter(
    geometry: &Geometry,
    elements: &[u32],
    charges: &[f64],
    times: &[f64],
    time_range: DisplayRange,
    tracks: &[ParticleTrack],
    config: &RenderConfig,
) -> Result<Scatter3D> {
    for (what, len) in [("scatter charges", charges.len()), ("scatter times", times.len())] {
        if len != elements.len() {
            return Err(Error::LengthMismatch {
                what,
                expected: elements.len(),
                actual: len,
            });
        }
    }

    let points = elements
        .iter()
        .zip(charges)
        .zip(times)
        .filter(|&(_, &time)| time_range.accepts(time))
        .map(|((&element, &charge), &time)| {
            let element = ElementIndex(element);
            Ok(ScatterPoint {
                element,
                position: geometry.position(element)?,
                marker_size: charge * config.marker_scale,
                time,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let time_bounds = time_range.resolve(times);

    Ok(Scatter3D {
        points,
        tracks: select_tracks(tracks),
        time_bounds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(pid: i32, energy: f64) -> ParticleTrack {
        ParticleTrack {
            pid,
            energy,
            start: Position::default(),
            stop: Position::new(0.0, 0.0, 100.0),
        }
    }

    #[test]
    fn test_primary_track_is_skipped() {
        let tracks = [track(13, 800.0), track(11, 12.34), track(2112, 5.0), track(22, 3.0)];
        let segments = select_tracks(&tracks);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].species, Species::Electron);
        assert_eq!(segments[0].label, "12.3 MeV");
        assert_eq!(segments[1].species, Species::Photon);
        assert_eq!(segments[1].species.color(), [0, 255, 255]);
    }

    #[test]
    fn test_marker_size_and_time_cut() {
        let geo = Geometry::from_arrays(&[1, 2], &[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]).unwrap();
        let config = RenderConfig::default();
        let scatter = render_scatter(
            &geo,
            &[0, 1],
            &[2.0, 5.0],
            &[10.0, 50.0],
            DisplayRange::new(0.0, 20.0),
            &[],
            &config,
        )
        .unwrap();
        assert_eq!(scatter.points().len(), 1);
        assert_eq!(scatter.points()[0].marker_size, 6.0);
        assert_eq!(scatter.points()[0].position, Position::new(1.0, 2.0, 3.0));
        assert_eq!(scatter.time_bounds(), (0.0, 20.0));
    }

    #[test]
    fn test_unknown_element() {
        let geo = Geometry::from_arrays(&[1], &[[0.0; 3]]).unwrap();
        let result = render_scatter(
            &geo,
            &[1],
            &[1.0],
            &[1.0],
            DisplayRange::AUTO,
            &[],
            &RenderConfig::default(),
        );
        assert!(matches!(result, Err(Error::UnknownElement(1))));
    }
}
