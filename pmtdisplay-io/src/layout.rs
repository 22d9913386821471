//! Per-event column layouts.
//!
//! Ragged per-event columns are stored either flattened or padded.
//!
//! Flattened: one concatenated array plus an index array of start offsets.
//! Event `i` spans `[index[i], index[i + 1])` and the last event ends at the
//! array length.
//!
//! Padded: a `[events, slots]` array (`[events, slots, 3]` for positions)
//! whose row `i` holds event `i` in its leading entries. The number of used
//! entries comes from a count array when present, otherwise from the first
//! padding marker in the element (or PDG code) column.

use crate::{Error, Result};
use ndarray::{Array2, Array3};
use pmtdisplay_core::{ParticleTrack, Position};
use std::ops::Range;

/// Dataset holding the start offset of each event's hits.
pub const HITS_INDEX: &str = "event_hits_index";
/// Dataset holding the start offset of each event's tracks.
pub const TRACKS_INDEX: &str = "event_tracks_index";
/// Dataset holding the number of hits in each row of a padded layout.
pub const HITS_COUNT: &str = "event_hits_count";
/// Dataset holding the number of tracks in each row of a padded layout.
pub const TRACKS_COUNT: &str = "event_tracks_count";

/// Geometry element numbers (1-based).
pub const TUBE_NO: &str = "tube_no";
/// Geometry positions, N x 3.
pub const POSITION: &str = "position";

/// Hit element indices (0-based).
pub const HIT_PMT: &str = "digi_hit_pmt";
/// Hit charges.
pub const HIT_CHARGE: &str = "digi_hit_charge";
/// Hit times.
pub const HIT_TIME: &str = "digi_hit_time";

/// Track start positions, N x 3.
pub const TRACK_START: &str = "track_start_position";
/// Track stop positions, N x 3.
pub const TRACK_STOP: &str = "track_stop_position";
/// Track PDG codes.
pub const TRACK_PID: &str = "track_pid";
/// Track energies.
pub const TRACK_ENERGY: &str = "track_energy";

/// Validated event start offsets over a flattened column of `total` rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventOffsets {
    starts: Vec<usize>,
    total: usize,
}

impl EventOffsets {
    /// Validates an index array against the flattened length.
    ///
    /// # Errors
    /// Returns [`Error::InvalidFormat`] if an offset is negative, decreasing,
    /// or past `total`.
    pub fn from_index(name: &str, index: &[i64], total: usize) -> Result<Self> {
        let mut starts = Vec::with_capacity(index.len());
        let mut previous = 0usize;
        for (event, &raw) in index.iter().enumerate() {
            let start = usize::try_from(raw).map_err(|_| {
                Error::InvalidFormat(format!("{name}[{event}] is negative ({raw})"))
            })?;
            if start < previous {
                return Err(Error::InvalidFormat(format!(
                    "{name} is not ordered: {name}[{event}] = {start} < {previous}"
                )));
            }
            if start > total {
                return Err(Error::InvalidFormat(format!(
                    "{name}[{event}] = {start} exceeds column length {total}"
                )));
            }
            starts.push(start);
            previous = start;
        }
        Ok(Self { starts, total })
    }

    /// Offsets of consecutive events with the given lengths.
    #[must_use]
    pub fn from_counts(counts: &[usize]) -> Self {
        let mut starts = Vec::with_capacity(counts.len());
        let mut total = 0usize;
        for &count in counts {
            starts.push(total);
            total += count;
        }
        Self { starts, total }
    }

    /// One event spanning the whole column.
    #[must_use]
    pub fn single(total: usize) -> Self {
        Self {
            starts: vec![0],
            total,
        }
    }

    /// Number of events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.starts.len()
    }

    /// Returns true if there are no events.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }

    /// Length of the flattened column.
    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    /// Row range of one event.
    #[must_use]
    pub fn range(&self, event: usize) -> Option<Range<usize>> {
        let start = *self.starts.get(event)?;
        let end = self.starts.get(event + 1).copied().unwrap_or(self.total);
        Some(start..end)
    }
}

/// Converts a hit element column to 0-based element indices.
///
/// # Errors
/// Returns [`Error::InvalidFormat`] for negative or oversized entries.
pub(crate) fn element_indices(values: &[i64]) -> Result<Vec<u32>> {
    values
        .iter()
        .map(|&v| {
            u32::try_from(v)
                .map_err(|_| Error::InvalidFormat(format!("{HIT_PMT} entry {v} is not a valid index")))
        })
        .collect()
}

/// Converts a PDG code column.
///
/// # Errors
/// Returns [`Error::InvalidFormat`] for codes outside the `i32` range.
pub(crate) fn pdg_codes(values: &[i64]) -> Result<Vec<i32>> {
    values
        .iter()
        .map(|&v| {
            i32::try_from(v)
                .map_err(|_| Error::InvalidFormat(format!("{TRACK_PID} entry {v} out of range")))
        })
        .collect()
}

/// Rows of an N x 3 array as positions.
///
/// # Errors
/// Returns [`Error::InvalidFormat`] if the array is not N x 3.
pub(crate) fn positions(name: &str, array: &Array2<f64>) -> Result<Vec<[f64; 3]>> {
    if array.ncols() != 3 {
        return Err(Error::InvalidFormat(format!(
            "{name} must have 3 columns, found shape {:?}",
            array.shape()
        )));
    }
    Ok(array.rows().into_iter().map(|r| [r[0], r[1], r[2]]).collect())
}

/// Used entries per row of a padded layout.
///
/// With `explicit` counts each must lie in `0..=slots`; without them a row
/// ends at the first entry of `marker` for which `is_padding` holds.
///
/// # Errors
/// Returns [`Error::InvalidFormat`] if the counts do not match the rows or
/// exceed the row width.
pub(crate) fn padded_counts(
    name: &str,
    explicit: Option<&[i64]>,
    marker: &Array2<i64>,
    is_padding: impl Fn(i64) -> bool,
) -> Result<Vec<usize>> {
    let (rows, slots) = marker.dim();
    let Some(counts) = explicit else {
        return Ok(marker
            .rows()
            .into_iter()
            .map(|row| row.iter().position(|&v| is_padding(v)).unwrap_or(slots))
            .collect());
    };
    if counts.len() != rows {
        return Err(Error::InvalidFormat(format!(
            "{name} has {} entries but the padded columns have {rows} rows",
            counts.len()
        )));
    }
    counts
        .iter()
        .enumerate()
        .map(|(event, &raw)| {
            usize::try_from(raw)
                .ok()
                .filter(|&n| n <= slots)
                .ok_or_else(|| {
                    Error::InvalidFormat(format!(
                        "{name}[{event}] = {raw} is outside 0..={slots}"
                    ))
                })
        })
        .collect()
}

/// Concatenates the used leading entries of every row.
///
/// # Errors
/// Returns [`Error::InvalidFormat`] if the array has fewer rows than
/// `counts` or a row is narrower than its count.
pub(crate) fn unpad<T: Clone>(name: &str, array: &Array2<T>, counts: &[usize]) -> Result<Vec<T>> {
    let (rows, slots) = array.dim();
    if rows != counts.len() || counts.iter().any(|&n| n > slots) {
        return Err(Error::InvalidFormat(format!(
            "{name} has shape {:?}, too small for {} padded events",
            array.shape(),
            counts.len()
        )));
    }
    let mut flat = Vec::with_capacity(counts.iter().sum());
    for (row, &n) in array.rows().into_iter().zip(counts) {
        flat.extend(row.iter().take(n).cloned());
    }
    Ok(flat)
}

/// Concatenates the used leading positions of a `[events, slots, 3]` array.
///
/// # Errors
/// Returns [`Error::InvalidFormat`] for a wrong shape.
pub(crate) fn unpad_positions(
    name: &str,
    array: &Array3<f64>,
    counts: &[usize],
) -> Result<Vec<[f64; 3]>> {
    let (rows, slots, width) = array.dim();
    if width != 3 || rows != counts.len() || counts.iter().any(|&n| n > slots) {
        return Err(Error::InvalidFormat(format!(
            "{name} has shape {:?}, expected [{}, >=max count, 3]",
            array.shape(),
            counts.len()
        )));
    }
    let mut flat = Vec::with_capacity(counts.iter().sum());
    for (event, &n) in counts.iter().enumerate() {
        for slot in 0..n {
            flat.push([
                array[[event, slot, 0]],
                array[[event, slot, 1]],
                array[[event, slot, 2]],
            ]);
        }
    }
    Ok(flat)
}

/// Assembles tracks from parallel columns.
///
/// # Errors
/// Returns [`Error::InvalidFormat`] if the columns differ in length.
pub(crate) fn tracks(
    pid: &[i32],
    energy: &[f64],
    start: &[[f64; 3]],
    stop: &[[f64; 3]],
) -> Result<Vec<ParticleTrack>> {
    let n = pid.len();
    if energy.len() != n || start.len() != n || stop.len() != n {
        return Err(Error::InvalidFormat(format!(
            "track columns differ in length: pid {n}, energy {}, start {}, stop {}",
            energy.len(),
            start.len(),
            stop.len()
        )));
    }
    Ok((0..n)
        .map(|i| ParticleTrack {
            pid: pid[i],
            energy: energy[i],
            start: Position::from(start[i]),
            stop: Position::from(stop[i]),
        })
        .collect())
}
