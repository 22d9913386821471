//! HDF5 archive readers.
//!
//! Datasets use the same names as the `.npz` layout and live at the file
//! root. Offsets are read at open time; hit and track columns are sliced
//! per event on demand.

use crate::layout::{
    self, EventOffsets, HITS_INDEX, HIT_CHARGE, HIT_PMT, HIT_TIME, POSITION, TRACKS_INDEX,
    TRACK_ENERGY, TRACK_PID, TRACK_START, TRACK_STOP, TUBE_NO,
};
use crate::{Error, Result};
use hdf5::types::H5Type;
use hdf5::{Dataset, File};
use ndarray::s;
use pmtdisplay_core::{Event, EventSource, Geometry, ParticleTrack};
use std::ops::Range;
use std::path::{Path, PathBuf};

fn require_dataset(file: &File, name: &str) -> Result<Dataset> {
    if !file.link_exists(name) {
        return Err(Error::MissingArray(name.to_string()));
    }
    Ok(file.dataset(name)?)
}

fn read_dataset_vec<T: H5Type>(file: &File, name: &str) -> Result<Vec<T>> {
    let dataset = require_dataset(file, name)?;
    Ok(dataset.read_raw::<T>()?)
}

fn read_rows_1d<T: H5Type + Clone>(dataset: &Dataset, rows: Range<usize>) -> Result<Vec<T>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    Ok(dataset.read_slice_1d::<T, _>(s![rows])?.to_vec())
}

fn read_rows_positions(name: &str, dataset: &Dataset, rows: Range<usize>) -> Result<Vec<[f64; 3]>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let array = dataset.read_slice_2d::<f64, _>(s![rows, ..])?;
    layout::positions(name, &array)
}

fn dataset_rows(dataset: &Dataset) -> usize {
    dataset.shape().first().copied().unwrap_or(0)
}

/// Reads detector geometry from an HDF5 file holding `tube_no` and
/// `position`.
///
/// # Errors
/// Returns an error if either dataset is missing or malformed, or the
/// element numbering is invalid.
pub fn read_hdf5_geometry<P: AsRef<Path>>(path: P) -> Result<Geometry> {
    let file = File::open(&path)?;
    let numbers = read_dataset_vec::<i64>(&file, TUBE_NO)?;
    let positions = require_dataset(&file, POSITION)?.read_2d::<f64>()?;
    let positions = layout::positions(POSITION, &positions)?;
    let geometry = Geometry::from_arrays(&numbers, &positions)?;
    log::info!(
        "loaded geometry from {}: {} elements",
        path.as_ref().display(),
        geometry.len()
    );
    Ok(geometry)
}

/// Event archive in an HDF5 file, read lazily one event at a time.
pub struct Hdf5EventArchive {
    file: File,
    path: PathBuf,
    hits: EventOffsets,
    tracks: Option<EventOffsets>,
}

impl Hdf5EventArchive {
    /// Opens the file and validates the event offsets.
    ///
    /// # Errors
    /// Returns [`Error::MissingArray`] if a hit dataset is absent and
    /// [`Error::InvalidFormat`] if the datasets are inconsistent.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(&path)?;

        let n_hits = dataset_rows(&require_dataset(&file, HIT_PMT)?);
        for name in [HIT_CHARGE, HIT_TIME] {
            let rows = dataset_rows(&require_dataset(&file, name)?);
            if rows != n_hits {
                return Err(Error::InvalidFormat(format!(
                    "{name} has {rows} rows but {HIT_PMT} has {n_hits}"
                )));
            }
        }

        let single = !file.link_exists(HITS_INDEX);
        let hits = if single {
            EventOffsets::single(n_hits)
        } else {
            let index = read_dataset_vec::<i64>(&file, HITS_INDEX)?;
            EventOffsets::from_index(HITS_INDEX, &index, n_hits)?
        };

        let tracks = if file.link_exists(TRACK_PID) {
            let n_tracks = dataset_rows(&require_dataset(&file, TRACK_PID)?);
            for name in [TRACK_ENERGY, TRACK_START, TRACK_STOP] {
                let rows = dataset_rows(&require_dataset(&file, name)?);
                if rows != n_tracks {
                    return Err(Error::InvalidFormat(format!(
                        "{name} has {rows} rows but {TRACK_PID} has {n_tracks}"
                    )));
                }
            }
            let offsets = if file.link_exists(TRACKS_INDEX) {
                let index = read_dataset_vec::<i64>(&file, TRACKS_INDEX)?;
                EventOffsets::from_index(TRACKS_INDEX, &index, n_tracks)?
            } else if single {
                EventOffsets::single(n_tracks)
            } else {
                return Err(Error::MissingArray(TRACKS_INDEX.to_string()));
            };
            if offsets.len() != hits.len() {
                return Err(Error::InvalidFormat(format!(
                    "{TRACKS_INDEX} has {} events but {HITS_INDEX} has {}",
                    offsets.len(),
                    hits.len()
                )));
            }
            Some(offsets)
        } else {
            None
        };

        log::info!(
            "opened {}: {} events ({n_hits} hits)",
            path.as_ref().display(),
            hits.len()
        );
        Ok(Self {
            file,
            path: path.as_ref().to_path_buf(),
            hits,
            tracks,
        })
    }

    /// Path of the archive.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Total hits over all events.
    #[must_use]
    pub fn total_hits(&self) -> usize {
        self.hits.total()
    }

    fn read_event(&self, index: usize) -> Result<Event> {
        let rows = self
            .hits
            .range(index)
            .ok_or(pmtdisplay_core::Error::EventOutOfRange {
                index,
                len: self.hits.len(),
            })?;

        let pmt = read_rows_1d::<i64>(&self.file.dataset(HIT_PMT)?, rows.clone())?;
        let charge = read_rows_1d::<f64>(&self.file.dataset(HIT_CHARGE)?, rows.clone())?;
        let time = read_rows_1d::<f64>(&self.file.dataset(HIT_TIME)?, rows)?;
        let event = Event::new(layout::element_indices(&pmt)?, charge, time)?;

        let Some(offsets) = &self.tracks else {
            return Ok(event);
        };
        let rows = offsets.range(index).unwrap_or(0..0);
        let pid = read_rows_1d::<i64>(&self.file.dataset(TRACK_PID)?, rows.clone())?;
        let energy = read_rows_1d::<f64>(&self.file.dataset(TRACK_ENERGY)?, rows.clone())?;
        let start =
            read_rows_positions(TRACK_START, &self.file.dataset(TRACK_START)?, rows.clone())?;
        let stop = read_rows_positions(TRACK_STOP, &self.file.dataset(TRACK_STOP)?, rows)?;
        let tracks: Vec<ParticleTrack> =
            layout::tracks(&layout::pdg_codes(&pid)?, &energy, &start, &stop)?;
        Ok(event.with_tracks(tracks))
    }
}

impl EventSource for Hdf5EventArchive {
    fn len(&self) -> usize {
        self.hits.len()
    }

    fn load(&self, index: usize) -> pmtdisplay_core::Result<Event> {
        Ok(self.read_event(index)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn write_fixture(path: &Path) {
        let file = File::create(path).unwrap();
        file.new_dataset_builder()
            .with_data(&[0i64, 1, 2, 1])
            .create(HIT_PMT)
            .unwrap();
        file.new_dataset_builder()
            .with_data(&[1.0f64, 2.0, 3.0, 4.0])
            .create(HIT_CHARGE)
            .unwrap();
        file.new_dataset_builder()
            .with_data(&[10.0f64, 20.0, 30.0, 40.0])
            .create(HIT_TIME)
            .unwrap();
        file.new_dataset_builder()
            .with_data(&[0i64, 3])
            .create(HITS_INDEX)
            .unwrap();
    }

    #[test]
    fn test_lazy_event_slices() {
        let tmp = NamedTempFile::new().unwrap();
        write_fixture(tmp.path());

        let archive = Hdf5EventArchive::open(tmp.path()).unwrap();
        assert_eq!(archive.len(), 2);
        assert_eq!(archive.total_hits(), 4);

        let first = archive.load(0).unwrap();
        assert_eq!(first.elements(), &[0, 1, 2]);
        let second = archive.load(1).unwrap();
        assert_eq!(second.elements(), &[1]);
        assert_eq!(second.values(pmtdisplay_core::Quantity::Time), &[40.0]);
        assert!(second.tracks().is_empty());

        assert!(matches!(
            archive.load(2),
            Err(pmtdisplay_core::Error::EventOutOfRange { index: 2, len: 2 })
        ));
    }
}
