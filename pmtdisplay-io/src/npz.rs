//! `.npz` archive readers.
//!
//! Arrays are looked up by name with or without the `.npy` suffix and
//! converted from the integer and float dtypes numpy commonly writes.
//! Event archives may store their ragged columns flattened or padded, see
//! [`crate::layout`].

use crate::layout::{
    self, EventOffsets, HITS_COUNT, HITS_INDEX, HIT_CHARGE, HIT_PMT, HIT_TIME, POSITION,
    TRACKS_COUNT, TRACKS_INDEX, TRACK_ENERGY, TRACK_PID, TRACK_START, TRACK_STOP, TUBE_NO,
};
use crate::mmap::MappedFile;
use crate::{Error, Result};
use ndarray::{Array, Array1, Array2, Array3, Dimension, Ix1, Ix2, Ix3, IxDyn, OwnedRepr};
use ndarray_npy::{NpzReader, ReadNpyError, ReadNpzError, ReadableElement};
use pmtdisplay_core::{Event, EventSource, Geometry, ParticleTrack};
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Reads one entry as `A`, or `None` if its dtype is not `A`.
fn try_read<A, D>(
    reader: &mut NpzReader<Cursor<MappedFile>>,
    entry: &str,
) -> std::result::Result<Option<Array<A, D>>, ReadNpzError>
where
    A: ReadableElement,
    D: Dimension,
{
    match reader.by_name::<OwnedRepr<A>, D>(entry) {
        Ok(array) => Ok(Some(array)),
        Err(ReadNpzError::Npy(ReadNpyError::WrongDescriptor(_))) => Ok(None),
        Err(err) => Err(err),
    }
}

/// An open `.npz` archive backed by a memory map.
pub struct NpzArchive {
    reader: NpzReader<Cursor<MappedFile>>,
    names: Vec<String>,
    path: PathBuf,
}

impl NpzArchive {
    /// Opens an archive and lists its arrays.
    ///
    /// # Errors
    /// Returns an error if the file cannot be mapped or is not a zip archive.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = MappedFile::open(&path)?;
        let mut reader = NpzReader::new(file.cursor())?;
        let names = reader.names()?;
        log::debug!(
            "opened {} ({} bytes): {} arrays",
            path.as_ref().display(),
            file.len(),
            names.len()
        );
        Ok(Self {
            reader,
            names,
            path: path.as_ref().to_path_buf(),
        })
    }

    /// Path of the archive.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Array names as stored in the archive.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Stored entry name for `name`, matching with or without `.npy`.
    fn entry(&self, name: &str) -> Option<String> {
        self.names
            .iter()
            .find(|entry| entry.as_str() == name || entry.strip_suffix(".npy") == Some(name))
            .cloned()
    }

    /// Returns true if the archive holds `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entry(name).is_some()
    }

    /// Reads an array as `f64`, or `None` if it is absent.
    ///
    /// # Errors
    /// Returns an error if the array cannot be decoded, has the wrong number
    /// of dimensions, or has an unsupported dtype.
    #[allow(clippy::cast_precision_loss)]
    pub fn read_f64<D: Dimension>(&mut self, name: &str) -> Result<Option<Array<f64, D>>> {
        let Some(entry) = self.entry(name) else {
            return Ok(None);
        };
        let reader = &mut self.reader;
        if let Some(array) = try_read::<f64, D>(reader, &entry)? {
            return Ok(Some(array));
        }
        if let Some(array) = try_read::<f32, D>(reader, &entry)? {
            return Ok(Some(array.mapv(f64::from)));
        }
        if let Some(array) = try_read::<i64, D>(reader, &entry)? {
            return Ok(Some(array.mapv(|v| v as f64)));
        }
        if let Some(array) = try_read::<i32, D>(reader, &entry)? {
            return Ok(Some(array.mapv(f64::from)));
        }
        if let Some(array) = try_read::<u32, D>(reader, &entry)? {
            return Ok(Some(array.mapv(f64::from)));
        }
        Err(Error::InvalidFormat(format!(
            "array '{name}' has an unsupported dtype (expected a float or integer type)"
        )))
    }

    /// Reads an integer array as `i64`, or `None` if it is absent.
    ///
    /// # Errors
    /// Returns an error if the array cannot be decoded, has the wrong number
    /// of dimensions, or is not an integer array.
    pub fn read_i64<D: Dimension>(&mut self, name: &str) -> Result<Option<Array<i64, D>>> {
        let Some(entry) = self.entry(name) else {
            return Ok(None);
        };
        let reader = &mut self.reader;
        if let Some(array) = try_read::<i64, D>(reader, &entry)? {
            return Ok(Some(array));
        }
        if let Some(array) = try_read::<i32, D>(reader, &entry)? {
            return Ok(Some(array.mapv(i64::from)));
        }
        if let Some(array) = try_read::<u32, D>(reader, &entry)? {
            return Ok(Some(array.mapv(i64::from)));
        }
        if let Some(array) = try_read::<u64, D>(reader, &entry)? {
            let converted: Option<Vec<i64>> =
                array.iter().map(|&v| i64::try_from(v).ok()).collect();
            let converted = converted
                .ok_or_else(|| Error::InvalidFormat(format!("array '{name}' overflows i64")))?;
            let array = Array::from_shape_vec(array.raw_dim(), converted)
                .map_err(|e| Error::InvalidFormat(format!("array '{name}': {e}")))?;
            return Ok(Some(array));
        }
        if let Some(array) = try_read::<i16, D>(reader, &entry)? {
            return Ok(Some(array.mapv(i64::from)));
        }
        if let Some(array) = try_read::<u16, D>(reader, &entry)? {
            return Ok(Some(array.mapv(i64::from)));
        }
        if let Some(array) = try_read::<u8, D>(reader, &entry)? {
            return Ok(Some(array.mapv(i64::from)));
        }
        Err(Error::InvalidFormat(format!(
            "array '{name}' has an unsupported dtype (expected an integer type)"
        )))
    }

    /// Reads a required 1-D float array.
    ///
    /// # Errors
    /// Returns [`Error::MissingArray`] if the array is absent.
    pub fn require_f64(&mut self, name: &str) -> Result<Array1<f64>> {
        self.read_f64::<Ix1>(name)?
            .ok_or_else(|| Error::MissingArray(name.to_string()))
    }

    /// Reads a required 1-D integer array.
    ///
    /// # Errors
    /// Returns [`Error::MissingArray`] if the array is absent.
    pub fn require_i64(&mut self, name: &str) -> Result<Array1<i64>> {
        self.read_i64::<Ix1>(name)?
            .ok_or_else(|| Error::MissingArray(name.to_string()))
    }

    /// Reads a required 2-D float array.
    ///
    /// # Errors
    /// Returns [`Error::MissingArray`] if the array is absent.
    pub fn require_f64_2d(&mut self, name: &str) -> Result<Array2<f64>> {
        self.read_f64::<Ix2>(name)?
            .ok_or_else(|| Error::MissingArray(name.to_string()))
    }

    /// Reads a required integer array of any dimensionality.
    ///
    /// # Errors
    /// Returns [`Error::MissingArray`] if the array is absent.
    pub fn require_i64_dyn(&mut self, name: &str) -> Result<Array<i64, IxDyn>> {
        self.read_i64::<IxDyn>(name)?
            .ok_or_else(|| Error::MissingArray(name.to_string()))
    }

    /// Reads a required N x 3 position array.
    ///
    /// # Errors
    /// Returns [`Error::MissingArray`] if the array is absent and
    /// [`Error::InvalidFormat`] if it is not N x 3.
    pub fn require_positions(&mut self, name: &str) -> Result<Vec<[f64; 3]>> {
        let array: Array2<f64> = self
            .read_f64::<Ix2>(name)?
            .ok_or_else(|| Error::MissingArray(name.to_string()))?;
        layout::positions(name, &array)
    }
}

/// Reads detector geometry from an `.npz` archive holding `tube_no` and
/// `position`.
///
/// # Errors
/// Returns an error if either array is missing or malformed, or the element
/// numbering is invalid.
pub fn read_npz_geometry<P: AsRef<Path>>(path: P) -> Result<Geometry> {
    let mut archive = NpzArchive::open(&path)?;
    let numbers = archive.require_i64(TUBE_NO)?.to_vec();
    let positions = archive.require_positions(POSITION)?;
    let geometry = Geometry::from_arrays(&numbers, &positions)?;
    log::info!(
        "loaded geometry from {}: {} elements",
        path.as_ref().display(),
        geometry.len()
    );
    Ok(geometry)
}

/// Converts a dynamic-rank array to a fixed rank.
fn fixed_rank<A, D: Dimension>(name: &str, array: Array<A, IxDyn>) -> Result<Array<A, D>> {
    array
        .into_dimensionality::<D>()
        .map_err(|err| Error::InvalidFormat(format!("array '{name}': {err}")))
}

/// Hit columns concatenated over all events, with their offsets.
#[derive(Debug, Clone)]
struct HitColumns {
    offsets: EventOffsets,
    pmt: Vec<u32>,
    charge: Vec<f64>,
    time: Vec<f64>,
}

impl HitColumns {
    /// Flattened columns. Without `event_hits_index` the archive holds a
    /// single event.
    fn flat(archive: &mut NpzArchive, pmt: &Array1<i64>) -> Result<Self> {
        let pmt = layout::element_indices(&pmt.to_vec())?;
        let charge = archive.require_f64(HIT_CHARGE)?.to_vec();
        let time = archive.require_f64(HIT_TIME)?.to_vec();
        if charge.len() != pmt.len() || time.len() != pmt.len() {
            return Err(Error::InvalidFormat(format!(
                "hit columns differ in length: {HIT_PMT} {}, {HIT_CHARGE} {}, {HIT_TIME} {}",
                pmt.len(),
                charge.len(),
                time.len()
            )));
        }
        let offsets = if archive.contains(HITS_INDEX) {
            let index = archive.require_i64(HITS_INDEX)?.to_vec();
            EventOffsets::from_index(HITS_INDEX, &index, pmt.len())?
        } else {
            log::debug!("{HITS_INDEX} absent, treating archive as a single event");
            EventOffsets::single(pmt.len())
        };
        Ok(Self {
            offsets,
            pmt,
            charge,
            time,
        })
    }

    /// Padded `[events, slots]` columns, one row per event.
    fn padded(archive: &mut NpzArchive, pmt: &Array2<i64>) -> Result<Self> {
        let charge = archive.require_f64_2d(HIT_CHARGE)?;
        let time = archive.require_f64_2d(HIT_TIME)?;
        if charge.dim() != pmt.dim() || time.dim() != pmt.dim() {
            return Err(Error::InvalidFormat(format!(
                "padded hit columns differ in shape: {HIT_PMT} {:?}, {HIT_CHARGE} {:?}, {HIT_TIME} {:?}",
                pmt.shape(),
                charge.shape(),
                time.shape()
            )));
        }
        let explicit = match archive.read_i64::<Ix1>(HITS_COUNT)? {
            Some(counts) => Some(counts.to_vec()),
            None => {
                log::debug!("{HITS_COUNT} absent, padded rows end at the first negative {HIT_PMT}");
                None
            }
        };
        let counts = layout::padded_counts(HITS_COUNT, explicit.as_deref(), pmt, |v| v < 0)?;
        let flat_pmt = layout::unpad(HIT_PMT, pmt, &counts)?;
        Ok(Self {
            offsets: EventOffsets::from_counts(&counts),
            pmt: layout::element_indices(&flat_pmt)?,
            charge: layout::unpad(HIT_CHARGE, &charge, &counts)?,
            time: layout::unpad(HIT_TIME, &time, &counts)?,
        })
    }
}

/// Flattened track columns with their offsets.
#[derive(Debug, Clone)]
struct TrackColumns {
    offsets: EventOffsets,
    tracks: Vec<ParticleTrack>,
}

/// All events of an `.npz` archive, decoded at open time.
#[derive(Debug, Clone)]
pub struct NpzEventArchive {
    path: PathBuf,
    hits: EventOffsets,
    pmt: Vec<u32>,
    charge: Vec<f64>,
    time: Vec<f64>,
    tracks: Option<TrackColumns>,
}

impl NpzEventArchive {
    /// Opens and decodes an event archive.
    ///
    /// A 1-D `digi_hit_pmt` selects the flattened layout, a 2-D one the
    /// padded layout.
    ///
    /// # Errors
    /// Returns [`Error::MissingArray`] if a hit column is absent and
    /// [`Error::InvalidFormat`] if columns, offsets or counts are
    /// inconsistent.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut archive = NpzArchive::open(&path)?;

        let pmt = archive.require_i64_dyn(HIT_PMT)?;
        let (hits, padded) = match pmt.ndim() {
            1 => (HitColumns::flat(&mut archive, &fixed_rank::<_, Ix1>(HIT_PMT, pmt)?)?, false),
            2 => (HitColumns::padded(&mut archive, &fixed_rank::<_, Ix2>(HIT_PMT, pmt)?)?, true),
            ndim => {
                return Err(Error::InvalidFormat(format!(
                    "{HIT_PMT} has {ndim} dimensions, expected 1 (flattened) or 2 (padded)"
                )))
            }
        };
        let single = !padded && !archive.contains(HITS_INDEX);

        let tracks = if padded {
            Self::read_padded_tracks(&mut archive)?
        } else {
            Self::read_tracks(&mut archive, single)?
        };
        if let Some(columns) = &tracks {
            if columns.offsets.len() != hits.offsets.len() {
                return Err(Error::InvalidFormat(format!(
                    "tracks cover {} events but hits cover {}",
                    columns.offsets.len(),
                    hits.offsets.len()
                )));
            }
        }

        log::info!(
            "loaded {} events ({} hits, {} layout) from {}",
            hits.offsets.len(),
            hits.pmt.len(),
            if padded { "padded" } else { "flattened" },
            path.as_ref().display()
        );
        Ok(Self {
            path: path.as_ref().to_path_buf(),
            hits: hits.offsets,
            pmt: hits.pmt,
            charge: hits.charge,
            time: hits.time,
            tracks,
        })
    }

    fn has_track_columns(archive: &NpzArchive) -> bool {
        [TRACK_PID, TRACK_ENERGY, TRACK_START, TRACK_STOP]
            .iter()
            .any(|name| archive.contains(name))
    }

    fn read_tracks(archive: &mut NpzArchive, single: bool) -> Result<Option<TrackColumns>> {
        if !Self::has_track_columns(archive) {
            return Ok(None);
        }
        let pid = layout::pdg_codes(&archive.require_i64(TRACK_PID)?.to_vec())?;
        let energy = archive.require_f64(TRACK_ENERGY)?.to_vec();
        let start = archive.require_positions(TRACK_START)?;
        let stop = archive.require_positions(TRACK_STOP)?;
        let tracks = layout::tracks(&pid, &energy, &start, &stop)?;

        let offsets = if archive.contains(TRACKS_INDEX) {
            EventOffsets::from_index(
                TRACKS_INDEX,
                &archive.require_i64(TRACKS_INDEX)?.to_vec(),
                tracks.len(),
            )?
        } else if single {
            EventOffsets::single(tracks.len())
        } else {
            return Err(Error::MissingArray(TRACKS_INDEX.to_string()));
        };
        Ok(Some(TrackColumns { offsets, tracks }))
    }

    /// Padded track columns: `[events, slots]` PDG codes and energies and
    /// `[events, slots, 3]` positions. Without `event_tracks_count` a row
    /// ends at the first PDG code of 0.
    fn read_padded_tracks(archive: &mut NpzArchive) -> Result<Option<TrackColumns>> {
        if !Self::has_track_columns(archive) {
            return Ok(None);
        }
        let pid: Array2<i64> = fixed_rank(TRACK_PID, archive.require_i64_dyn(TRACK_PID)?)?;
        let energy = archive.require_f64_2d(TRACK_ENERGY)?;
        let start: Array3<f64> = archive
            .read_f64::<Ix3>(TRACK_START)?
            .ok_or_else(|| Error::MissingArray(TRACK_START.to_string()))?;
        let stop: Array3<f64> = archive
            .read_f64::<Ix3>(TRACK_STOP)?
            .ok_or_else(|| Error::MissingArray(TRACK_STOP.to_string()))?;

        let explicit = archive.read_i64::<Ix1>(TRACKS_COUNT)?.map(|c| c.to_vec());
        let counts = layout::padded_counts(TRACKS_COUNT, explicit.as_deref(), &pid, |v| v == 0)?;
        let tracks = layout::tracks(
            &layout::pdg_codes(&layout::unpad(TRACK_PID, &pid, &counts)?)?,
            &layout::unpad(TRACK_ENERGY, &energy, &counts)?,
            &layout::unpad_positions(TRACK_START, &start, &counts)?,
            &layout::unpad_positions(TRACK_STOP, &stop, &counts)?,
        )?;
        Ok(Some(TrackColumns {
            offsets: EventOffsets::from_counts(&counts),
            tracks,
        }))
    }

    /// Path of the archive.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Total hits over all events.
    #[must_use]
    pub fn total_hits(&self) -> usize {
        self.pmt.len()
    }

    /// Returns true if the archive carries particle tracks.
    #[must_use]
    pub fn has_tracks(&self) -> bool {
        self.tracks.is_some()
    }
}

impl EventSource for NpzEventArchive {
    fn len(&self) -> usize {
        self.hits.len()
    }

    fn load(&self, index: usize) -> pmtdisplay_core::Result<Event> {
        let out_of_range = || pmtdisplay_core::Error::EventOutOfRange {
            index,
            len: self.hits.len(),
        };
        let rows = self.hits.range(index).ok_or_else(out_of_range)?;
        let event = Event::new(
            self.pmt[rows.clone()].to_vec(),
            self.charge[rows.clone()].to_vec(),
            self.time[rows].to_vec(),
        )?;
        let tracks = match &self.tracks {
            Some(columns) => {
                let rows = columns.offsets.range(index).ok_or_else(out_of_range)?;
                columns.tracks[rows].to_vec()
            }
            None => Vec::new(),
        };
        Ok(event.with_tracks(tracks))
    }
}
