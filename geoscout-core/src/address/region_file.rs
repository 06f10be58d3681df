//! Region archive format and the file-backed [`RegionReader`].
//!
//! A region file is a fixed header followed by a `bincode` payload:
//!
//! ```text
//! magic "GSRG" | version u16 (little endian) | RegionArchive
//! ```
//!
//! The archive lists regions with their settlements, postcodes, streets and
//! buildings. [`RegionFile`] decodes it once and serves every loader from
//! per-region maps built at open time.

use std::collections::HashMap;
use std::sync::Arc;
#[cfg(feature = "serde")]
use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::{Path, PathBuf},
};

#[cfg(feature = "serde")]
use bincode::{deserialize_from, serialize_into};
use geo::Coord;
#[cfg(feature = "serde")]
use thiserror::Error;

use super::object::{Building, City, CityKind, MapObject, MapObjectInfo, Postcode, Street, StreetOwner};
use super::reader::{ReaderError, RegionReader};
use crate::NameQuery;

/// File identifier for region archives.
pub const REGION_FILE_MAGIC: [u8; 4] = *b"GSRG";

/// Supported version of the region archive format.
pub const REGION_FILE_VERSION: u16 = 1;

/// Shared fields of an archived map object.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObjectRecord {
    /// Identifier.
    pub id: i64,
    /// Local name.
    pub name: String,
    /// English name; empty to derive one by transliteration.
    pub name_en: String,
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
}

impl ObjectRecord {
    /// Record without an English name.
    pub fn new(id: i64, name: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            id,
            name: name.into(),
            name_en: String::new(),
            lat,
            lon,
        }
    }

    /// Set the English name.
    #[must_use]
    pub fn with_name_en(mut self, name_en: impl Into<String>) -> Self {
        self.name_en = name_en.into();
        self
    }

    fn to_info(&self) -> MapObjectInfo {
        MapObjectInfo::new(
            self.id,
            self.name.clone(),
            Coord {
                x: self.lon,
                y: self.lat,
            },
        )
        .with_name_en(self.name_en.clone())
    }
}

/// An archived street and its buildings.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StreetRecord {
    /// Street fields.
    pub object: ObjectRecord,
    /// Buildings along the street.
    pub buildings: Vec<ObjectRecord>,
}

/// An archived settlement.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CityRecord {
    /// Settlement fields.
    pub object: ObjectRecord,
    /// Settlement classification.
    pub kind: CityKind,
    /// Streets of the settlement.
    pub streets: Vec<StreetRecord>,
}

/// An archived postcode.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PostcodeRecord {
    /// Postcode fields; the name is the code.
    pub object: ObjectRecord,
    /// Streets within the postcode.
    pub streets: Vec<StreetRecord>,
}

/// One region of the archive.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegionRecord {
    /// Region name used by the address index.
    pub name: String,
    /// Settlements of every kind.
    pub cities: Vec<CityRecord>,
    /// Postcodes.
    pub postcodes: Vec<PostcodeRecord>,
}

/// Root of a region file payload.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegionArchive {
    /// Archived regions.
    pub regions: Vec<RegionRecord>,
}

/// Error emitted when writing a region file.
#[cfg(feature = "serde")]
#[derive(Debug, Error)]
pub enum RegionFileWriteError {
    /// Writing bytes to disk failed.
    #[error("failed to write region file {path}: {source}")]
    Io {
        /// Destination file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The archive could not be encoded.
    #[error("failed to encode region file {path}: {source}")]
    Encode {
        /// Destination file path.
        path: PathBuf,
        /// Encoder failure from `bincode`.
        #[source]
        source: bincode::Error,
    },
}

#[cfg(feature = "serde")]
#[derive(serde::Serialize)]
struct RegionFilePayload<'a> {
    magic: [u8; 4],
    version: u16,
    archive: &'a RegionArchive,
}

/// Persist `archive` as a region file, truncating any existing file.
///
/// # Errors
///
/// Returns [`RegionFileWriteError`] when the file cannot be created, encoded
/// or flushed.
#[cfg(feature = "serde")]
pub fn write_region_file(path: &Path, archive: &RegionArchive) -> Result<(), RegionFileWriteError> {
    let io_error = |source: std::io::Error| RegionFileWriteError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_error)?;
    let mut writer = BufWriter::new(file);
    let payload = RegionFilePayload {
        magic: REGION_FILE_MAGIC,
        version: REGION_FILE_VERSION,
        archive,
    };
    serialize_into(&mut writer, &payload).map_err(|source| RegionFileWriteError::Encode {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(io_error)?;
    writer
        .into_inner()
        .map_err(|err| io_error(err.into_error()))?
        .sync_all()
        .map_err(io_error)
}

#[cfg(feature = "serde")]
fn read_archive<R: Read>(source: R, path: &Path) -> Result<RegionArchive, ReaderError> {
    let io_error = |source: std::io::Error| ReaderError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = BufReader::new(source);

    let mut magic = [0_u8; 4];
    reader.read_exact(&mut magic).map_err(io_error)?;
    if magic != REGION_FILE_MAGIC {
        return Err(ReaderError::InvalidMagic {
            expected: REGION_FILE_MAGIC,
            found: magic,
        });
    }

    let mut version_bytes = [0_u8; 2];
    reader.read_exact(&mut version_bytes).map_err(io_error)?;
    let version = u16::from_le_bytes(version_bytes);
    if version != REGION_FILE_VERSION {
        return Err(ReaderError::UnsupportedVersion {
            found: version,
            supported: REGION_FILE_VERSION,
        });
    }

    deserialize_from(&mut reader).map_err(|source| ReaderError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

fn settlement_rank(kind: CityKind) -> u8 {
    match kind {
        CityKind::Town => 0,
        CityKind::City => 1,
        CityKind::Suburb => 2,
        CityKind::Village | CityKind::Hamlet => 3,
    }
}

fn build_street(record: &StreetRecord, region: &Arc<str>) -> Street {
    Street::new(record.object.to_info()).in_region(Arc::clone(region))
}

fn build_city(record: &CityRecord, region: &Arc<str>) -> City {
    City::new(record.object.to_info(), record.kind).in_region(Arc::clone(region))
}

fn build_postcode(record: &PostcodeRecord, region: &Arc<str>) -> Postcode {
    Postcode::new(record.object.to_info()).in_region(Arc::clone(region))
}

/// Street and building lookups of one region.
#[derive(Debug)]
struct RegionEntry {
    name: Arc<str>,
    record: RegionRecord,
    city_streets: HashMap<i64, Vec<StreetRecord>>,
    postcode_streets: HashMap<String, Vec<StreetRecord>>,
    street_buildings: HashMap<i64, Vec<ObjectRecord>>,
}

impl RegionEntry {
    fn new(record: RegionRecord) -> Self {
        let mut entry = Self {
            name: Arc::from(record.name.as_str()),
            record: RegionRecord::default(),
            city_streets: HashMap::new(),
            postcode_streets: HashMap::new(),
            street_buildings: HashMap::new(),
        };
        for city in &record.cities {
            entry.index_streets(&city.streets);
            entry
                .city_streets
                .insert(city.object.id, city.streets.clone());
        }
        for postcode in &record.postcodes {
            entry.index_streets(&postcode.streets);
            entry
                .postcode_streets
                .insert(postcode.object.name.to_uppercase(), postcode.streets.clone());
        }
        entry.record = record;
        entry
    }

    fn index_streets(&mut self, streets: &[StreetRecord]) {
        for street in streets {
            self.street_buildings
                .insert(street.object.id, street.buildings.clone());
        }
    }
}

/// Region reader serving a decoded [`RegionArchive`].
///
/// Ids and postcodes only need to be unique within a region. Streets and
/// buildings are looked up in the region their owner is tagged with, so
/// owners built elsewhere must be tagged with `in_region` to resolve; an
/// untagged owner has no streets.
#[derive(Debug, Default)]
pub struct RegionFile {
    regions: HashMap<String, RegionEntry>,
}

impl RegionFile {
    /// Decode a region file from disk.
    ///
    /// # Errors
    ///
    /// Returns [`ReaderError`] when the file cannot be read, carries the
    /// wrong header or fails to decode.
    #[cfg(feature = "serde")]
    pub fn open(path: &Path) -> Result<Self, ReaderError> {
        let file = File::open(path).map_err(|source| ReaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file, path)
    }

    /// Decode a region file from an already opened source.
    ///
    /// `path` names the source in errors and logs.
    ///
    /// # Errors
    ///
    /// See [`RegionFile::open`].
    #[cfg(feature = "serde")]
    pub fn from_reader<R: Read>(source: R, path: &Path) -> Result<Self, ReaderError> {
        let archive = read_archive(source, path)?;
        log::debug!(
            "opened region file {} with {} regions",
            path.display(),
            archive.regions.len()
        );
        Ok(Self::from_archive(archive))
    }

    /// Serve an in-memory archive.
    #[must_use]
    pub fn from_archive(archive: RegionArchive) -> Self {
        let regions = archive
            .regions
            .into_iter()
            .map(|record| (record.name.clone(), RegionEntry::new(record)))
            .collect();
        Self { regions }
    }

    /// Names of the archived regions, sorted.
    #[must_use]
    pub fn region_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.regions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn region(&self, name: &str) -> Option<&RegionEntry> {
        self.regions.get(name)
    }
}

impl RegionReader for RegionFile {
    fn load_cities(&self, region: &str) -> Result<Vec<City>, ReaderError> {
        let Some(entry) = self.region(region) else {
            return Ok(Vec::new());
        };
        let mut records: Vec<&CityRecord> = entry
            .record
            .cities
            .iter()
            .filter(|city| !city.kind.is_village())
            .collect();
        records.sort_by_key(|city| settlement_rank(city.kind));
        Ok(records
            .into_iter()
            .map(|record| build_city(record, &entry.name))
            .collect())
    }

    fn load_villages(&self, region: &str, query: &str) -> Result<Vec<City>, ReaderError> {
        let Some(entry) = self.region(region) else {
            return Ok(Vec::new());
        };
        let query = NameQuery::new(query);
        Ok(entry
            .record
            .cities
            .iter()
            .filter(|city| city.kind.is_village())
            .map(|record| build_city(record, &entry.name))
            .filter(|city| {
                query.match_kind(city.name()).is_some() || query.match_kind(city.name_en()).is_some()
            })
            .collect())
    }

    fn load_postcodes(&self, region: &str) -> Result<Vec<Postcode>, ReaderError> {
        Ok(self
            .region(region)
            .map(|entry| {
                entry
                    .record
                    .postcodes
                    .iter()
                    .map(|record| build_postcode(record, &entry.name))
                    .collect()
            })
            .unwrap_or_default())
    }

    fn load_postcode_by_name(
        &self,
        region: &str,
        name: &str,
    ) -> Result<Option<Postcode>, ReaderError> {
        let code = name.to_uppercase();
        Ok(self.region(region).and_then(|entry| {
            entry
                .record
                .postcodes
                .iter()
                .find(|postcode| postcode.object.name.to_uppercase() == code)
                .map(|record| build_postcode(record, &entry.name))
        }))
    }

    fn load_streets(&self, owner: StreetOwner<'_>) -> Result<Vec<Street>, ReaderError> {
        let Some(entry) = owner.region().and_then(|region| self.region(region)) else {
            return Ok(Vec::new());
        };
        let records = match owner {
            StreetOwner::City(city) => entry.city_streets.get(&city.id()),
            StreetOwner::Postcode(postcode) => entry.postcode_streets.get(postcode.code()),
        };
        Ok(records
            .map(|streets| {
                streets
                    .iter()
                    .map(|record| build_street(record, &entry.name))
                    .collect()
            })
            .unwrap_or_default())
    }

    fn load_buildings(&self, street: &Street) -> Result<Vec<Building>, ReaderError> {
        Ok(street
            .region()
            .and_then(|region| self.region(region))
            .and_then(|entry| entry.street_buildings.get(&street.id()))
            .map(|buildings| {
                buildings
                    .iter()
                    .map(|record| Building::new(record.to_info()))
                    .collect()
            })
            .unwrap_or_default())
    }
}
