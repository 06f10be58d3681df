//! Read access to a region's address hierarchy.

use std::path::PathBuf;

use thiserror::Error;

use super::object::{Building, City, Postcode, Street, StreetOwner};

/// Error raised while reading address data.
#[derive(Debug, Error)]
pub enum ReaderError {
    /// The reader was detached from its index.
    #[error("region reader is closed")]
    Closed,
    /// The backing file could not be read.
    #[error("failed to read region file {path}: {source}")]
    Io {
        /// Location of the region file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The region payload could not be decoded.
    #[cfg(feature = "serde")]
    #[error("failed to decode region file {path}: {source}")]
    Decode {
        /// Location of the region file.
        path: PathBuf,
        /// Decoder error returned by `bincode`.
        #[source]
        source: bincode::Error,
    },
    /// The file did not start with the expected header.
    #[error("invalid region file magic: expected {expected:?}, found {found:?}")]
    InvalidMagic {
        /// Expected byte sequence.
        expected: [u8; 4],
        /// Sequence read from the file.
        found: [u8; 4],
    },
    /// The file uses a format version this build cannot read.
    #[error("unsupported region file version {found}; supported version is {supported}")]
    UnsupportedVersion {
        /// Version present in the file header.
        found: u16,
        /// Version supported by this build.
        supported: u16,
    },
}

/// Source of cities, postcodes, streets and buildings for named regions.
///
/// Loaders return freshly built objects; the address index installs them in
/// the owning entity's lazy collection. Implementations are expected to list
/// towns before other settlement kinds from [`RegionReader::load_cities`].
pub trait RegionReader: Send + Sync {
    /// Resident settlements of `region`, villages excluded.
    fn load_cities(&self, region: &str) -> Result<Vec<City>, ReaderError>;

    /// Villages and hamlets of `region` whose name contains `query`.
    fn load_villages(&self, region: &str, query: &str) -> Result<Vec<City>, ReaderError>;

    /// Every postcode of `region`.
    fn load_postcodes(&self, region: &str) -> Result<Vec<Postcode>, ReaderError>;

    /// The postcode named `name`, compared case-insensitively.
    fn load_postcode_by_name(
        &self,
        region: &str,
        name: &str,
    ) -> Result<Option<Postcode>, ReaderError>;

    /// Streets of a city or postcode.
    fn load_streets(&self, owner: StreetOwner<'_>) -> Result<Vec<Street>, ReaderError>;

    /// Buildings of a street.
    fn load_buildings(&self, street: &Street) -> Result<Vec<Building>, ReaderError>;
}
