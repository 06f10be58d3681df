//! Address hierarchy: postcodes and cities own streets, streets own
//! buildings.
//!
//! [`AddressIndex`] keeps one region's cities resident and loads streets and
//! buildings into their owners on first use through a [`RegionReader`].

mod index;
mod lazy;
mod object;
mod reader;
mod region_file;

pub use index::{AddressIndex, NO_CITY_ID};
pub use lazy::LazyChildren;
pub use object::{
    Building, City, CityKind, CitySuggestion, MapObject, MapObjectInfo, Postcode, Street,
    StreetOwner,
};
pub use reader::{ReaderError, RegionReader};
#[cfg(feature = "serde")]
pub use region_file::{RegionFileWriteError, write_region_file};
pub use region_file::{
    CityRecord, ObjectRecord, PostcodeRecord, REGION_FILE_MAGIC, REGION_FILE_VERSION,
    RegionArchive, RegionFile, RegionRecord, StreetRecord,
};
