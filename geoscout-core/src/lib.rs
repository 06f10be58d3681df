//! Core types for the geoscout engine.
//!
//! Two query paths live here:
//!
//! - [`AmenityCache`] answers "every amenity in this box matching this
//!   filter" from a cached, expanded region and re-queries its
//!   [`AmenityStore`] only when the viewport, zoom or filter leave it.
//! - [`AddressIndex`] suggests cities, postcodes, streets and buildings for
//!   partial names, loading each level of the hierarchy from a
//!   [`RegionReader`] on first use.
//!
//! Everything is synchronous and `Send + Sync`; hosts wanting responsiveness
//! run calls on worker threads.

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod address;
mod amenity;
mod bbox;
pub mod cache;
mod filter;
pub mod matcher;
pub mod store;
#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use address::{
    AddressIndex, Building, City, CityKind, CityRecord, CitySuggestion, LazyChildren, MapObject,
    MapObjectInfo, NO_CITY_ID, ObjectRecord, Postcode, PostcodeRecord, REGION_FILE_MAGIC,
    REGION_FILE_VERSION, ReaderError, RegionArchive, RegionFile, RegionReader, RegionRecord,
    Street, StreetOwner, StreetRecord,
};
#[cfg(feature = "serde")]
pub use address::{RegionFileWriteError, write_region_file};
pub use amenity::{Amenity, AmenityType};
pub use bbox::BoundingBox;
pub use cache::{AMENITY_LIMIT, AmenityCache, CacheError};
pub use filter::{AmenityFilter, PoiFilter};
pub use matcher::{
    Collator, MapObjectComparator, MatchKind, MatchPartition, NameQuery, transliterate,
};
#[cfg(feature = "store-sqlite")]
pub use store::SqliteAmenityStore;
pub use store::{AmenityStore, MemoryAmenityStore, StoreError};
