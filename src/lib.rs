//! Facade crate for the geoscout location engine.
//!
//! This crate re-exports the amenity cache and address index from
//! `geoscout-core`, with the SQLite store and region-file writer behind
//! feature flags.

#![forbid(unsafe_code)]

pub use geoscout_core::{
    AMENITY_LIMIT, AddressIndex, Amenity, AmenityCache, AmenityFilter, AmenityStore, AmenityType,
    BoundingBox, Building, CacheError, City, CityKind, CitySuggestion, MapObject, MapObjectInfo,
    MemoryAmenityStore, NO_CITY_ID, PoiFilter, Postcode, ReaderError, RegionArchive, RegionFile,
    RegionReader, Street, StreetOwner, StoreError,
};

#[cfg(feature = "serde")]
pub use geoscout_core::{RegionFileWriteError, write_region_file};

#[cfg(feature = "store-sqlite")]
pub use geoscout_core::SqliteAmenityStore;

#[cfg(feature = "test-support")]
pub use geoscout_core::test_support;
