//! Data access traits for persisted amenities.
//!
//! The `AmenityStore` trait is the capability the amenity cache consumes:
//! range queries over a bounding box with an optional predicate and result
//! cap, plus row mutations.

use thiserror::Error;

use crate::{Amenity, AmenityFilter, BoundingBox};

mod memory;
#[cfg(feature = "store-sqlite")]
mod sqlite;

pub use memory::MemoryAmenityStore;
#[cfg(feature = "store-sqlite")]
pub use sqlite::SqliteAmenityStore;

/// Error raised by amenity stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Opening the backing database failed.
    #[cfg(feature = "store-sqlite")]
    #[error("failed to open SQLite database at {path}: {source}")]
    OpenDatabase {
        /// Location of the database on disk.
        path: std::path::PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// The backing database rejected a statement.
    #[cfg(feature = "store-sqlite")]
    #[error(transparent)]
    Database(#[from] rusqlite::Error),
    /// An identifier cannot be represented by the backing store.
    #[error("amenity id {id} exceeds the store's integer range")]
    IdOutOfRange {
        /// Identifier that failed the conversion.
        id: u64,
    },
    /// A stored row carries an identifier outside the `u64` range.
    #[error("stored amenity id {id} is negative")]
    NegativeId {
        /// Identifier read from the store.
        id: i64,
    },
    /// An update referenced an amenity the store does not hold.
    #[error("amenity {id} does not exist")]
    UnknownAmenity {
        /// Identifier of the missing amenity.
        id: u64,
    },
}

/// Persisted amenities queryable by bounding box.
///
/// Range queries are strict: an amenity on the edge of `bbox` is outside.
/// When `limit` is set and more amenities match, the store returns an
/// arbitrary subset of `limit` amenities; callers must not rely on which.
///
/// # Examples
///
/// ```rust
/// use geo::Coord;
/// use geoscout_core::{Amenity, AmenityStore, AmenityType, BoundingBox, MemoryAmenityStore};
///
/// let store = MemoryAmenityStore::default();
/// store
///     .insert(&[Amenity::new(1, Coord { x: 0.5, y: 0.5 }, "Kiosk", AmenityType::Shop)])
///     .expect("insert amenity");
///
/// let bbox = BoundingBox::new(1.0, 0.0, 0.0, 1.0);
/// let found = store.query_range(&bbox, None, None).expect("query store");
/// assert_eq!(found.len(), 1);
/// ```
pub trait AmenityStore: Send + Sync {
    /// Return amenities strictly inside `bbox` accepted by `filter`.
    fn query_range(
        &self,
        bbox: &BoundingBox,
        filter: Option<&dyn AmenityFilter>,
        limit: Option<usize>,
    ) -> Result<Vec<Amenity>, StoreError>;

    /// Insert amenities, replacing any with the same id.
    fn insert(&self, amenities: &[Amenity]) -> Result<(), StoreError>;

    /// Overwrite the stored amenity with `amenity.id`.
    fn update(&self, amenity: &Amenity) -> Result<(), StoreError>;

    /// Remove the amenity with `id`; returns whether one was removed.
    fn delete(&self, id: u64) -> Result<bool, StoreError>;

    /// Remove every amenity inside `bbox`, edges included; returns the count.
    fn delete_range(&self, bbox: &BoundingBox) -> Result<usize, StoreError>;
}
