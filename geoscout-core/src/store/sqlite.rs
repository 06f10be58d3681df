//! SQLite-backed store implementation for persisted amenities.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use geo::Coord;
use parking_lot::Mutex;
use rusqlite::{Connection, OpenFlags, Row, params};

use crate::{Amenity, AmenityFilter, AmenityType, BoundingBox};

use super::{AmenityStore, StoreError};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS amenities (
        id INTEGER PRIMARY KEY,
        lat REAL NOT NULL,
        lon REAL NOT NULL,
        name TEXT,
        name_en TEXT,
        type TEXT,
        subtype TEXT,
        opening_hours TEXT,
        site TEXT,
        phone TEXT
    );
    CREATE INDEX IF NOT EXISTS amenities_location ON amenities (lat, lon);";

const COLUMNS: &str = "id, lat, lon, name, name_en, type, subtype, opening_hours, site, phone";

/// Amenity store persisted in an SQLite table.
///
/// The connection is guarded by a mutex so the store can be shared between
/// threads; statements run one at a time.
pub struct SqliteAmenityStore {
    connection: Mutex<Connection>,
    path: PathBuf,
}

impl fmt::Debug for SqliteAmenityStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteAmenityStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl SqliteAmenityStore {
    /// Open or create a store, initialising the schema when missing.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let connection = Connection::open(path).map_err(|source| StoreError::OpenDatabase {
            path: path.to_path_buf(),
            source,
        })?;
        connection.execute_batch(SCHEMA)?;
        Ok(Self {
            connection: Mutex::new(connection),
            path: path.to_path_buf(),
        })
    }

    /// Open an existing store without write access.
    ///
    /// Mutations fail with [`StoreError::Database`].
    pub fn open_read_only<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let connection = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|source| StoreError::OpenDatabase {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self {
            connection: Mutex::new(connection),
            path: path.to_path_buf(),
        })
    }

    /// Location of the database on disk.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of stored amenities.
    pub fn len(&self) -> Result<usize, StoreError> {
        let count: i64 = self
            .connection
            .lock()
            .query_row("SELECT COUNT(*) FROM amenities", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    /// Whether the store holds no amenities.
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        self.len().map(|count| count == 0)
    }
}

fn sql_id(id: u64) -> Result<i64, StoreError> {
    i64::try_from(id).map_err(|_| StoreError::IdOutOfRange { id })
}

fn read_text(row: &Row<'_>, index: usize) -> rusqlite::Result<String> {
    row.get::<_, Option<String>>(index)
        .map(Option::unwrap_or_default)
}

fn read_amenity(row: &Row<'_>) -> Result<Amenity, StoreError> {
    let raw_id: i64 = row.get(0)?;
    let id = u64::try_from(raw_id).map_err(|_| StoreError::NegativeId { id: raw_id })?;
    let lat: f64 = row.get(1)?;
    let lon: f64 = row.get(2)?;
    let kind = AmenityType::parse(&read_text(row, 5)?);
    Ok(
        Amenity::new(id, Coord { x: lon, y: lat }, read_text(row, 3)?, kind)
            .with_name_en(read_text(row, 4)?)
            .with_subtype(read_text(row, 6)?)
            .with_opening_hours(read_text(row, 7)?)
            .with_site(read_text(row, 8)?)
            .with_phone(read_text(row, 9)?),
    )
}

impl AmenityStore for SqliteAmenityStore {
    fn query_range(
        &self,
        bbox: &BoundingBox,
        filter: Option<&dyn AmenityFilter>,
        limit: Option<usize>,
    ) -> Result<Vec<Amenity>, StoreError> {
        let mut query = format!(
            "SELECT {COLUMNS} FROM amenities \
             WHERE ?1 < lat AND lat < ?2 AND ?3 < lon AND lon < ?4"
        );
        // A random scan order makes the capped subset a sample of the box
        // rather than whatever the index visits first.
        if limit.is_some() {
            query.push_str(" ORDER BY RANDOM()");
        }

        let connection = self.connection.lock();
        let mut statement = connection.prepare(&query)?;
        let mut rows = statement.query(params![bbox.bottom, bbox.top, bbox.left, bbox.right])?;
        let mut amenities = Vec::new();
        while let Some(row) = rows.next()? {
            if limit.is_some_and(|cap| amenities.len() >= cap) {
                break;
            }
            let amenity = read_amenity(row)?;
            if filter.is_none_or(|f| f.accepts(&amenity)) {
                amenities.push(amenity);
            }
        }
        Ok(amenities)
    }

    fn insert(&self, amenities: &[Amenity]) -> Result<(), StoreError> {
        let mut connection = self.connection.lock();
        let transaction = connection.transaction()?;
        {
            let mut statement = transaction.prepare(&format!(
                "INSERT OR REPLACE INTO amenities ({COLUMNS}) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
            ))?;
            for amenity in amenities {
                statement.execute(params![
                    sql_id(amenity.id)?,
                    amenity.latitude(),
                    amenity.longitude(),
                    amenity.name,
                    amenity.name_en,
                    amenity.kind.as_str(),
                    amenity.subtype,
                    amenity.opening_hours,
                    amenity.site,
                    amenity.phone,
                ])?;
            }
        }
        transaction.commit()?;
        Ok(())
    }

    fn update(&self, amenity: &Amenity) -> Result<(), StoreError> {
        let changed = self.connection.lock().execute(
            "UPDATE amenities SET lat = ?1, lon = ?2, opening_hours = ?3, name = ?4, \
             name_en = ?5, type = ?6, subtype = ?7, site = ?8, phone = ?9 WHERE id = ?10",
            params![
                amenity.latitude(),
                amenity.longitude(),
                amenity.opening_hours,
                amenity.name,
                amenity.name_en,
                amenity.kind.as_str(),
                amenity.subtype,
                amenity.site,
                amenity.phone,
                sql_id(amenity.id)?,
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::UnknownAmenity { id: amenity.id });
        }
        Ok(())
    }

    fn delete(&self, id: u64) -> Result<bool, StoreError> {
        let removed = self
            .connection
            .lock()
            .execute("DELETE FROM amenities WHERE id = ?1", params![sql_id(id)?])?;
        Ok(removed > 0)
    }

    fn delete_range(&self, bbox: &BoundingBox) -> Result<usize, StoreError> {
        let removed = self.connection.lock().execute(
            "DELETE FROM amenities \
             WHERE lon >= ?1 AND ?2 >= lon AND lat >= ?3 AND ?4 >= lat",
            params![bbox.left, bbox.right, bbox.bottom, bbox.top],
        )?;
        Ok(removed)
    }
}
