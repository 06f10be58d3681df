//! Reader doubles and fixture data used by unit and behaviour tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::address::{
    Building, City, CityKind, CityRecord, ObjectRecord, Postcode, PostcodeRecord, ReaderError,
    RegionArchive, RegionReader, RegionRecord, Street, StreetOwner, StreetRecord,
};

/// Number of calls made to each [`RegionReader`] loader.
#[derive(Debug, Default)]
pub struct LoadCounts {
    cities: AtomicUsize,
    villages: AtomicUsize,
    postcodes: AtomicUsize,
    postcode_lookups: AtomicUsize,
    streets: AtomicUsize,
    buildings: AtomicUsize,
}

impl LoadCounts {
    /// Calls to [`RegionReader::load_cities`].
    pub fn cities(&self) -> usize {
        self.cities.load(Ordering::SeqCst)
    }

    /// Calls to [`RegionReader::load_villages`].
    pub fn villages(&self) -> usize {
        self.villages.load(Ordering::SeqCst)
    }

    /// Calls to [`RegionReader::load_postcodes`].
    pub fn postcodes(&self) -> usize {
        self.postcodes.load(Ordering::SeqCst)
    }

    /// Calls to [`RegionReader::load_postcode_by_name`].
    pub fn postcode_lookups(&self) -> usize {
        self.postcode_lookups.load(Ordering::SeqCst)
    }

    /// Calls to [`RegionReader::load_streets`].
    pub fn streets(&self) -> usize {
        self.streets.load(Ordering::SeqCst)
    }

    /// Calls to [`RegionReader::load_buildings`].
    pub fn buildings(&self) -> usize {
        self.buildings.load(Ordering::SeqCst)
    }
}

fn bump(counter: &AtomicUsize) {
    counter.fetch_add(1, Ordering::SeqCst);
}

/// [`RegionReader`] wrapper counting loader calls.
#[derive(Debug, Default)]
pub struct CountingReader<R> {
    inner: R,
    counts: LoadCounts,
}

impl<R> CountingReader<R> {
    /// Wrap `inner`.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            counts: LoadCounts::default(),
        }
    }

    /// Calls observed so far.
    pub const fn counts(&self) -> &LoadCounts {
        &self.counts
    }
}

impl<R: RegionReader> RegionReader for CountingReader<R> {
    fn load_cities(&self, region: &str) -> Result<Vec<City>, ReaderError> {
        bump(&self.counts.cities);
        self.inner.load_cities(region)
    }

    fn load_villages(&self, region: &str, query: &str) -> Result<Vec<City>, ReaderError> {
        bump(&self.counts.villages);
        self.inner.load_villages(region, query)
    }

    fn load_postcodes(&self, region: &str) -> Result<Vec<Postcode>, ReaderError> {
        bump(&self.counts.postcodes);
        self.inner.load_postcodes(region)
    }

    fn load_postcode_by_name(
        &self,
        region: &str,
        name: &str,
    ) -> Result<Option<Postcode>, ReaderError> {
        bump(&self.counts.postcode_lookups);
        self.inner.load_postcode_by_name(region, name)
    }

    fn load_streets(&self, owner: StreetOwner<'_>) -> Result<Vec<Street>, ReaderError> {
        bump(&self.counts.streets);
        self.inner.load_streets(owner)
    }

    fn load_buildings(&self, street: &Street) -> Result<Vec<Building>, ReaderError> {
        bump(&self.counts.buildings);
        self.inner.load_buildings(street)
    }
}

/// [`RegionReader`] whose every load fails with an I/O error.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingReader;

impl FailingReader {
    fn fail<T>() -> Result<T, ReaderError> {
        Err(ReaderError::Io {
            path: "unreadable.gsrg".into(),
            source: std::io::Error::other("disk operation failed"),
        })
    }
}

impl RegionReader for FailingReader {
    fn load_cities(&self, _region: &str) -> Result<Vec<City>, ReaderError> {
        Self::fail()
    }

    fn load_villages(&self, _region: &str, _query: &str) -> Result<Vec<City>, ReaderError> {
        Self::fail()
    }

    fn load_postcodes(&self, _region: &str) -> Result<Vec<Postcode>, ReaderError> {
        Self::fail()
    }

    fn load_postcode_by_name(
        &self,
        _region: &str,
        _name: &str,
    ) -> Result<Option<Postcode>, ReaderError> {
        Self::fail()
    }

    fn load_streets(&self, _owner: StreetOwner<'_>) -> Result<Vec<Street>, ReaderError> {
        Self::fail()
    }

    fn load_buildings(&self, _street: &Street) -> Result<Vec<Building>, ReaderError> {
        Self::fail()
    }
}

/// Region name used by [`sample_region_archive`].
pub const SAMPLE_REGION: &str = "bavaria";

fn street(id: i64, name: &str, buildings: &[&str]) -> StreetRecord {
    StreetRecord {
        object: ObjectRecord::new(id, name, 48.137, 11.575),
        buildings: buildings
            .iter()
            .zip(1..)
            .map(|(number, offset)| ObjectRecord::new(id * 100 + offset, *number, 48.137, 11.575))
            .collect(),
    }
}

fn translated_street(id: i64, name: &str, name_en: &str) -> StreetRecord {
    let mut record = street(id, name, &[]);
    record.object = record.object.with_name_en(name_en);
    record
}

fn city(id: i64, name: &str, name_en: &str, kind: CityKind, streets: Vec<StreetRecord>) -> CityRecord {
    CityRecord {
        object: ObjectRecord::new(id, name, 48.0, 11.0).with_name_en(name_en),
        kind,
        streets,
    }
}

fn postcode(id: i64, code: &str, streets: Vec<StreetRecord>) -> PostcodeRecord {
    PostcodeRecord {
        object: ObjectRecord::new(id, code, 48.0, 11.0),
        streets,
    }
}

/// A small Bavarian region.
///
/// Cities are listed out of settlement order so readers have to rank them:
/// `München` (city), `Augsburg` (town), `Landsberg` (town), `Schwabing`
/// (suburb), `Burgau` (town), plus the villages `Oberdorf` and `Dorfen` and the hamlet
/// `Kleinhausen`. Munich owns `Marienplatz` with buildings `12`, `12A` and
/// `5`. Landsberg owns `Alter Markt` (`Old Market`) and `Zeughausgasse`
/// (`Arsenal Lane`), whose order flips with English names. Postcodes are `12345`, `54321`, `61200` and `80331`.
pub fn sample_region_archive() -> RegionArchive {
    let cities = vec![
        city(
            1,
            "München",
            "Munich",
            CityKind::City,
            vec![
                street(10, "Marienplatz", &["12", "12A", "5"]),
                street(11, "Leopoldstraße", &["1", "3"]),
                street(12, "Ludwigstraße", &["7"]),
                street(13, "Sendlinger Straße", &[]),
            ],
        ),
        city(2, "Augsburg", "", CityKind::Town, vec![street(20, "Maximilianstraße", &["9"])]),
        city(
            3,
            "Landsberg",
            "",
            CityKind::Town,
            vec![
                translated_street(40, "Alter Markt", "Old Market"),
                translated_street(41, "Zeughausgasse", "Arsenal Lane"),
            ],
        ),
        city(4, "Schwabing", "", CityKind::Suburb, Vec::new()),
        city(8, "Burgau", "", CityKind::Town, Vec::new()),
        city(5, "Oberdorf", "", CityKind::Village, Vec::new()),
        city(6, "Dorfen", "", CityKind::Village, Vec::new()),
        city(7, "Kleinhausen", "", CityKind::Hamlet, Vec::new()),
    ];
    let postcodes = vec![
        postcode(100, "12345", vec![street(30, "Hauptstraße", &["1"])]),
        postcode(101, "54321", Vec::new()),
        postcode(102, "61200", Vec::new()),
        postcode(103, "80331", vec![street(10, "Marienplatz", &["12", "12A", "5"])]),
    ];
    RegionArchive {
        regions: vec![RegionRecord {
            name: SAMPLE_REGION.to_owned(),
            cities,
            postcodes,
        }],
    }
}
