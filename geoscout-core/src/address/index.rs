//! Lazily populated address index with ranked suggestions.

use std::{collections::HashMap, fmt, sync::Arc};

use geo::Coord;
use log::{debug, error};
use parking_lot::{Mutex, RwLock};

use super::object::{Building, City, CitySuggestion, MapObject, Postcode, Street, StreetOwner};
use super::reader::{ReaderError, RegionReader};
use crate::{MapObjectComparator, MatchKind, MatchPartition, NameQuery};

/// City id meaning "no city"; lookups with it never load cities.
pub const NO_CITY_ID: i64 = -1;

/// Queries shorter than this only match city name prefixes and skip the
/// village scan.
const FULL_SEARCH_MIN_CHARS: usize = 3;

#[derive(Debug, Default)]
struct CityRegistry {
    loaded: bool,
    order: Vec<Arc<City>>,
    by_id: HashMap<i64, usize>,
}

impl CityRegistry {
    fn insert(&mut self, city: Arc<City>) {
        match self.by_id.get(&city.id()).and_then(|&index| self.order.get_mut(index)) {
            Some(slot) => *slot = city,
            None => {
                self.by_id.insert(city.id(), self.order.len());
                self.order.push(city);
            }
        }
    }

    fn insert_if_absent(&mut self, city: Arc<City>) {
        if !self.by_id.contains_key(&city.id()) {
            self.insert(city);
        }
    }

    fn get(&self, id: i64) -> Option<&Arc<City>> {
        self.by_id.get(&id).and_then(|&index| self.order.get(index))
    }
}

fn partition<T: MapObject>(
    items: &[Arc<T>],
    query: &NameQuery,
    use_english_names: bool,
) -> MatchPartition<Arc<T>> {
    let mut hits = MatchPartition::default();
    for item in items {
        if let Some(kind) = query.match_kind(item.display_name(use_english_names)) {
            hits.push(kind, Arc::clone(item));
        }
    }
    hits
}

fn starts_with_two_digits(prefix: &str) -> bool {
    let mut chars = prefix.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some(first), Some(second)) if first.is_numeric() && second.is_numeric()
    )
}

/// In-memory view of one region's address hierarchy.
///
/// Cities load from the reader on first use and stay resident until
/// [`AddressIndex::clear_cache`]. Villages are never resident: long city
/// queries ask the reader for matching villages each time. Streets and
/// buildings are cached on the entity that owns them.
///
/// Reader failures are logged and treated as "nothing loaded"; the next call
/// retries.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use geoscout_core::{AddressIndex, RegionArchive, RegionFile};
///
/// let reader = Arc::new(RegionFile::from_archive(RegionArchive::default()));
/// let index = AddressIndex::new("nowhere", reader);
/// assert!(index.suggest_cities("", None).is_empty());
/// assert!(index.city_by_id(42).is_none());
/// ```
pub struct AddressIndex {
    region: String,
    reader: RwLock<Option<Arc<dyn RegionReader>>>,
    cities: RwLock<CityRegistry>,
    postcodes: Mutex<HashMap<String, Arc<Postcode>>>,
    comparator: RwLock<MapObjectComparator>,
}

impl fmt::Debug for AddressIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cities = self.cities.read();
        f.debug_struct("AddressIndex")
            .field("region", &self.region)
            .field("open", &self.reader.read().is_some())
            .field("cities_loaded", &cities.loaded)
            .field("cities", &cities.order.len())
            .field("postcodes", &self.postcodes.lock().len())
            .field("comparator", &*self.comparator.read())
            .finish()
    }
}

impl AddressIndex {
    /// Create an index over `region`, matching local names.
    pub fn new(region: impl Into<String>, reader: Arc<dyn RegionReader>) -> Self {
        Self {
            region: region.into(),
            reader: RwLock::new(Some(reader)),
            cities: RwLock::new(CityRegistry::default()),
            postcodes: Mutex::new(HashMap::new()),
            comparator: RwLock::new(MapObjectComparator::default()),
        }
    }

    /// Region name.
    #[must_use]
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Whether English names are used for matching and ranking.
    #[must_use]
    pub fn use_english_names(&self) -> bool {
        self.comparator.read().use_english_names()
    }

    /// Switch between local and English names.
    ///
    /// Loaded collections are kept; only later matching and ranking change.
    pub fn set_use_english_names(&self, use_english_names: bool) {
        *self.comparator.write() = MapObjectComparator::new(use_english_names);
    }

    /// Whether the resident cities have been loaded from the reader.
    #[must_use]
    pub fn are_cities_loaded(&self) -> bool {
        self.cities.read().loaded
    }

    /// Postcodes are read on demand and never bulk-loaded, so they always
    /// count as available.
    #[must_use]
    pub const fn are_postcodes_loaded(&self) -> bool {
        true
    }

    /// Register a city, such as a village picked from a suggestion, so
    /// [`AddressIndex::city_by_id`] and later suggestions can find it.
    ///
    /// Replaces a resident city with the same id in place.
    pub fn add_city(&self, city: Arc<City>) {
        self.cities.write().insert(city);
    }

    /// Drop resident cities and cached postcodes.
    ///
    /// Streets and buildings already loaded on entities held by callers are
    /// not affected.
    pub fn clear_cache(&self) {
        *self.cities.write() = CityRegistry::default();
        self.postcodes.lock().clear();
    }

    /// Detach the reader and clear the caches.
    ///
    /// Later loads fail with [`ReaderError::Closed`], which is logged and
    /// yields empty results.
    pub fn close(&self) {
        self.reader.write().take();
        self.clear_cache();
    }

    /// Suggest settlements and postcodes for `prefix`.
    ///
    /// - A prefix starting with two digits also searches the region's
    ///   postcodes; their prefix hits come first.
    /// - An empty prefix lists every resident city in load order.
    /// - Prefixes shorter than three characters match resident city name
    ///   prefixes only.
    /// - Longer prefixes match prefixes and substrings of resident cities and
    ///   of villages read on demand. Prefix hits precede substring hits; each
    ///   group keeps discovery order and no name sort is applied.
    ///
    /// The current location is accepted for callers that track one and does
    /// not influence the result.
    pub fn suggest_cities(
        &self,
        prefix: &str,
        _current_location: Option<Coord<f64>>,
    ) -> Vec<CitySuggestion> {
        self.preload_cities();
        let use_english_names = self.use_english_names();
        let mut hits = MatchPartition::default();

        if starts_with_two_digits(prefix) {
            self.collect_postcodes(prefix, &mut hits);
        }

        let query = NameQuery::new(prefix);
        let cities = self.cities.read().order.clone();
        if query.is_empty() {
            for city in cities {
                hits.push_back(CitySuggestion::City(city));
            }
        } else if query.char_len() < FULL_SEARCH_MIN_CHARS {
            for city in cities {
                if query.is_prefix_of(city.display_name(use_english_names)) {
                    hits.push_back(CitySuggestion::City(city));
                }
            }
        } else {
            for city in cities {
                if let Some(kind) = query.match_kind(city.display_name(use_english_names)) {
                    hits.push(kind, CitySuggestion::City(city));
                }
            }
            let before = hits.len();
            match self
                .reader()
                .and_then(|reader| reader.load_villages(&self.region, query.as_str()))
            {
                Ok(villages) => {
                    for village in villages {
                        if let Some(kind) = query.match_kind(village.display_name(use_english_names))
                        {
                            hits.push(kind, CitySuggestion::City(Arc::new(village)));
                        }
                    }
                }
                Err(err) => error!("failed to load villages of {}: {err}", self.region),
            }
            debug!("loaded {} villages matching {prefix:?}", hits.len() - before);
        }
        hits.into_vec()
    }

    /// Suggest streets of `owner` matching `prefix`, sorted by name.
    ///
    /// An empty prefix returns every street.
    pub fn suggest_streets(&self, owner: StreetOwner<'_>, prefix: &str) -> Vec<Arc<Street>> {
        let streets = self.preload_streets(owner);
        self.suggest(&streets, prefix)
    }

    /// Suggest buildings of `street` matching `prefix`, sorted by name.
    ///
    /// An empty prefix returns every building.
    pub fn suggest_buildings(&self, street: &Street, prefix: &str) -> Vec<Arc<Building>> {
        let buildings = self.preload_buildings(street);
        self.suggest(&buildings, prefix)
    }

    /// The building of `street` whose active name equals `name` exactly.
    pub fn building_by_name(&self, street: &Street, name: &str) -> Option<Arc<Building>> {
        let use_english_names = self.use_english_names();
        self.preload_buildings(street)
            .iter()
            .find(|building| building.display_name(use_english_names) == name)
            .cloned()
    }

    /// The street of `owner` whose active name equals `name`, ignoring case.
    pub fn street_by_name(&self, owner: StreetOwner<'_>, name: &str) -> Option<Arc<Street>> {
        let use_english_names = self.use_english_names();
        let query = NameQuery::new(name);
        self.preload_streets(owner)
            .iter()
            .find(|street| query.matches_exactly(street.display_name(use_english_names)))
            .cloned()
    }

    /// The postcode named `name`, compared case-insensitively.
    ///
    /// Found postcodes are cached; misses ask the reader again next time.
    pub fn postcode(&self, name: &str) -> Option<Arc<Postcode>> {
        let key = name.to_uppercase();
        if let Some(postcode) = self.postcodes.lock().get(&key) {
            return Some(Arc::clone(postcode));
        }
        match self
            .reader()
            .and_then(|reader| reader.load_postcode_by_name(&self.region, name))
        {
            Ok(Some(postcode)) => {
                let mut postcodes = self.postcodes.lock();
                Some(Arc::clone(
                    postcodes.entry(key).or_insert_with(|| Arc::new(postcode)),
                ))
            }
            Ok(None) => None,
            Err(err) => {
                error!("failed to look up postcode {name:?} in {}: {err}", self.region);
                None
            }
        }
    }

    /// The resident city with `id`.
    ///
    /// [`NO_CITY_ID`] returns `None` without loading cities.
    pub fn city_by_id(&self, id: i64) -> Option<Arc<City>> {
        if id == NO_CITY_ID {
            return None;
        }
        self.preload_cities();
        self.cities.read().get(id).cloned()
    }

    fn reader(&self) -> Result<Arc<dyn RegionReader>, ReaderError> {
        self.reader.read().clone().ok_or(ReaderError::Closed)
    }

    fn comparator(&self) -> MapObjectComparator {
        *self.comparator.read()
    }

    fn suggest<T: MapObject>(&self, items: &[Arc<T>], prefix: &str) -> Vec<Arc<T>> {
        let comparator = self.comparator();
        let query = NameQuery::new(prefix);
        let mut found = if query.is_empty() {
            items.to_vec()
        } else {
            partition(items, &query, comparator.use_english_names()).into_vec()
        };
        comparator.sort(&mut found);
        found
    }

    fn collect_postcodes(&self, prefix: &str, hits: &mut MatchPartition<CitySuggestion>) {
        let code = prefix.to_uppercase();
        match self
            .reader()
            .and_then(|reader| reader.load_postcodes(&self.region))
        {
            Ok(postcodes) => {
                for postcode in postcodes {
                    let kind = if postcode.code().starts_with(&code) {
                        MatchKind::Prefix
                    } else if postcode.code().contains(&code) {
                        MatchKind::Substring
                    } else {
                        continue;
                    };
                    hits.push(kind, CitySuggestion::Postcode(Arc::new(postcode)));
                }
            }
            Err(err) => error!("failed to load postcodes of {}: {err}", self.region),
        }
    }

    fn preload_cities(&self) {
        if self.cities.read().loaded {
            return;
        }
        let mut cities = self.cities.write();
        if cities.loaded {
            return;
        }
        match self
            .reader()
            .and_then(|reader| reader.load_cities(&self.region))
        {
            Ok(loaded) => {
                debug!("loaded {} cities of {}", loaded.len(), self.region);
                for city in loaded {
                    cities.insert_if_absent(Arc::new(city));
                }
                cities.loaded = true;
            }
            Err(err) => error!("failed to load cities of {}: {err}", self.region),
        }
    }

    fn preload_streets(&self, owner: StreetOwner<'_>) -> Arc<[Arc<Street>]> {
        owner
            .streets()
            .get_or_try_load(|| {
                let streets = self.reader()?.load_streets(owner)?;
                Ok(streets.into_iter().map(Arc::new).collect())
            })
            .unwrap_or_else(|err: ReaderError| {
                error!("failed to load streets of {}: {err}", owner.info().name);
                Vec::new().into()
            })
    }

    fn preload_buildings(&self, street: &Street) -> Arc<[Arc<Building>]> {
        street
            .buildings()
            .get_or_try_load(|| {
                let buildings = self.reader()?.load_buildings(street)?;
                Ok(buildings.into_iter().map(Arc::new).collect())
            })
            .unwrap_or_else(|err: ReaderError| {
                error!("failed to load buildings of {}: {err}", street.name());
                Vec::new().into()
            })
    }
}
