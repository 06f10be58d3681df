//! Bounding-box result cache for amenity range queries.
//!
//! The cache remembers the last region it fetched from the store, grown by
//! [`BoundingBox::expanded`], together with the zoom level and filter id the
//! fetch used. Viewport changes that stay inside that region can then be
//! answered from memory.

use std::{mem, time::Instant};

use log::debug;
use parking_lot::{Mutex, RwLock};
use thiserror::Error;

use crate::{Amenity, AmenityFilter, AmenityStore, BoundingBox, StoreError};

/// Default cap on the number of amenities fetched by one refresh.
pub const AMENITY_LIMIT: usize = 500;

/// Error raised by [`AmenityCache`] operations.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The cache has no store, either because it was closed or never opened.
    #[error("amenity store is unavailable")]
    StoreUnavailable,
    /// The store rejected the request.
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Default)]
struct CachedRegion {
    bbox: Option<BoundingBox>,
    zoom: u32,
    filter_id: Option<String>,
    amenities: Vec<Amenity>,
}

impl CachedRegion {
    fn covers(&self, bbox: &BoundingBox, zoom: u32) -> bool {
        self.bbox
            .is_some_and(|cached| cached.contains(bbox) && self.zoom == zoom)
    }

    fn collect_inside(&self, bbox: &BoundingBox, out: &mut Vec<Amenity>) {
        out.extend(
            self.amenities
                .iter()
                .filter(|amenity| bbox.contains_point(amenity.location))
                .cloned(),
        );
    }
}

/// Amenity cache wrapping an [`AmenityStore`].
///
/// Lock order is store first, then cached region. A refresh holds only the
/// store read lock while scanning; the cached region mutex is taken for the
/// final swap, so concurrent lookups observe either the old or the new
/// region in full.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use geoscout_core::{Amenity, AmenityCache, AmenityType, BoundingBox, MemoryAmenityStore};
///
/// let store = MemoryAmenityStore::with_amenities([
///     Amenity::new(1, Coord { x: 0.5, y: 0.5 }, "Kiosk", AmenityType::Shop),
/// ]);
/// let cache = AmenityCache::new(store);
/// let viewport = BoundingBox::new(1.0, 0.0, 0.0, 1.0);
///
/// let fetched = cache.refresh(&viewport, 15, None, None).expect("refresh cache");
/// assert_eq!(fetched.len(), 1);
///
/// let mut cached = Vec::new();
/// assert!(cache.lookup(&viewport, 15, None, false, &mut cached));
/// assert_eq!(cached, fetched);
/// ```
#[derive(Debug)]
pub struct AmenityCache<S> {
    store: RwLock<Option<S>>,
    region: Mutex<CachedRegion>,
}

impl<S: AmenityStore> AmenityCache<S> {
    /// Create an empty cache over `store`.
    pub fn new(store: S) -> Self {
        Self {
            store: RwLock::new(Some(store)),
            region: Mutex::new(CachedRegion::default()),
        }
    }

    /// Whether the cache still holds a store.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.store.read().is_some()
    }

    /// Re-query the store around `bbox` and replace the cached region.
    ///
    /// The store is queried over the expanded box, capped at `limit`
    /// amenities (pass `Some(AMENITY_LIMIT)` for the usual cap). Returns the
    /// newly cached amenities strictly inside `bbox`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::StoreUnavailable`] after [`AmenityCache::close`]
    /// and [`CacheError::Store`] when the query fails. The cached region is
    /// left untouched on error.
    pub fn refresh(
        &self,
        bbox: &BoundingBox,
        zoom: u32,
        limit: Option<usize>,
        filter: Option<&dyn AmenityFilter>,
    ) -> Result<Vec<Amenity>, CacheError> {
        let expanded = bbox.expanded();
        let started = Instant::now();
        let fetched = {
            let store = self.store.read();
            let store = store.as_ref().ok_or(CacheError::StoreUnavailable)?;
            store.query_range(&expanded, filter, limit)?
        };
        debug!(
            "fetched {} amenities for {expanded:?} in {:?}",
            fetched.len(),
            started.elapsed()
        );

        let next = CachedRegion {
            bbox: Some(expanded),
            zoom,
            filter_id: filter.map(|f| f.filter_id().to_owned()),
            amenities: fetched,
        };
        let mut inside = Vec::new();
        let previous = {
            let mut region = self.region.lock();
            let previous = mem::replace(&mut *region, next);
            region.collect_inside(bbox, &mut inside);
            previous
        };
        drop(previous);
        Ok(inside)
    }

    /// Serve `bbox` from the cached region.
    ///
    /// Returns `true` when the cached region is sufficient: it contains
    /// `bbox`, was fetched at `zoom`, and used the filter named `filter_id`.
    /// When the filter matches and either the region is sufficient or
    /// `include_always` is set, the cached amenities strictly inside `bbox`
    /// are appended to `out`. A closed cache reports `true` and leaves
    /// `out` alone since there is nothing left to search.
    pub fn lookup(
        &self,
        bbox: &BoundingBox,
        zoom: u32,
        filter_id: Option<&str>,
        include_always: bool,
        out: &mut Vec<Amenity>,
    ) -> bool {
        let store = self.store.read();
        if store.is_none() {
            return true;
        }
        let region = self.region.lock();
        let inside = region.covers(bbox, zoom);
        let same_filter = region.filter_id.as_deref() == filter_id;
        if (inside || include_always) && same_filter {
            region.collect_inside(bbox, out);
        }
        inside && same_filter
    }

    /// Forget the cached region.
    pub fn invalidate(&self) {
        let previous = mem::take(&mut *self.region.lock());
        drop(previous);
    }

    /// Insert amenities into the store.
    ///
    /// The cached region is not updated; callers refresh when they need the
    /// new rows.
    ///
    /// # Errors
    ///
    /// See [`AmenityCache::refresh`].
    pub fn insert(&self, amenities: &[Amenity]) -> Result<(), CacheError> {
        self.with_store(|store| store.insert(amenities))
    }

    /// Overwrite an amenity in the store.
    ///
    /// # Errors
    ///
    /// Fails with [`StoreError::UnknownAmenity`] when the id is not stored.
    pub fn update(&self, amenity: &Amenity) -> Result<(), CacheError> {
        self.with_store(|store| store.update(amenity))
    }

    /// Delete an amenity from the store; returns whether it existed.
    ///
    /// # Errors
    ///
    /// See [`AmenityCache::refresh`].
    pub fn delete(&self, id: u64) -> Result<bool, CacheError> {
        self.with_store(|store| store.delete(id))
    }

    /// Replace everything stored inside `bbox` with `amenities`.
    ///
    /// Returns the number of amenities removed before the insert.
    ///
    /// # Errors
    ///
    /// See [`AmenityCache::refresh`].
    pub fn replace_region(
        &self,
        amenities: &[Amenity],
        bbox: &BoundingBox,
    ) -> Result<usize, CacheError> {
        self.with_store(|store| {
            let removed = store.delete_range(bbox)?;
            store.insert(amenities)?;
            Ok(removed)
        })
    }

    /// Detach and return the store, clearing the cached region.
    pub fn close(&self) -> Option<S> {
        let store = self.store.write().take();
        self.invalidate();
        store
    }

    fn with_store<T>(
        &self,
        op: impl FnOnce(&S) -> Result<T, StoreError>,
    ) -> Result<T, CacheError> {
        let store = self.store.read();
        let store = store.as_ref().ok_or(CacheError::StoreUnavailable)?;
        Ok(op(store)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AmenityType, MemoryAmenityStore, PoiFilter};
    use geo::Coord;
    use rstest::{fixture, rstest};

    fn amenity(id: u64, x: f64, y: f64, kind: AmenityType) -> Amenity {
        Amenity::new(id, Coord { x, y }, format!("amenity {id}"), kind)
    }

    fn ids(amenities: &[Amenity]) -> Vec<u64> {
        let mut ids: Vec<u64> = amenities.iter().map(|amenity| amenity.id).collect();
        ids.sort_unstable();
        ids
    }

    fn viewport() -> BoundingBox {
        BoundingBox::new(1.0, 0.0, 0.0, 1.0)
    }

    #[fixture]
    fn cache() -> AmenityCache<MemoryAmenityStore> {
        AmenityCache::new(MemoryAmenityStore::with_amenities([
            amenity(1, 0.5, 0.5, AmenityType::Shop),
            amenity(2, 1.5, 0.5, AmenityType::Shop),
            amenity(3, 0.5, 1.5, AmenityType::Tourism),
            amenity(4, 2.5, 2.5, AmenityType::Shop),
            amenity(5, 1.0, 0.5, AmenityType::Shop),
        ]))
    }

    #[rstest]
    fn refresh_returns_amenities_inside_requested_box(cache: AmenityCache<MemoryAmenityStore>) {
        let found = cache.refresh(&viewport(), 12, None, None).expect("refresh");
        assert_eq!(ids(&found), vec![1]);
    }

    #[rstest]
    fn refresh_caches_expanded_region(cache: AmenityCache<MemoryAmenityStore>) {
        cache.refresh(&viewport(), 12, None, None).expect("refresh");
        let panned = BoundingBox::new(1.0, 0.0, 1.0, 2.0);
        let mut out = Vec::new();
        assert!(cache.lookup(&panned, 12, None, false, &mut out));
        assert_eq!(ids(&out), vec![2]);
    }

    #[rstest]
    fn lookup_outside_region_is_insufficient(cache: AmenityCache<MemoryAmenityStore>) {
        cache.refresh(&viewport(), 12, None, None).expect("refresh");
        let far = BoundingBox::new(3.0, 2.0, 2.0, 3.0);
        let mut out = Vec::new();
        assert!(!cache.lookup(&far, 12, None, false, &mut out));
        assert!(out.is_empty());
    }

    #[rstest]
    fn include_always_serves_partial_overlap(cache: AmenityCache<MemoryAmenityStore>) {
        cache.refresh(&viewport(), 12, None, None).expect("refresh");
        let straddling = BoundingBox::new(3.0, 0.0, 0.0, 3.0);
        let mut out = Vec::new();
        assert!(!cache.lookup(&straddling, 12, None, true, &mut out));
        assert_eq!(ids(&out), vec![1, 2, 3, 5]);
    }

    #[rstest]
    fn zoom_change_is_insufficient_but_still_served_when_asked(
        cache: AmenityCache<MemoryAmenityStore>,
    ) {
        cache.refresh(&viewport(), 12, None, None).expect("refresh");
        let mut out = Vec::new();
        assert!(!cache.lookup(&viewport(), 13, None, false, &mut out));
        assert!(out.is_empty());
        assert!(!cache.lookup(&viewport(), 13, None, true, &mut out));
        assert_eq!(ids(&out), vec![1]);
    }

    #[rstest]
    fn filter_change_is_insufficient(cache: AmenityCache<MemoryAmenityStore>) {
        let shops = PoiFilter::new("shops").with_category(AmenityType::Shop);
        cache
            .refresh(&viewport(), 12, None, Some(&shops))
            .expect("refresh");
        let mut out = Vec::new();
        assert!(cache.lookup(&viewport(), 12, Some("shops"), false, &mut out));
        assert!(!cache.lookup(&viewport(), 12, Some("tourism"), true, &mut out));
        assert!(!cache.lookup(&viewport(), 12, None, true, &mut out));
        assert_eq!(ids(&out), vec![1]);
    }

    #[rstest]
    fn limit_caps_the_cached_set(cache: AmenityCache<MemoryAmenityStore>) {
        let everywhere = BoundingBox::new(3.0, 0.0, 0.0, 3.0);
        cache
            .refresh(&everywhere, 12, Some(2), None)
            .expect("refresh");
        let mut out = Vec::new();
        assert!(cache.lookup(&everywhere, 12, None, false, &mut out));
        assert!(out.len() <= 2);
    }

    #[rstest]
    fn invalidate_forces_insufficiency(cache: AmenityCache<MemoryAmenityStore>) {
        cache.refresh(&viewport(), 12, None, None).expect("refresh");
        cache.invalidate();
        let mut out = Vec::new();
        assert!(!cache.lookup(&viewport(), 12, None, true, &mut out));
        assert!(out.is_empty());
    }

    #[rstest]
    fn closed_cache_needs_no_search(cache: AmenityCache<MemoryAmenityStore>) {
        cache.refresh(&viewport(), 12, None, None).expect("refresh");
        let store = cache.close();
        assert!(store.is_some());
        assert!(!cache.is_open());

        let mut out = Vec::new();
        assert!(cache.lookup(&viewport(), 12, None, true, &mut out));
        assert!(out.is_empty());

        let err = cache
            .refresh(&viewport(), 12, None, None)
            .expect_err("closed cache");
        assert!(matches!(err, CacheError::StoreUnavailable));
    }

    #[rstest]
    fn mutations_reach_the_store_but_not_the_cached_region(
        cache: AmenityCache<MemoryAmenityStore>,
    ) {
        cache.refresh(&viewport(), 12, None, None).expect("refresh");
        cache
            .insert(&[amenity(9, 0.25, 0.25, AmenityType::Shop)])
            .expect("insert");

        let mut out = Vec::new();
        assert!(cache.lookup(&viewport(), 12, None, false, &mut out));
        assert_eq!(ids(&out), vec![1]);

        let found = cache.refresh(&viewport(), 12, None, None).expect("refresh");
        assert_eq!(ids(&found), vec![1, 9]);
    }

    #[rstest]
    fn lookups_racing_refreshes_see_one_whole_region(cache: AmenityCache<MemoryAmenityStore>) {
        let near = BoundingBox::new(0.6, 0.4, 0.4, 0.6);
        let far = BoundingBox::new(2.6, 2.4, 2.4, 2.6);
        let everywhere = BoundingBox::new(3.0, 0.0, 0.0, 3.0);
        cache.refresh(&near, 12, None, None).expect("refresh");

        std::thread::scope(|scope| {
            scope.spawn(|| {
                for round in 0..200 {
                    let target = if round % 2 == 0 { &far } else { &near };
                    cache.refresh(target, 12, None, None).expect("refresh");
                }
            });
            for _ in 0..4 {
                scope.spawn(|| {
                    for _ in 0..200 {
                        let mut out = Vec::new();
                        cache.lookup(&everywhere, 12, None, true, &mut out);
                        let seen = ids(&out);
                        assert!(seen == vec![1] || seen == vec![4], "mixed regions: {seen:?}");
                    }
                });
            }
        });
    }

    #[rstest]
    fn update_of_unknown_amenity_surfaces_store_error(cache: AmenityCache<MemoryAmenityStore>) {
        let err = cache
            .update(&amenity(77, 0.5, 0.5, AmenityType::Shop))
            .expect_err("unknown amenity");
        assert!(matches!(
            err,
            CacheError::Store(StoreError::UnknownAmenity { id: 77 })
        ));
    }

    #[rstest]
    fn replace_region_swaps_stored_rows(cache: AmenityCache<MemoryAmenityStore>) {
        let removed = cache
            .replace_region(&[amenity(10, 0.75, 0.75, AmenityType::Shop)], &viewport())
            .expect("replace region");
        assert_eq!(removed, 2);
        assert!(cache.delete(10).expect("delete"));
        let found = cache.refresh(&viewport(), 12, None, None).expect("refresh");
        assert!(found.is_empty());
    }
}
