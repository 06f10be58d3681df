//! Behavioural tests for the amenity cache.

use geo::Coord;
use geoscout_core::{
    Amenity, AmenityCache, AmenityFilter, AmenityType, BoundingBox, CacheError,
    MemoryAmenityStore, PoiFilter,
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;

type Cache = AmenityCache<MemoryAmenityStore>;

const ZOOM: u32 = 15;

fn amenity(id: u64, x: f64, y: f64, kind: AmenityType) -> Amenity {
    Amenity::new(id, Coord { x, y }, format!("Amenity {id}"), kind)
}

fn central() -> BoundingBox {
    BoundingBox::new(1.0, 0.0, 0.0, 1.0)
}

#[fixture]
fn cache() -> RefCell<Option<Cache>> {
    RefCell::new(None)
}

#[fixture]
fn results() -> RefCell<Vec<Amenity>> {
    RefCell::new(Vec::new())
}

#[fixture]
fn sufficient() -> RefCell<Option<bool>> {
    RefCell::new(None)
}

#[fixture]
fn failure() -> RefCell<Option<CacheError>> {
    RefCell::new(None)
}

fn lookup(
    cache: &RefCell<Option<Cache>>,
    bbox: &BoundingBox,
    zoom: u32,
    filter_id: Option<&str>,
    include_always: bool,
    results: &RefCell<Vec<Amenity>>,
    sufficient: &RefCell<Option<bool>>,
) {
    let cache = cache.borrow();
    let cache = cache.as_ref().expect("cache created");
    let mut found = Vec::new();
    let served = cache.lookup(bbox, zoom, filter_id, include_always, &mut found);
    *results.borrow_mut() = found;
    *sufficient.borrow_mut() = Some(served);
}

#[given("a store with amenities around the city centre")]
fn given_store(#[from(cache)] cache: &RefCell<Option<Cache>>) {
    let store = MemoryAmenityStore::with_amenities([
        amenity(1, 0.5, 0.5, AmenityType::Shop),
        amenity(2, 1.5, 0.5, AmenityType::Sustenance),
        amenity(3, 2.5, 0.5, AmenityType::Shop),
    ]);
    *cache.borrow_mut() = Some(AmenityCache::new(store));
}

#[given("the cache was refreshed for the central viewport at zoom 15")]
fn given_refreshed(
    #[from(cache)] cache: &RefCell<Option<Cache>>,
    #[from(results)] results: &RefCell<Vec<Amenity>>,
) {
    let fetched = cache
        .borrow()
        .as_ref()
        .expect("cache created")
        .refresh(&central(), ZOOM, None, None)
        .expect("refresh succeeds");
    *results.borrow_mut() = fetched;
}

#[when("I look up a slightly panned viewport at zoom 15")]
fn when_panned(
    #[from(cache)] cache: &RefCell<Option<Cache>>,
    #[from(results)] results: &RefCell<Vec<Amenity>>,
    #[from(sufficient)] sufficient: &RefCell<Option<bool>>,
) {
    let panned = BoundingBox::new(1.0, 0.0, 0.7, 1.7);
    lookup(cache, &panned, ZOOM, None, false, results, sufficient);
}

#[when("I look up the central viewport at zoom 12")]
fn when_zoomed_out(
    #[from(cache)] cache: &RefCell<Option<Cache>>,
    #[from(results)] results: &RefCell<Vec<Amenity>>,
    #[from(sufficient)] sufficient: &RefCell<Option<bool>>,
) {
    lookup(cache, &central(), 12, None, false, results, sufficient);
}

#[when("I look up a wider viewport at zoom 15 accepting stale results")]
fn when_wider(
    #[from(cache)] cache: &RefCell<Option<Cache>>,
    #[from(results)] results: &RefCell<Vec<Amenity>>,
    #[from(sufficient)] sufficient: &RefCell<Option<bool>>,
) {
    let wider = BoundingBox::new(3.0, -2.0, -2.0, 3.0);
    lookup(cache, &wider, ZOOM, None, true, results, sufficient);
}

#[when("I look up the central viewport with the shop filter")]
fn when_filtered(
    #[from(cache)] cache: &RefCell<Option<Cache>>,
    #[from(results)] results: &RefCell<Vec<Amenity>>,
    #[from(sufficient)] sufficient: &RefCell<Option<bool>>,
) {
    let filter = PoiFilter::new("shops").with_category(AmenityType::Shop);
    lookup(
        cache,
        &central(),
        ZOOM,
        Some(filter.filter_id()),
        true,
        results,
        sufficient,
    );
}

#[when("I replace the central region with a single kiosk")]
fn when_replaced(#[from(cache)] cache: &RefCell<Option<Cache>>) {
    let removed = cache
        .borrow()
        .as_ref()
        .expect("cache created")
        .replace_region(&[amenity(50, 0.25, 0.75, AmenityType::Shop)], &central())
        .expect("replace succeeds");
    assert_eq!(removed, 1, "only the centre amenity lies in the central box");
}

#[when("I refresh the central viewport at zoom 15")]
fn when_refreshed(
    #[from(cache)] cache: &RefCell<Option<Cache>>,
    #[from(results)] results: &RefCell<Vec<Amenity>>,
    #[from(failure)] failure: &RefCell<Option<CacheError>>,
) {
    let outcome = cache
        .borrow()
        .as_ref()
        .expect("cache created")
        .refresh(&central(), ZOOM, None, None);
    match outcome {
        Ok(fetched) => *results.borrow_mut() = fetched,
        Err(err) => *failure.borrow_mut() = Some(err),
    }
}

#[when("I close the cache")]
fn when_closed(#[from(cache)] cache: &RefCell<Option<Cache>>) {
    let store = cache.borrow().as_ref().expect("cache created").close();
    assert!(store.is_some(), "the store is handed back on close");
}

#[then("the lookup is sufficient")]
fn then_sufficient(#[from(sufficient)] sufficient: &RefCell<Option<bool>>) {
    assert_eq!(*sufficient.borrow(), Some(true));
}

#[then("the lookup is insufficient")]
fn then_insufficient(#[from(sufficient)] sufficient: &RefCell<Option<bool>>) {
    assert_eq!(*sufficient.borrow(), Some(false));
}

#[then("the amenities with ids {ids} are returned")]
fn then_ids(ids: String, #[from(results)] results: &RefCell<Vec<Amenity>>) {
    let expected: Vec<u64> = ids
        .split(',')
        .map(|id| id.trim().parse().expect("numeric id"))
        .collect();
    let mut found: Vec<u64> = results.borrow().iter().map(|a| a.id).collect();
    found.sort_unstable();
    assert_eq!(found, expected);
}

#[then("no amenities are returned")]
fn then_none(#[from(results)] results: &RefCell<Vec<Amenity>>) {
    assert!(results.borrow().is_empty(), "expected no amenities");
}

#[then("the refresh fails because the store is unavailable")]
fn then_unavailable(#[from(failure)] failure: &RefCell<Option<CacheError>>) {
    assert!(
        matches!(*failure.borrow(), Some(CacheError::StoreUnavailable)),
        "expected StoreUnavailable, found {:?}",
        failure.borrow()
    );
}

#[scenario(path = "tests/features/amenity_cache.feature", index = 0)]
fn scenario_pan_inside_region(
    cache: RefCell<Option<Cache>>,
    results: RefCell<Vec<Amenity>>,
    sufficient: RefCell<Option<bool>>,
    failure: RefCell<Option<CacheError>>,
) {
    let _ = (cache, results, sufficient, failure);
}

#[scenario(path = "tests/features/amenity_cache.feature", index = 1)]
fn scenario_zoom_change(
    cache: RefCell<Option<Cache>>,
    results: RefCell<Vec<Amenity>>,
    sufficient: RefCell<Option<bool>>,
    failure: RefCell<Option<CacheError>>,
) {
    let _ = (cache, results, sufficient, failure);
}

#[scenario(path = "tests/features/amenity_cache.feature", index = 2)]
fn scenario_stale_results(
    cache: RefCell<Option<Cache>>,
    results: RefCell<Vec<Amenity>>,
    sufficient: RefCell<Option<bool>>,
    failure: RefCell<Option<CacheError>>,
) {
    let _ = (cache, results, sufficient, failure);
}

#[scenario(path = "tests/features/amenity_cache.feature", index = 3)]
fn scenario_filter_change(
    cache: RefCell<Option<Cache>>,
    results: RefCell<Vec<Amenity>>,
    sufficient: RefCell<Option<bool>>,
    failure: RefCell<Option<CacheError>>,
) {
    let _ = (cache, results, sufficient, failure);
}

#[scenario(path = "tests/features/amenity_cache.feature", index = 4)]
fn scenario_replace_region(
    cache: RefCell<Option<Cache>>,
    results: RefCell<Vec<Amenity>>,
    sufficient: RefCell<Option<bool>>,
    failure: RefCell<Option<CacheError>>,
) {
    let _ = (cache, results, sufficient, failure);
}

#[scenario(path = "tests/features/amenity_cache.feature", index = 5)]
fn scenario_closed_cache(
    cache: RefCell<Option<Cache>>,
    results: RefCell<Vec<Amenity>>,
    sufficient: RefCell<Option<bool>>,
    failure: RefCell<Option<CacheError>>,
) {
    let _ = (cache, results, sufficient, failure);
}
