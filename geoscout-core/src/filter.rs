//! Predicates applied to amenity range queries.

use std::collections::{BTreeMap, BTreeSet};

use crate::{Amenity, AmenityType, NameQuery};

/// A predicate over amenities with a stable identity.
///
/// [`AmenityFilter::filter_id`] is compared by the cache to decide whether a
/// cached result set was built with the same predicate. The cache never
/// inspects the predicate itself, so implementers must change the id
/// whenever [`AmenityFilter::accepts`] would change.
pub trait AmenityFilter: Send + Sync {
    /// Identity used for cache-key equality.
    fn filter_id(&self) -> &str;

    /// Whether `amenity` passes the filter.
    fn accepts(&self, amenity: &Amenity) -> bool;
}

/// Category, subtype and name filter.
///
/// With no categories selected every category passes. Selecting a category
/// without subtypes accepts the whole category.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use geoscout_core::{Amenity, AmenityFilter, AmenityType, PoiFilter};
///
/// let filter = PoiFilter::new("coffee")
///     .with_subtype(AmenityType::Sustenance, "cafe")
///     .with_name("bean");
/// let cafe = Amenity::new(1, Coord { x: 0.0, y: 0.0 }, "Green Bean", AmenityType::Sustenance)
///     .with_subtype("cafe");
/// let bar = Amenity::new(2, Coord { x: 0.0, y: 0.0 }, "Bean Bar", AmenityType::Sustenance)
///     .with_subtype("bar");
/// assert!(filter.accepts(&cafe));
/// assert!(!filter.accepts(&bar));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoiFilter {
    id: String,
    categories: BTreeMap<AmenityType, Option<BTreeSet<String>>>,
    name: Option<NameQuery>,
}

impl PoiFilter {
    /// A filter accepting every amenity.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            categories: BTreeMap::new(),
            name: None,
        }
    }

    /// Accept every amenity of `kind`.
    #[must_use]
    pub fn with_category(mut self, kind: AmenityType) -> Self {
        self.categories.insert(kind, None);
        self
    }

    /// Accept amenities of `kind` with the given subtype.
    ///
    /// Has no effect when the whole category is already selected.
    #[must_use]
    pub fn with_subtype(mut self, kind: AmenityType, subtype: impl Into<String>) -> Self {
        let entry = self
            .categories
            .entry(kind)
            .or_insert_with(|| Some(BTreeSet::new()));
        if let Some(subtypes) = entry {
            subtypes.insert(subtype.into());
        }
        self
    }

    /// Require the local or English name to contain `query`.
    #[must_use]
    pub fn with_name(mut self, query: &str) -> Self {
        let query = NameQuery::new(query);
        self.name = (!query.is_empty()).then_some(query);
        self
    }

    fn accepts_category(&self, amenity: &Amenity) -> bool {
        if self.categories.is_empty() {
            return true;
        }
        match self.categories.get(&amenity.kind) {
            Some(None) => true,
            Some(Some(subtypes)) => subtypes.contains(&amenity.subtype),
            None => false,
        }
    }

    fn accepts_name(&self, amenity: &Amenity) -> bool {
        self.name.as_ref().is_none_or(|query| {
            query.match_kind(&amenity.name).is_some() || query.match_kind(&amenity.name_en).is_some()
        })
    }
}

impl AmenityFilter for PoiFilter {
    fn filter_id(&self) -> &str {
        &self.id
    }

    fn accepts(&self, amenity: &Amenity) -> bool {
        self.accepts_category(amenity) && self.accepts_name(amenity)
    }
}
