//! Named map objects forming the address hierarchy.

use std::sync::Arc;

use geo::Coord;

use super::lazy::LazyChildren;
use crate::matcher::transliterate;

/// Fields shared by every named map object.
#[derive(Debug, Clone, PartialEq)]
pub struct MapObjectInfo {
    /// Identifier, unique within the object's kind.
    pub id: i64,
    /// Local name.
    pub name: String,
    /// English or transliterated name.
    pub name_en: String,
    /// Representative location (`x = longitude`, `y = latitude`).
    pub location: Coord<f64>,
}

impl MapObjectInfo {
    /// Build the record, transliterating `name` for the English field.
    pub fn new(id: i64, name: impl Into<String>, location: Coord<f64>) -> Self {
        let name = name.into();
        let name_en = transliterate(&name);
        Self {
            id,
            name,
            name_en,
            location,
        }
    }

    /// Set the English name; an empty value keeps the transliteration.
    #[must_use]
    pub fn with_name_en(mut self, name_en: impl Into<String>) -> Self {
        let name_en = name_en.into();
        if !name_en.is_empty() {
            self.name_en = name_en;
        }
        self
    }
}

/// Common view over cities, postcodes, streets and buildings.
pub trait MapObject {
    /// Shared fields.
    fn info(&self) -> &MapObjectInfo;

    /// Identifier.
    fn id(&self) -> i64 {
        self.info().id
    }

    /// Local name.
    fn name(&self) -> &str {
        &self.info().name
    }

    /// English name.
    fn name_en(&self) -> &str {
        &self.info().name_en
    }

    /// Representative location.
    fn location(&self) -> Coord<f64> {
        self.info().location
    }

    /// The name used for matching and display.
    fn display_name(&self, use_english_names: bool) -> &str {
        if use_english_names {
            self.name_en()
        } else {
            self.name()
        }
    }
}

impl<T: MapObject + ?Sized> MapObject for Arc<T> {
    fn info(&self) -> &MapObjectInfo {
        (**self).info()
    }
}

/// Settlement classification of a [`City`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum CityKind {
    /// A city.
    City,
    /// A town.
    Town,
    /// A village; kept out of the resident city list.
    Village,
    /// A hamlet; kept out of the resident city list.
    Hamlet,
    /// A suburb of a larger city.
    Suburb,
}

impl CityKind {
    /// Whether settlements of this kind are loaded on demand only.
    #[must_use]
    pub const fn is_village(self) -> bool {
        matches!(self, Self::Village | Self::Hamlet)
    }
}

/// A settlement owning streets.
#[derive(Debug)]
pub struct City {
    info: MapObjectInfo,
    kind: CityKind,
    region: Option<Arc<str>>,
    streets: LazyChildren<Arc<Street>>,
}

impl City {
    /// Create a city with unloaded streets.
    #[must_use]
    pub fn new(info: MapObjectInfo, kind: CityKind) -> Self {
        Self {
            info,
            kind,
            region: None,
            streets: LazyChildren::default(),
        }
    }

    /// Tag the city with the region it was read from.
    #[must_use]
    pub fn in_region(mut self, region: impl Into<Arc<str>>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Region the city was read from, if tagged.
    #[must_use]
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// Settlement classification.
    #[must_use]
    pub const fn kind(&self) -> CityKind {
        self.kind
    }

    /// Lazily loaded streets.
    #[must_use]
    pub const fn streets(&self) -> &LazyChildren<Arc<Street>> {
        &self.streets
    }
}

impl MapObject for City {
    fn info(&self) -> &MapObjectInfo {
        &self.info
    }
}

/// A postal code owning streets.
#[derive(Debug)]
pub struct Postcode {
    info: MapObjectInfo,
    region: Option<Arc<str>>,
    streets: LazyChildren<Arc<Street>>,
}

impl Postcode {
    /// Create a postcode; the code is normalised to uppercase.
    #[must_use]
    pub fn new(mut info: MapObjectInfo) -> Self {
        info.name = info.name.to_uppercase();
        info.name_en = info.name_en.to_uppercase();
        Self {
            info,
            region: None,
            streets: LazyChildren::default(),
        }
    }

    /// Tag the postcode with the region it was read from.
    #[must_use]
    pub fn in_region(mut self, region: impl Into<Arc<str>>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Region the postcode was read from, if tagged.
    #[must_use]
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// The normalised code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.info.name
    }

    /// Lazily loaded streets.
    #[must_use]
    pub const fn streets(&self) -> &LazyChildren<Arc<Street>> {
        &self.streets
    }
}

impl MapObject for Postcode {
    fn info(&self) -> &MapObjectInfo {
        &self.info
    }
}

/// A street owning buildings.
#[derive(Debug)]
pub struct Street {
    info: MapObjectInfo,
    region: Option<Arc<str>>,
    buildings: LazyChildren<Arc<Building>>,
}

impl Street {
    /// Create a street with unloaded buildings.
    #[must_use]
    pub fn new(info: MapObjectInfo) -> Self {
        Self {
            info,
            region: None,
            buildings: LazyChildren::default(),
        }
    }

    /// Tag the street with the region it was read from.
    #[must_use]
    pub fn in_region(mut self, region: impl Into<Arc<str>>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Region the street was read from, if tagged.
    #[must_use]
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// Lazily loaded buildings.
    #[must_use]
    pub const fn buildings(&self) -> &LazyChildren<Arc<Building>> {
        &self.buildings
    }
}

impl MapObject for Street {
    fn info(&self) -> &MapObjectInfo {
        &self.info
    }
}

/// A building with a house number as its name.
#[derive(Debug, Clone, PartialEq)]
pub struct Building {
    info: MapObjectInfo,
}

impl Building {
    /// Create a building.
    #[must_use]
    pub const fn new(info: MapObjectInfo) -> Self {
        Self { info }
    }
}

impl MapObject for Building {
    fn info(&self) -> &MapObjectInfo {
        &self.info
    }
}

/// Either parent of a street collection.
#[derive(Debug, Clone, Copy)]
pub enum StreetOwner<'a> {
    /// Streets of a city.
    City(&'a City),
    /// Streets of a postcode.
    Postcode(&'a Postcode),
}

impl<'a> StreetOwner<'a> {
    /// The owner's lazy street collection.
    #[must_use]
    pub fn streets(self) -> &'a LazyChildren<Arc<Street>> {
        match self {
            Self::City(city) => city.streets(),
            Self::Postcode(postcode) => postcode.streets(),
        }
    }

    /// The owner's shared fields.
    #[must_use]
    pub fn info(self) -> &'a MapObjectInfo {
        match self {
            Self::City(city) => city.info(),
            Self::Postcode(postcode) => postcode.info(),
        }
    }

    /// Region the owner was read from, if tagged.
    #[must_use]
    pub fn region(self) -> Option<&'a str> {
        match self {
            Self::City(city) => city.region(),
            Self::Postcode(postcode) => postcode.region(),
        }
    }
}

impl<'a> From<&'a City> for StreetOwner<'a> {
    fn from(city: &'a City) -> Self {
        Self::City(city)
    }
}

impl<'a> From<&'a Postcode> for StreetOwner<'a> {
    fn from(postcode: &'a Postcode) -> Self {
        Self::Postcode(postcode)
    }
}

/// An entry returned by city suggestion: a settlement or a postcode.
#[derive(Debug, Clone)]
pub enum CitySuggestion {
    /// A settlement.
    City(Arc<City>),
    /// A postcode.
    Postcode(Arc<Postcode>),
}

impl CitySuggestion {
    /// Borrow the suggestion as a street owner.
    #[must_use]
    pub fn as_owner(&self) -> StreetOwner<'_> {
        match self {
            Self::City(city) => StreetOwner::City(city),
            Self::Postcode(postcode) => StreetOwner::Postcode(postcode),
        }
    }

    /// The city, if this suggestion is one.
    #[must_use]
    pub fn as_city(&self) -> Option<&Arc<City>> {
        match self {
            Self::City(city) => Some(city),
            Self::Postcode(_) => None,
        }
    }
}

impl MapObject for CitySuggestion {
    fn info(&self) -> &MapObjectInfo {
        match self {
            Self::City(city) => city.info(),
            Self::Postcode(postcode) => postcode.info(),
        }
    }
}
