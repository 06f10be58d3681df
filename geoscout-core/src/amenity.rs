//! Points of interest served by the amenity cache and stores.

use std::{convert::Infallible, fmt, str::FromStr};

use geo::Coord;

use crate::matcher::transliterate;

/// Category of an [`Amenity`].
///
/// Parsing is case-insensitive and never fails: unknown categories map to
/// [`AmenityType::Other`].
///
/// # Examples
/// ```
/// use geoscout_core::AmenityType;
///
/// assert_eq!("Shop".parse::<AmenityType>(), Ok(AmenityType::Shop));
/// assert_eq!(AmenityType::parse("spaceport"), AmenityType::Other);
/// assert_eq!(AmenityType::ManMade.as_str(), "man_made");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum AmenityType {
    /// Emergency services.
    Emergency,
    /// Hospitals, pharmacies and clinics.
    Healthcare,
    /// Stations, parking and fuel.
    Transportation,
    /// Gates and other barriers.
    Barrier,
    /// Parks and recreation.
    Leisure,
    /// Cinemas, theatres and nightlife.
    Entertainment,
    /// Hotels, attractions and viewpoints.
    Tourism,
    /// Monuments and historic sites.
    Historic,
    /// Peaks, springs and other natural features.
    Natural,
    /// Shops.
    Shop,
    /// Sports facilities.
    Sport,
    /// Restaurants, cafés and bars.
    Sustenance,
    /// Schools and universities.
    Education,
    /// Government and administrative offices.
    Administrative,
    /// Banks and ATMs.
    Finance,
    /// Towers, wells and other man-made structures.
    ManMade,
    /// Geocaches.
    Geocache,
    /// Wiki-linked objects.
    Osmwiki,
    /// Land use areas.
    Landuse,
    /// Military sites.
    Military,
    /// Anything else.
    Other,
}

impl AmenityType {
    /// Every category, in declaration order.
    pub const ALL: [Self; 21] = [
        Self::Emergency,
        Self::Healthcare,
        Self::Transportation,
        Self::Barrier,
        Self::Leisure,
        Self::Entertainment,
        Self::Tourism,
        Self::Historic,
        Self::Natural,
        Self::Shop,
        Self::Sport,
        Self::Sustenance,
        Self::Education,
        Self::Administrative,
        Self::Finance,
        Self::ManMade,
        Self::Geocache,
        Self::Osmwiki,
        Self::Landuse,
        Self::Military,
        Self::Other,
    ];

    /// Canonical lowercase name, as persisted by the stores.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Emergency => "emergency",
            Self::Healthcare => "healthcare",
            Self::Transportation => "transportation",
            Self::Barrier => "barrier",
            Self::Leisure => "leisure",
            Self::Entertainment => "entertainment",
            Self::Tourism => "tourism",
            Self::Historic => "historic",
            Self::Natural => "natural",
            Self::Shop => "shop",
            Self::Sport => "sport",
            Self::Sustenance => "sustenance",
            Self::Education => "education",
            Self::Administrative => "administrative",
            Self::Finance => "finance",
            Self::ManMade => "man_made",
            Self::Geocache => "geocache",
            Self::Osmwiki => "osmwiki",
            Self::Landuse => "landuse",
            Self::Military => "military",
            Self::Other => "other",
        }
    }

    /// Parse a category name, falling back to [`AmenityType::Other`].
    #[must_use]
    pub fn parse(name: &str) -> Self {
        let folded = name.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == folded)
            .unwrap_or(Self::Other)
    }
}

impl fmt::Display for AmenityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AmenityType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

/// A point of interest.
///
/// Coordinates are WGS84 with `x = longitude` and `y = latitude`. When no
/// English name is supplied, `name_en` holds an ASCII transliteration of
/// the local name.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use geoscout_core::{Amenity, AmenityType};
///
/// let cafe = Amenity::new(7, Coord { x: 13.4, y: 52.5 }, "Café Größenwahn", AmenityType::Sustenance)
///     .with_subtype("cafe");
/// assert_eq!(cafe.name_en, "Cafe Grossenwahn");
/// assert_eq!(cafe.latitude(), 52.5);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Amenity {
    /// Unique identifier.
    pub id: u64,
    /// Geospatial position.
    pub location: Coord<f64>,
    /// Local name.
    pub name: String,
    /// English or transliterated name.
    pub name_en: String,
    /// Category.
    pub kind: AmenityType,
    /// Free-text subtype within the category, such as `cafe`.
    pub subtype: String,
    /// Opening hours in OSM syntax.
    pub opening_hours: String,
    /// Website.
    pub site: String,
    /// Phone number.
    pub phone: String,
}

impl Amenity {
    /// Construct an amenity with a transliterated English name and empty
    /// auxiliary fields.
    pub fn new(id: u64, location: Coord<f64>, name: impl Into<String>, kind: AmenityType) -> Self {
        let name = name.into();
        let name_en = transliterate(&name);
        Self {
            id,
            location,
            name,
            name_en,
            kind,
            subtype: String::new(),
            opening_hours: String::new(),
            site: String::new(),
            phone: String::new(),
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

    /// Set the subtype.
    #[must_use]
    pub fn with_subtype(mut self, subtype: impl Into<String>) -> Self {
        self.subtype = subtype.into();
        self
    }

    /// Set the opening hours.
    #[must_use]
    pub fn with_opening_hours(mut self, opening_hours: impl Into<String>) -> Self {
        self.opening_hours = opening_hours.into();
        self
    }

    /// Set the website.
    #[must_use]
    pub fn with_site(mut self, site: impl Into<String>) -> Self {
        self.site = site.into();
        self
    }

    /// Set the phone number.
    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = phone.into();
        self
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.location.y
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.location.x
    }

    /// Name in the requested language.
    #[must_use]
    pub fn display_name(&self, use_english_names: bool) -> &str {
        if use_english_names {
            &self.name_en
        } else {
            &self.name
        }
    }
}
