//! Latitude/longitude bounding boxes used by amenity queries.

use geo::{Coord, Rect};

/// An axis-aligned box in WGS84 degrees.
///
/// `top`/`bottom` are latitudes and `left`/`right` are longitudes. Boxes that
/// cross the antimeridian are not modelled; callers split such areas into two
/// boxes.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use geoscout_core::BoundingBox;
///
/// let bbox = BoundingBox::new(2.0, 0.0, 10.0, 12.0);
/// assert!(bbox.contains_point(Coord { x: 11.0, y: 1.0 }));
/// assert!(!bbox.contains_point(Coord { x: 12.0, y: 1.0 }));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingBox {
    /// Northern latitude.
    pub top: f64,
    /// Southern latitude.
    pub bottom: f64,
    /// Western longitude.
    pub left: f64,
    /// Eastern longitude.
    pub right: f64,
}

impl BoundingBox {
    /// Construct a box from its four edges.
    #[must_use]
    pub const fn new(top: f64, bottom: f64, left: f64, right: f64) -> Self {
        Self {
            top,
            bottom,
            left,
            right,
        }
    }

    /// Longitudinal span in degrees.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    /// Latitudinal span in degrees.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.top - self.bottom
    }

    /// Grow the box by its own span on every side.
    ///
    /// The result is three times as wide and three times as tall as `self`
    /// and shares its centre. Caching the grown box absorbs small pans
    /// without another store scan.
    #[must_use]
    pub fn expanded(&self) -> Self {
        let width = self.width();
        let height = self.height();
        Self {
            top: self.top + height,
            bottom: self.bottom - height,
            left: self.left - width,
            right: self.right + width,
        }
    }

    /// Whether `other` lies entirely inside `self`, edges included.
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        self.top >= other.top
            && self.bottom <= other.bottom
            && self.left <= other.left
            && self.right >= other.right
    }

    /// Whether `point` lies strictly inside the box.
    ///
    /// Points on an edge are outside; this matches the range predicate the
    /// stores apply.
    #[must_use]
    pub fn contains_point(&self, point: Coord<f64>) -> bool {
        self.bottom < point.y && point.y < self.top && self.left < point.x && point.x < self.right
    }

    /// Whether `point` lies inside the box or on its edge.
    #[must_use]
    pub fn covers_point(&self, point: Coord<f64>) -> bool {
        self.bottom <= point.y && point.y <= self.top && self.left <= point.x && point.x <= self.right
    }

    /// South-west corner as a coordinate (`x = longitude`, `y = latitude`).
    #[must_use]
    pub const fn min(&self) -> Coord<f64> {
        Coord {
            x: self.left,
            y: self.bottom,
        }
    }

    /// North-east corner as a coordinate.
    #[must_use]
    pub const fn max(&self) -> Coord<f64> {
        Coord {
            x: self.right,
            y: self.top,
        }
    }
}

impl From<Rect<f64>> for BoundingBox {
    fn from(rect: Rect<f64>) -> Self {
        Self {
            top: rect.max().y,
            bottom: rect.min().y,
            left: rect.min().x,
            right: rect.max().x,
        }
    }
}

impl From<BoundingBox> for Rect<f64> {
    fn from(bbox: BoundingBox) -> Self {
        Self::new(bbox.min(), bbox.max())
    }
}
