//! In-memory amenity store backed by an R\*-tree.

use std::{collections::HashMap, fmt};

use parking_lot::RwLock;
use rstar::{AABB, RTree, RTreeObject};

use crate::{Amenity, AmenityFilter, BoundingBox};

use super::{AmenityStore, StoreError};

impl RTreeObject for Amenity {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.location.x, self.location.y])
    }
}

fn envelope(bbox: &BoundingBox) -> AABB<[f64; 2]> {
    AABB::from_corners([bbox.left, bbox.bottom], [bbox.right, bbox.top])
}

#[derive(Default)]
struct Index {
    tree: RTree<Amenity>,
    by_id: HashMap<u64, Amenity>,
}

impl Index {
    fn remove(&mut self, id: u64) -> bool {
        let Some(previous) = self.by_id.remove(&id) else {
            return false;
        };
        self.tree.remove(&previous);
        true
    }

    fn insert(&mut self, amenity: Amenity) {
        self.remove(amenity.id);
        self.by_id.insert(amenity.id, amenity.clone());
        self.tree.insert(amenity);
    }
}

/// Amenity store holding every row in an R\*-tree.
///
/// Query results are ordered by id before the limit is applied.
#[derive(Default)]
pub struct MemoryAmenityStore {
    index: RwLock<Index>,
}

impl fmt::Debug for MemoryAmenityStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryAmenityStore")
            .field("entries", &self.len())
            .finish_non_exhaustive()
    }
}

impl MemoryAmenityStore {
    /// Create a store from a collection of amenities.
    pub fn with_amenities<I>(amenities: I) -> Self
    where
        I: IntoIterator<Item = Amenity>,
    {
        let by_id: HashMap<u64, Amenity> = amenities
            .into_iter()
            .map(|amenity| (amenity.id, amenity))
            .collect();
        let tree = RTree::bulk_load(by_id.values().cloned().collect());
        Self {
            index: RwLock::new(Index { tree, by_id }),
        }
    }

    /// Number of stored amenities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.read().by_id.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AmenityStore for MemoryAmenityStore {
    fn query_range(
        &self,
        bbox: &BoundingBox,
        filter: Option<&dyn AmenityFilter>,
        limit: Option<usize>,
    ) -> Result<Vec<Amenity>, StoreError> {
        let index = self.index.read();
        let mut found: Vec<Amenity> = index
            .tree
            .locate_in_envelope(&envelope(bbox))
            .filter(|amenity| bbox.contains_point(amenity.location))
            .filter(|amenity| filter.is_none_or(|f| f.accepts(amenity)))
            .cloned()
            .collect();
        drop(index);

        found.sort_unstable_by_key(|amenity| amenity.id);
        if let Some(limit) = limit {
            found.truncate(limit);
        }
        Ok(found)
    }

    fn insert(&self, amenities: &[Amenity]) -> Result<(), StoreError> {
        let mut index = self.index.write();
        for amenity in amenities {
            index.insert(amenity.clone());
        }
        Ok(())
    }

    fn update(&self, amenity: &Amenity) -> Result<(), StoreError> {
        let mut index = self.index.write();
        if !index.by_id.contains_key(&amenity.id) {
            return Err(StoreError::UnknownAmenity { id: amenity.id });
        }
        index.insert(amenity.clone());
        Ok(())
    }

    fn delete(&self, id: u64) -> Result<bool, StoreError> {
        Ok(self.index.write().remove(id))
    }

    fn delete_range(&self, bbox: &BoundingBox) -> Result<usize, StoreError> {
        let mut index = self.index.write();
        let doomed: Vec<u64> = index
            .tree
            .locate_in_envelope(&envelope(bbox))
            .map(|amenity| amenity.id)
            .collect();
        for id in &doomed {
            index.remove(*id);
        }
        Ok(doomed.len())
    }
}
