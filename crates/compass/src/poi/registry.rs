use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::kind::PoiKinds;
use crate::geometry::Vec3;

/// Stable handle to a registered POI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PoiId(pub u64);

impl fmt::Display for PoiId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "poi#{}", self.0)
    }
}

/// A point of interest in world space
#[derive(Debug, Clone, PartialEq)]
pub struct Poi {
    pub id: PoiId,
    /// Center of the object, used for bearing and distance
    pub position: Vec3,
    /// Ground point, used for the elevation indicator
    pub base_position: Vec3,
    pub kinds: PoiKinds,
}

/// Spatial query over POIs the compass does not own.
///
/// Calls are synchronous and must finish within the frame.
pub trait PoiSource {
    /// Registered POIs within `max_radius` of `position`
    fn visible_pois(&self, position: Vec3, max_radius: f32) -> Vec<PoiId>;

    fn is_registered(&self, id: PoiId) -> bool;

    fn poi(&self, id: PoiId) -> Option<&Poi>;
}

/// In-process POI registry
#[derive(Debug, Default)]
pub struct PoiRegistry {
    entries: BTreeMap<PoiId, Poi>,
    next_id: u64,
}

impl PoiRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, position: Vec3, base_position: Vec3, kinds: PoiKinds) -> PoiId {
        let id = PoiId(self.next_id);
        self.next_id += 1;
        self.entries.insert(
            id,
            Poi {
                id,
                position,
                base_position,
                kinds,
            },
        );
        id
    }

    pub fn unregister(&mut self, id: PoiId) -> Option<Poi> {
        self.entries.remove(&id)
    }

    /// Move a POI; returns false when it is not registered
    pub fn move_to(&mut self, id: PoiId, position: Vec3, base_position: Vec3) -> bool {
        match self.entries.get_mut(&id) {
            Some(poi) => {
                poi.position = position;
                poi.base_position = base_position;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All POIs in id order
    pub fn iter(&self) -> impl Iterator<Item = &Poi> {
        self.entries.values()
    }
}

impl PoiSource for PoiRegistry {
    fn visible_pois(&self, position: Vec3, max_radius: f32) -> Vec<PoiId> {
        let max_sq = max_radius * max_radius;
        self.entries
            .values()
            .filter(|poi| (poi.position - position).length_squared() <= max_sq)
            .map(|poi| poi.id)
            .collect()
    }

    fn is_registered(&self, id: PoiId) -> bool {
        self.entries.contains_key(&id)
    }

    fn poi(&self, id: PoiId) -> Option<&Poi> {
        self.entries.get(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poi::PoiKind;

    fn at(x: f32, z: f32) -> Vec3 {
        Vec3::new(x, 0.0, z)
    }

    #[test]
    fn test_register_and_unregister() {
        let mut reg = PoiRegistry::new();
        let a = reg.register(at(1.0, 0.0), at(1.0, 0.0), PoiKind::Vendor.into());
        let b = reg.register(at(2.0, 0.0), at(2.0, 0.0), PoiKind::Player.into());
        assert_ne!(a, b);
        assert_eq!(reg.len(), 2);
        assert!(reg.is_registered(a));

        let removed = reg.unregister(a).unwrap();
        assert_eq!(removed.id, a);
        assert!(!reg.is_registered(a));
        assert!(reg.poi(a).is_none());
        assert!(reg.unregister(a).is_none());
    }

    #[test]
    fn test_visible_pois_uses_radius() {
        let mut reg = PoiRegistry::new();
        let near = reg.register(at(30.0, 40.0), at(30.0, 40.0), PoiKind::Landmark.into());
        let edge = reg.register(at(60.0, 80.0), at(60.0, 80.0), PoiKind::Landmark.into());
        let far = reg.register(at(0.0, 150.0), at(0.0, 150.0), PoiKind::Landmark.into());

        let visible = reg.visible_pois(Vec3::ZERO, 100.0);
        assert!(visible.contains(&near));
        assert!(visible.contains(&edge)); // exactly 100 away
        assert!(!visible.contains(&far));
    }

    #[test]
    fn test_move_to() {
        let mut reg = PoiRegistry::new();
        let id = reg.register(at(0.0, 150.0), at(0.0, 150.0), PoiKind::Resource.into());
        assert!(reg.visible_pois(Vec3::ZERO, 100.0).is_empty());

        assert!(reg.move_to(id, at(0.0, 50.0), at(0.0, 50.0)));
        assert_eq!(reg.visible_pois(Vec3::ZERO, 100.0), vec![id]);
        assert!(!reg.move_to(PoiId(99), Vec3::ZERO, Vec3::ZERO));
    }
}
