use serde::{Deserialize, Serialize};
use std::fmt;
use strum_macros::{Display, EnumCount, EnumIter, EnumString};

use crate::constants::KIND_ORDER;

/// POI classification flag
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    EnumIter,
    EnumCount,
    Serialize,
    Deserialize,
)]
pub enum PoiKind {
    QuestGiver,
    Vendor,
    Landmark,
    Resource,
    Player,
}

impl PoiKind {
    #[inline]
    fn bit(self) -> u32 {
        1 << (self as u32)
    }
}

/// Set of kinds carried by one POI (bitset)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Vec<PoiKind>", into = "Vec<PoiKind>")]
pub struct PoiKinds(u32);

impl PoiKinds {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn with(mut self, kind: PoiKind) -> Self {
        self.insert(kind);
        self
    }

    pub fn insert(&mut self, kind: PoiKind) {
        self.0 |= kind.bit();
    }

    pub fn remove(&mut self, kind: PoiKind) {
        self.0 &= !kind.bit();
    }

    pub fn contains(self, kind: PoiKind) -> bool {
        self.0 & kind.bit() != 0
    }

    pub fn intersects(self, other: PoiKinds) -> bool {
        self.0 & other.0 != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Kinds present, in declared order
    pub fn iter(self) -> impl Iterator<Item = PoiKind> {
        KIND_ORDER.into_iter().filter(move |&k| self.contains(k))
    }

    /// First kind present in declared order
    pub fn primary(self) -> Option<PoiKind> {
        self.iter().next()
    }

    /// Every kind after the primary, in declared order
    pub fn secondaries(self) -> impl Iterator<Item = PoiKind> {
        self.iter().skip(1)
    }
}

impl FromIterator<PoiKind> for PoiKinds {
    fn from_iter<I: IntoIterator<Item = PoiKind>>(iter: I) -> Self {
        iter.into_iter().fold(PoiKinds::empty(), PoiKinds::with)
    }
}

impl From<PoiKind> for PoiKinds {
    fn from(kind: PoiKind) -> Self {
        PoiKinds::empty().with(kind)
    }
}

impl From<Vec<PoiKind>> for PoiKinds {
    fn from(kinds: Vec<PoiKind>) -> Self {
        kinds.into_iter().collect()
    }
}

impl From<PoiKinds> for Vec<PoiKind> {
    fn from(kinds: PoiKinds) -> Self {
        kinds.iter().collect()
    }
}

impl fmt::Display for PoiKinds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.iter().map(|k| k.to_string()).collect();
        write!(f, "{{{}}}", names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::{EnumCount, IntoEnumIterator};

    #[test]
    fn test_declared_order_covers_every_kind() {
        assert_eq!(KIND_ORDER.len(), PoiKind::COUNT);
        for kind in PoiKind::iter() {
            assert!(KIND_ORDER.contains(&kind), "{kind} missing from KIND_ORDER");
        }
    }

    #[test]
    fn test_primary_and_secondaries() {
        let kinds: PoiKinds = [PoiKind::Landmark, PoiKind::QuestGiver, PoiKind::Vendor]
            .into_iter()
            .collect();
        assert_eq!(kinds.primary(), Some(PoiKind::QuestGiver));
        let secondaries: Vec<_> = kinds.secondaries().collect();
        assert_eq!(secondaries, vec![PoiKind::Vendor, PoiKind::Landmark]);
    }

    #[test]
    fn test_empty_has_no_primary() {
        assert_eq!(PoiKinds::empty().primary(), None);
        assert_eq!(PoiKinds::empty().secondaries().count(), 0);
    }

    #[test]
    fn test_set_operations() {
        let mut kinds = PoiKinds::from(PoiKind::Resource);
        assert!(kinds.contains(PoiKind::Resource));
        assert!(!kinds.contains(PoiKind::Player));
        kinds.insert(PoiKind::Player);
        assert_eq!(kinds.len(), 2);
        assert!(kinds.intersects(PoiKinds::from(PoiKind::Player)));
        kinds.remove(PoiKind::Resource);
        assert_eq!(kinds, PoiKinds::from(PoiKind::Player));
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!(PoiKind::from_str("Vendor").unwrap(), PoiKind::Vendor);
        assert!(PoiKind::from_str("Dragon").is_err());
        let kinds = PoiKinds::from(PoiKind::Vendor).with(PoiKind::QuestGiver);
        assert_eq!(kinds.to_string(), "{QuestGiver, Vendor}");
    }
}
