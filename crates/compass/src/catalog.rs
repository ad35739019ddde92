//! Kind-to-row mapping and per-kind icon art.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum_macros::{Display, EnumIter};

use crate::poi::{PoiKind, PoiKinds};

/// Icon row on the strip
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter, Serialize, Deserialize,
)]
pub enum Row {
    Above,
    Below,
}

impl Row {
    /// Only the lower row moves colliding icons aside
    pub fn supports_overflow(self) -> bool {
        matches!(self, Row::Below)
    }
}

/// RGBA tint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tint(pub [u8; 4]);

impl Default for Tint {
    fn default() -> Self {
        Tint([255, 255, 255, 255])
    }
}

/// Image reference and tint for one kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconArt {
    pub image: String,
    #[serde(default)]
    pub tint: Tint,
}

impl IconArt {
    pub fn new(image: impl Into<String>, tint: [u8; 4]) -> Self {
        Self {
            image: image.into(),
            tint: Tint(tint),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowMapping {
    pub kinds: PoiKinds,
    pub row: Row,
}

#[derive(Debug, Clone, Default)]
pub struct IconCatalog {
    rows: Vec<RowMapping>,
    art: HashMap<PoiKind, IconArt>,
}

impl IconCatalog {
    pub fn new(rows: Vec<RowMapping>, art: HashMap<PoiKind, IconArt>) -> Self {
        Self { rows, art }
    }

    pub fn rows(&self) -> &[RowMapping] {
        &self.rows
    }

    /// Row for a POI kind set.
    ///
    /// Exact set match first, then the first mapping holding the primary kind,
    /// then the first mapping sharing any kind.
    pub fn row_for(&self, kinds: PoiKinds) -> Option<Row> {
        if kinds.is_empty() {
            return None;
        }
        if let Some(m) = self.rows.iter().find(|m| m.kinds == kinds) {
            return Some(m.row);
        }
        if let Some(primary) = kinds.primary()
            && let Some(m) = self.rows.iter().find(|m| m.kinds.contains(primary))
        {
            return Some(m.row);
        }
        self.rows
            .iter()
            .find(|m| m.kinds.intersects(kinds))
            .map(|m| m.row)
    }

    pub fn art_for(&self, kind: PoiKind) -> Option<&IconArt> {
        self.art.get(&kind)
    }

    /// (kind, art) pairs in declared order; kinds without art are left out
    pub fn art_sequence(&self, kinds: PoiKinds) -> Vec<(PoiKind, &IconArt)> {
        kinds
            .iter()
            .filter_map(|k| self.art.get(&k).map(|a| (k, a)))
            .collect()
    }
}
