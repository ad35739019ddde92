use crate::{
    catalog::{IconArt, IconCatalog, Row, RowMapping},
    constants::*,
    error::{CompassError, Result},
    geometry::Vec3,
    poi::{PoiKind, PoiKinds},
    slots::{IconSurface, SlotPool},
};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, path::Path, str::FromStr};

/// Top-level configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub display: DisplaySettings,
    #[serde(default)]
    pub pool: PoolSettings,
    #[serde(default = "default_rows")]
    pub rows: Vec<RowMapping>,
    /// Kind name -> icon art
    #[serde(default = "default_art")]
    pub art: BTreeMap<String, IconArt>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DisplaySettings {
    pub max_display_distance: f32,
    /// Player movement that triggers a membership sync
    pub position_change_threshold: f32,
    /// Minimum x change (px) pushed to a slot
    pub icon_position_threshold: f32,
    pub elevation_threshold: f32,
    pub band_width: f32,
    /// Share of a full turn visible across the band
    pub uv_width_fraction: f32,
    /// Band texture offset of north, in turns
    pub north_texture_offset: f32,
    pub always_point_north: bool,
    pub distance_decimals: usize,
    pub min_icon_spacing: f32,
    pub overflow_y_offset: f32,
    pub north: Vec3,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            max_display_distance: DEFAULT_MAX_DISPLAY_DISTANCE,
            position_change_threshold: DEFAULT_POSITION_CHANGE_THRESHOLD,
            icon_position_threshold: DEFAULT_ICON_POSITION_THRESHOLD,
            elevation_threshold: DEFAULT_ELEVATION_THRESHOLD,
            band_width: DEFAULT_BAND_WIDTH,
            uv_width_fraction: DEFAULT_UV_WIDTH_FRACTION,
            north_texture_offset: 0.0,
            always_point_north: false,
            distance_decimals: 0,
            min_icon_spacing: DEFAULT_MIN_ICON_SPACING,
            overflow_y_offset: DEFAULT_OVERFLOW_Y_OFFSET,
            north: Vec3::FORWARD,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PoolSettings {
    pub above_slots: usize,
    pub below_slots: usize,
    pub secondary_per_slot: usize,
    pub icon_half_width: f32,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            above_slots: DEFAULT_ROW_SLOTS,
            below_slots: DEFAULT_ROW_SLOTS,
            secondary_per_slot: DEFAULT_SECONDARY_PER_SLOT,
            icon_half_width: DEFAULT_ICON_HALF_WIDTH,
        }
    }
}

impl PoolSettings {
    /// Build a pool, creating each surface with `make(row, index)`
    pub fn build_pool<S, F>(&self, mut make: F) -> SlotPool<S>
    where
        S: IconSurface,
        F: FnMut(Row, usize) -> S,
    {
        let above = (0..self.above_slots).map(|i| make(Row::Above, i)).collect();
        let below = (0..self.below_slots).map(|i| make(Row::Below, i)).collect();
        SlotPool::new(above, below)
    }
}

fn default_rows() -> Vec<RowMapping> {
    use PoiKind::*;
    [
        (QuestGiver, Row::Above),
        (Landmark, Row::Above),
        (Vendor, Row::Below),
        (Resource, Row::Below),
        (Player, Row::Below),
    ]
    .into_iter()
    .map(|(kind, row)| RowMapping {
        kinds: kind.into(),
        row,
    })
    .collect()
}

fn default_art() -> BTreeMap<String, IconArt> {
    use PoiKind::*;
    [
        (QuestGiver, "icons/quest_giver.png", [255, 215, 0, 255]),
        (Vendor, "icons/vendor.png", [120, 200, 255, 255]),
        (Landmark, "icons/landmark.png", [220, 220, 220, 255]),
        (Resource, "icons/resource.png", [140, 230, 120, 255]),
        (Player, "icons/player.png", [255, 120, 120, 255]),
    ]
    .into_iter()
    .map(|(kind, image, tint)| (kind.to_string(), IconArt::new(image, tint)))
    .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            display: DisplaySettings::default(),
            pool: PoolSettings::default(),
            rows: default_rows(),
            art: default_art(),
        }
    }
}

impl Config {
    /// Load and validate a TOML configuration file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            CompassError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| {
            CompassError::Config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let d = &self.display;
        if !(d.max_display_distance > 0.0) {
            return Err(CompassError::Config(format!(
                "max_display_distance must be positive, got {}",
                d.max_display_distance
            )));
        }
        if !(d.band_width > 0.0) {
            return Err(CompassError::Config(format!(
                "band_width must be positive, got {}",
                d.band_width
            )));
        }
        if !(d.uv_width_fraction > 0.0 && d.uv_width_fraction <= 1.0) {
            return Err(CompassError::Config(format!(
                "uv_width_fraction must be in (0, 1], got {}",
                d.uv_width_fraction
            )));
        }
        for (name, value) in [
            ("position_change_threshold", d.position_change_threshold),
            ("icon_position_threshold", d.icon_position_threshold),
            ("elevation_threshold", d.elevation_threshold),
            ("min_icon_spacing", d.min_icon_spacing),
        ] {
            if !(value >= 0.0) {
                return Err(CompassError::Config(format!(
                    "{name} must be non-negative, got {value}"
                )));
            }
        }
        if !d.north.is_finite() || !d.overflow_y_offset.is_finite() {
            return Err(CompassError::Config(
                "north and overflow_y_offset must be finite".to_string(),
            ));
        }

        if self.pool.above_slots == 0 || self.pool.below_slots == 0 {
            return Err(CompassError::Config(format!(
                "each row needs at least one slot, got above={} below={}",
                self.pool.above_slots, self.pool.below_slots
            )));
        }
        if !(self.pool.icon_half_width >= 0.0) {
            return Err(CompassError::Config(format!(
                "icon_half_width must be non-negative, got {}",
                self.pool.icon_half_width
            )));
        }

        if let Some(i) = self.rows.iter().position(|m| m.kinds.is_empty()) {
            return Err(CompassError::Config(format!(
                "row mapping #{i} has no kinds"
            )));
        }

        // kind names are checked here so a typo fails at load time
        self.parsed_art()?;
        Ok(())
    }

    fn parsed_art(&self) -> Result<Vec<(PoiKind, IconArt)>> {
        self.art
            .iter()
            .map(|(name, art)| {
                PoiKind::from_str(name)
                    .map(|kind| (kind, art.clone()))
                    .map_err(|_| CompassError::UnknownKind(name.clone()))
            })
            .collect()
    }

    /// Row mappings and art as a lookup catalog
    pub fn catalog(&self) -> Result<IconCatalog> {
        let art = self.parsed_art()?.into_iter().collect();
        Ok(IconCatalog::new(self.rows.clone(), art))
    }

    /// Kinds that have no row mapping at all
    pub fn unmapped_kinds(&self) -> PoiKinds {
        KIND_ORDER
            .into_iter()
            .filter(|&k| !self.rows.iter().any(|m| m.kinds.contains(k)))
            .collect()
    }
}
