use crate::poi::PoiKind;

/// Declared kind order. The first kind of a POI found in this list is its primary kind.
pub const KIND_ORDER: [PoiKind; 5] = [
    PoiKind::QuestGiver,
    PoiKind::Vendor,
    PoiKind::Landmark,
    PoiKind::Resource,
    PoiKind::Player,
];

/// Minimum band offset change (turns) that is written to the band surface
pub const UV_UPDATE_THRESHOLD: f32 = 0.001;

/// Squared length below which a horizontal projection is treated as degenerate
pub const HORIZONTAL_EPSILON: f32 = 1e-6;

/// Suffix appended to formatted distances
pub const DISTANCE_UNIT: &str = "m";

/// Display defaults
pub const DEFAULT_MAX_DISPLAY_DISTANCE: f32 = 100.0;
pub const DEFAULT_POSITION_CHANGE_THRESHOLD: f32 = 1.0;
pub const DEFAULT_ICON_POSITION_THRESHOLD: f32 = 0.5;
pub const DEFAULT_ELEVATION_THRESHOLD: f32 = 2.0;
pub const DEFAULT_BAND_WIDTH: f32 = 512.0; // px
pub const DEFAULT_UV_WIDTH_FRACTION: f32 = 0.5; // visible share of a full turn
pub const DEFAULT_MIN_ICON_SPACING: f32 = 8.0; // px
pub const DEFAULT_OVERFLOW_Y_OFFSET: f32 = -24.0; // px

/// Pool defaults
pub const DEFAULT_ROW_SLOTS: usize = 8;
pub const DEFAULT_SECONDARY_PER_SLOT: usize = 3;
pub const DEFAULT_ICON_HALF_WIDTH: f32 = 16.0; // px
