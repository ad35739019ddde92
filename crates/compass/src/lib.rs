pub mod catalog;
pub mod config;
pub mod constants;
pub mod driver;
pub mod error;
pub mod geometry;
pub mod heading;
pub mod overflow;
pub mod poi;
pub mod render;
pub mod slots;

pub use catalog::{IconArt, IconCatalog, Row, RowMapping, Tint};
pub use config::{Config, DisplaySettings, PoolSettings};
pub use constants::{KIND_ORDER, UV_UPDATE_THRESHOLD};
pub use driver::{CompassDriver, FrameInput, FrameReport, SkipReason};
pub use error::{CompassError, Result};
pub use geometry::Vec3;
pub use heading::{HeadingTracker, HeadingUpdate};
pub use overflow::{OverflowCandidate, OverflowMove, OverflowResolver};
pub use poi::{Poi, PoiId, PoiKind, PoiKinds, PoiRegistry, PoiSource};
pub use render::{FrameSnapshot, MemoryBand, MemorySurface, StripRenderer, StripStyle};
pub use slots::{BandSurface, ElevationIndicator, IconSurface, SlotId, SlotPool};
