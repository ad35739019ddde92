pub mod pool;
pub mod surface;

pub use pool::{SlotId, SlotPool, SlotView};
pub use surface::{BandSurface, ElevationIndicator, IconSurface};
