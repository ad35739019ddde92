//! Presentation-side implementations of the slot and band surfaces.

mod memory;
mod snapshot;
mod strip;

pub use memory::{MemoryBand, MemorySurface, SecondaryState};
pub use snapshot::{FrameSnapshot, SlotSnapshot};
pub use strip::{Colors, StripRenderer, StripStyle, render_strip};
