pub mod kind;
pub mod registry;

pub use kind::{PoiKind, PoiKinds};
pub use registry::{Poi, PoiId, PoiRegistry, PoiSource};
