pub mod format;
pub mod projection;
pub mod types;

pub use format::format_distance;
pub use projection::{
    bearing_from_north, project_to_horizontal, signed_angle_about_up, strip_offset_px, wrap_half,
    wrap01,
};
pub use types::Vec3;
