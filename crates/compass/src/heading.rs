//! Viewer heading and the change-gated band offset.

use crate::constants::UV_UPDATE_THRESHOLD;
use crate::geometry::{Vec3, project_to_horizontal, signed_angle_about_up, wrap01};

/// Result of one heading update
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadingUpdate {
    /// Heading in turns, as used for icon placement
    pub heading: f32,
    /// Band offset in turns, [0, 1)
    pub offset: f32,
    /// Whether `offset` should be written to the band
    pub emitted: bool,
}

#[derive(Debug, Clone, Default)]
pub struct HeadingTracker {
    heading: f32,
    last_offset: f32,
    has_emitted: bool,
}

impl HeadingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current heading in turns. Updated every call, emitted or not.
    pub fn heading(&self) -> f32 {
        self.heading
    }

    /// Last offset that was emitted, if any
    pub fn last_offset(&self) -> Option<f32> {
        self.has_emitted.then_some(self.last_offset)
    }

    pub fn update(
        &mut self,
        reference_forward: Vec3,
        north: Vec3,
        north_texture_offset: f32,
        always_point_north: bool,
    ) -> HeadingUpdate {
        let forward = project_to_horizontal(reference_forward);
        let north = project_to_horizontal(north);

        let mut angle = signed_angle_about_up(north, forward);
        if always_point_north {
            angle = -angle;
        }

        self.heading = angle / 360.0;
        let offset = wrap01(self.heading + north_texture_offset);

        let emitted =
            !self.has_emitted || (offset - self.last_offset).abs() >= UV_UPDATE_THRESHOLD;
        if emitted {
            self.last_offset = offset;
            self.has_emitted = true;
        }

        HeadingUpdate {
            heading: self.heading,
            offset,
            emitted,
        }
    }
}
