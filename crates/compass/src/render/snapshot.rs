use serde::Serialize;
use std::{fs, path::Path};

use crate::{
    error::Result,
    poi::{PoiId, PoiKind},
    slots::{SlotId, SlotView},
};

/// Serializable state of one slot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotSnapshot {
    pub id: SlotId,
    pub poi: Option<PoiId>,
    pub active: bool,
    pub x: Option<f32>,
    pub y: f32,
    /// y before overflow displacement, while displaced
    pub original_y: Option<f32>,
    pub secondary: Vec<Option<PoiKind>>,
}

impl SlotSnapshot {
    pub fn from_view(view: SlotView, original_y: Option<f32>) -> Self {
        Self {
            id: view.id,
            poi: view.poi,
            active: view.active,
            x: view.x,
            y: view.y,
            original_y,
            secondary: view.secondary,
        }
    }

    pub fn is_displaced(&self) -> bool {
        self.original_y.is_some()
    }
}

/// Compass state at the end of a frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameSnapshot {
    pub frame: u64,
    /// Heading in turns
    pub heading: f32,
    /// Last band offset written, if any
    pub band_offset: Option<f32>,
    pub bound: usize,
    pub slots: Vec<SlotSnapshot>,
}

impl FrameSnapshot {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
