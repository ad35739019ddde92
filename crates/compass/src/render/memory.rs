use serde::Serialize;

use crate::{
    catalog::{IconArt, Tint},
    config::PoolSettings,
    slots::{BandSurface, ElevationIndicator, IconSurface},
};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SecondaryState {
    pub active: bool,
    pub image: Option<String>,
    pub tint: Option<Tint>,
}

/// Icon surface that just records what it was told
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemorySurface {
    pub active: bool,
    pub x: f32,
    pub y: f32,
    pub text: String,
    pub elevation: ElevationIndicator,
    pub main_image: Option<String>,
    pub main_tint: Option<Tint>,
    pub secondaries: Vec<SecondaryState>,
    pub half_width: Option<f32>,
    /// Number of `set_position` calls received
    pub position_writes: usize,
}

impl MemorySurface {
    pub fn new(secondary_count: usize, half_width: Option<f32>) -> Self {
        Self {
            active: false,
            x: 0.0,
            y: 0.0,
            text: String::new(),
            elevation: ElevationIndicator::Hidden,
            main_image: None,
            main_tint: None,
            secondaries: vec![SecondaryState::default(); secondary_count],
            half_width,
            position_writes: 0,
        }
    }

    /// Surface sized from pool settings
    pub fn from_settings(settings: &PoolSettings) -> Self {
        Self::new(settings.secondary_per_slot, Some(settings.icon_half_width))
    }
}

impl IconSurface for MemorySurface {
    fn set_position(&mut self, x: f32) {
        self.x = x;
        self.position_writes += 1;
    }

    fn set_vertical_offset(&mut self, y: f32) {
        self.y = y;
    }

    fn vertical_offset(&self) -> f32 {
        self.y
    }

    fn half_width(&self) -> Option<f32> {
        self.half_width
    }

    fn set_text(&mut self, text: &str) {
        if self.text != text {
            self.text.clear();
            self.text.push_str(text);
        }
    }

    fn set_elevation(&mut self, indicator: ElevationIndicator) {
        self.elevation = indicator;
    }

    fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    fn set_main_art(&mut self, art: Option<&IconArt>) {
        self.main_image = art.map(|a| a.image.clone());
        self.main_tint = art.map(|a| a.tint);
    }

    fn secondary_count(&self) -> usize {
        self.secondaries.len()
    }

    fn set_secondary_active(&mut self, index: usize, active: bool) {
        if let Some(s) = self.secondaries.get_mut(index) {
            s.active = active;
        }
    }

    fn set_secondary_art(&mut self, index: usize, art: Option<&IconArt>) {
        if let Some(s) = self.secondaries.get_mut(index) {
            s.image = art.map(|a| a.image.clone());
            s.tint = art.map(|a| a.tint);
        }
    }
}

/// Band surface recording the last offset
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MemoryBand {
    pub offset: Option<f32>,
    pub writes: usize,
}

impl MemoryBand {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BandSurface for MemoryBand {
    fn set_offset(&mut self, offset: f32) {
        self.offset = Some(offset);
        self.writes += 1;
    }
}
