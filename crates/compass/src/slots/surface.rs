//! Interface implemented by the presentation layer.
//!
//! The compass only calls these; drawing, fading and sprite handling stay on
//! the other side.

use serde::{Deserialize, Serialize};

use crate::catalog::IconArt;

/// Elevation arrow state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ElevationIndicator {
    #[default]
    Hidden,
    Up,
    Down,
}

impl ElevationIndicator {
    /// Indicator for a vertical delta; shown only beyond `threshold`
    pub fn from_delta(delta: f32, threshold: f32) -> Self {
        if delta.abs() <= threshold || !delta.is_finite() {
            ElevationIndicator::Hidden
        } else if delta > 0.0 {
            ElevationIndicator::Up
        } else {
            ElevationIndicator::Down
        }
    }
}

/// One renderable icon slot
pub trait IconSurface {
    fn set_position(&mut self, x: f32);

    fn set_vertical_offset(&mut self, y: f32);

    fn vertical_offset(&self) -> f32;

    /// Rendered half-width in pixels. `None` when the geometry is gone or degenerate.
    fn half_width(&self) -> Option<f32>;

    fn set_text(&mut self, text: &str);

    fn set_elevation(&mut self, indicator: ElevationIndicator);

    fn set_active(&mut self, active: bool);

    fn set_main_art(&mut self, art: Option<&IconArt>);

    fn secondary_count(&self) -> usize;

    fn set_secondary_active(&mut self, index: usize, active: bool);

    fn set_secondary_art(&mut self, index: usize, art: Option<&IconArt>);
}

/// The scrolling compass band
pub trait BandSurface {
    /// Band texture offset in turns, [0, 1)
    fn set_offset(&mut self, offset: f32);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indicator_from_delta() {
        assert_eq!(ElevationIndicator::from_delta(5.0, 2.0), ElevationIndicator::Up);
        assert_eq!(ElevationIndicator::from_delta(-5.0, 2.0), ElevationIndicator::Down);
        assert_eq!(ElevationIndicator::from_delta(2.0, 2.0), ElevationIndicator::Hidden);
        assert_eq!(ElevationIndicator::from_delta(-1.0, 2.0), ElevationIndicator::Hidden);
        assert_eq!(ElevationIndicator::from_delta(f32::NAN, 2.0), ElevationIndicator::Hidden);
    }
}
