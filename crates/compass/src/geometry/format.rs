use crate::constants::DISTANCE_UNIT;

/// Fixed-point distance label, e.g. `format_distance(12.345, 1) == "12.3m"`
pub fn format_distance(meters: f32, decimal_places: usize) -> String {
    format!("{:.*}{}", decimal_places, meters, DISTANCE_UNIT)
}
