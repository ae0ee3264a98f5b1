//! Garmin field mappings
//!
//! Garmin watches and head units record different metric families per sport,
//! so the table is chosen by activity: running dynamics for running and
//! walking, pedal dynamics for cycling, strokes for swimming.

use crate::speed::SpeedConverter;
use crate::types::{ActivityType, FieldMapping, Manufacturer};

use super::{DeviceIdentity, FieldMappingProvider, GenericMappings};

/// Garmin mapping tables
pub struct GarminMappings;

impl FieldMappingProvider for GarminMappings {
    fn manufacturer(&self) -> Manufacturer {
        Manufacturer::Garmin
    }

    fn matches(&self, device: &DeviceIdentity) -> bool {
        device.manufacturer.contains("garmin") || device.product.to_lowercase().contains("garmin")
    }

    fn field_mappings(&self, activity: ActivityType) -> FieldMapping {
        let table: &[(&str, &[&str])] = match activity {
            ActivityType::Running | ActivityType::Walking => RUNNING,
            ActivityType::Cycling => CYCLING,
            ActivityType::Swimming => SWIMMING,
            ActivityType::Unknown => return GenericMappings.field_mappings(activity),
        };

        let mut mapping = FieldMapping::from_table(table);
        mapping.insert(
            SpeedConverter::speed_label(activity),
            &["enhanced_speed", "speed"],
        );
        mapping
    }
}

const RUNNING: &[(&str, &[&str])] = &[
    ("Power", &["power"]),
    ("Heart Rate", &["heart_rate", "hr"]),
    ("Cadence", &["cadence"]),
    ("Stride Length", &["step_length"]),
    ("Respiration Rate", &["respiration_rate", "enhanced_respiration_rate"]),
    ("Temperature", &["temperature"]),
    ("Ground Contact Time", &["stance_time"]),
    ("Vertical Oscillation", &["vertical_oscillation"]),
    ("Vertical Ratio", &["vertical_ratio"]),
    ("Elevation", &["enhanced_altitude", "altitude"]),
];

const CYCLING: &[(&str, &[&str])] = &[
    ("Power", &["power"]),
    ("Heart Rate", &["heart_rate", "hr"]),
    ("Cadence", &["cadence"]),
    ("Distance", &["distance"]),
    ("Elevation", &["enhanced_altitude", "altitude"]),
    ("Grade", &["grade"]),
    ("Temperature", &["temperature"]),
    ("Respiration Rate", &["respiration_rate", "enhanced_respiration_rate"]),
    ("Left Right Balance", &["left_right_balance"]),
    (
        "Torque Effectiveness",
        &["left_torque_effectiveness", "right_torque_effectiveness"],
    ),
    (
        "Pedal Smoothness",
        &["left_pedal_smoothness", "right_pedal_smoothness"],
    ),
];

const SWIMMING: &[(&str, &[&str])] = &[
    ("Heart Rate", &["heart_rate", "hr"]),
    ("Cadence", &["cadence"]),
    ("Distance", &["distance"]),
    ("Stroke Rate", &["total_strokes"]),
    ("Stroke Type", &["stroke_type"]),
    ("Temperature", &["temperature"]),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_table_uses_pace() {
        let mapping = GarminMappings.field_mappings(ActivityType::Running);

        assert_eq!(mapping.fields_for("Pace"), ["enhanced_speed", "speed"]);
        assert!(!mapping.contains("Speed"));
        assert!(mapping.contains("Stride Length"));
        assert!(!mapping.contains("Pedal Smoothness"));
    }

    #[test]
    fn test_cycling_table_emphasizes_power() {
        let mapping = GarminMappings.field_mappings(ActivityType::Cycling);

        assert!(mapping.contains("Speed"));
        assert!(mapping.contains("Torque Effectiveness"));
        assert!(!mapping.contains("Ground Contact Time"));
    }

    #[test]
    fn test_matches_product_name() {
        let device = DeviceIdentity {
            manufacturer: "development".to_string(),
            product: "Garmin Edge 1040".to_string(),
        };
        assert!(GarminMappings.matches(&device));
    }
}
