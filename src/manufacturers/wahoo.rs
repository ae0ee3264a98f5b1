//! Wahoo field mappings
//!
//! ELEMNT head units and KICKR trainers are cycling devices; one table serves
//! every activity.

use crate::speed::SpeedConverter;
use crate::types::{ActivityType, FieldMapping, Manufacturer};

use super::{DeviceIdentity, FieldMappingProvider};

/// Wahoo mapping table
pub struct WahooMappings;

impl FieldMappingProvider for WahooMappings {
    fn manufacturer(&self) -> Manufacturer {
        Manufacturer::Wahoo
    }

    fn matches(&self, device: &DeviceIdentity) -> bool {
        let product = device.product.to_lowercase();
        device.manufacturer.contains("wahoo")
            || product.contains("elemnt")
            || product.contains("kickr")
    }

    fn field_mappings(&self, activity: ActivityType) -> FieldMapping {
        let mut mapping = FieldMapping::from_table(TABLE);
        mapping.insert(
            SpeedConverter::speed_label(activity),
            &["enhanced_speed", "speed"],
        );
        mapping
    }
}

const TABLE: &[(&str, &[&str])] = &[
    ("Heart Rate", &["heart_rate", "hr"]),
    ("Cadence", &["cadence"]),
    ("Power", &["power"]),
    ("Distance", &["distance"]),
    ("Altitude", &["enhanced_altitude", "altitude"]),
    ("Temperature", &["temperature"]),
    ("Calories", &["calories"]),
    ("Grade", &["grade"]),
    ("Position", &["position_lat", "position_long"]),
    ("Left Right Balance", &["left_right_balance"]),
    ("Power Balance", &["left_power_phase", "right_power_phase"]),
    (
        "Torque Effectiveness",
        &["left_torque_effectiveness", "right_torque_effectiveness"],
    ),
    (
        "Pedal Smoothness",
        &["left_pedal_smoothness", "right_pedal_smoothness"],
    ),
    (
        "Platform Center Offset",
        &["left_platform_center_offset", "right_platform_center_offset"],
    ),
    (
        "Power Phase",
        &[
            "left_power_phase_start_angle",
            "left_power_phase_end_angle",
            "right_power_phase_start_angle",
            "right_power_phase_end_angle",
        ],
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_wahoo_tokens() {
        let matches = |manufacturer: &str, product: &str| {
            WahooMappings.matches(&DeviceIdentity {
                manufacturer: manufacturer.to_string(),
                product: product.to_string(),
            })
        };

        assert!(matches("wahoo_fitness", ""));
        assert!(matches("", "KICKR CORE"));
        assert!(!matches("garmin", "Edge 530"));
    }

    #[test]
    fn test_speed_label_follows_activity() {
        assert!(WahooMappings.field_mappings(ActivityType::Cycling).contains("Speed"));
        assert!(WahooMappings.field_mappings(ActivityType::Running).contains("Pace"));
    }
}
