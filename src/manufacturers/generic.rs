//! Manufacturer-agnostic field mappings covering the full raw-field vocabulary

use crate::speed::SpeedConverter;
use crate::types::{ActivityType, FieldMapping, Manufacturer};

use super::{DeviceIdentity, FieldMappingProvider};

/// Fallback mapping table for unrecognized devices
pub struct GenericMappings;

impl FieldMappingProvider for GenericMappings {
    fn manufacturer(&self) -> Manufacturer {
        Manufacturer::Unknown { product: None }
    }

    fn matches(&self, _device: &DeviceIdentity) -> bool {
        true
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
    ("Timestamp", &["timestamp"]),
    ("Vertical Oscillation", &["vertical_oscillation"]),
    ("Stance Time", &["stance_time"]),
    ("Stance Time Percent", &["stance_time_percent"]),
    ("Vertical Ratio", &["vertical_ratio"]),
    ("Step Length", &["step_length"]),
    ("Stroke Rate", &["total_strokes"]),
    ("Stroke Type", &["stroke_type"]),
    (
        "Training Effect",
        &["total_training_effect", "anaerobic_training_effect"],
    ),
    ("Recovery Time", &["recovery_time"]),
    ("Training Stress Score", &["training_stress_score"]),
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
