//! Activity-aware speed and pace conversion
//!
//! Raw FIT speeds are metres per second. Running and walking present them as
//! pace (minutes per kilometre or mile); every other activity keeps speed
//! (km/h or mph).

use crate::types::{ActivityType, UnitSystem};

/// m/s to km/h
pub const MPS_TO_KMH: f64 = 3.6;
/// m/s to mph
pub const MPS_TO_MPH: f64 = 2.237;

/// Converter between raw speed and display speed or pace
pub struct SpeedConverter;

impl SpeedConverter {
    /// Convert a raw speed to the display value for `activity`.
    ///
    /// Zero, negative and non-finite speeds yield 0, the "no motion" value.
    pub fn convert_speed(speed_mps: f64, activity: ActivityType, units: UnitSystem) -> f64 {
        if !speed_mps.is_finite() || speed_mps <= 0.0 {
            return 0.0;
        }

        let per_hour = match units {
            UnitSystem::Metric => speed_mps * MPS_TO_KMH,
            UnitSystem::Imperial => speed_mps * MPS_TO_MPH,
        };

        if activity.uses_pace() {
            60.0 / per_hour
        } else {
            per_hour
        }
    }

    /// Unit string for the converted value
    pub fn speed_unit(activity: ActivityType, units: UnitSystem) -> &'static str {
        match (activity.uses_pace(), units) {
            (true, UnitSystem::Metric) => "min/km",
            (true, UnitSystem::Imperial) => "min/mi",
            (false, UnitSystem::Metric) => "km/h",
            (false, UnitSystem::Imperial) => "mph",
        }
    }

    /// Display metric name of the speed family: "Pace" or "Speed"
    pub fn speed_label(activity: ActivityType) -> &'static str {
        if activity.uses_pace() {
            "Pace"
        } else {
            "Speed"
        }
    }

    /// Record key holding the derived value: "pace" or "speed"
    pub fn derived_field(activity: ActivityType) -> &'static str {
        if activity.uses_pace() {
            "pace"
        } else {
            "speed"
        }
    }

    /// Whether a raw field carries speed in m/s
    pub fn is_speed_field(field: &str) -> bool {
        matches!(field, "speed" | "enhanced_speed")
    }
}
