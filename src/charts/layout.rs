//! Static chart layout tables
//!
//! Metric families share a y-axis; datasets take colors from a fixed palette
//! in order. Raw fields get display names and metrics get axis unit labels.

use crate::speed::SpeedConverter;
use crate::types::{ActivityType, UnitSystem};

/// A family of metrics sharing one y-axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricGroup {
    pub name: &'static str,
    pub metrics: &'static [&'static str],
    pub y_axis_id: &'static str,
    pub color: &'static str,
}

/// Axis families; the last entry catches every metric not listed elsewhere
pub const METRIC_GROUPS: &[MetricGroup] = &[
    MetricGroup {
        name: "Heart Rate",
        metrics: &["Heart Rate"],
        y_axis_id: "heartRate",
        color: "#ff6b6b",
    },
    MetricGroup {
        name: "Speed/Pace",
        metrics: &["Speed", "Pace"],
        y_axis_id: "speed",
        color: "#4ecdc4",
    },
    MetricGroup {
        name: "Power",
        metrics: &["Power"],
        y_axis_id: "power",
        color: "#45b7d1",
    },
    MetricGroup {
        name: "Cadence",
        metrics: &["Cadence"],
        y_axis_id: "cadence",
        color: "#96ceb4",
    },
    MetricGroup {
        name: "Elevation",
        metrics: &["Altitude", "Elevation"],
        y_axis_id: "elevation",
        color: "#ffeaa7",
    },
    MetricGroup {
        name: "Temperature",
        metrics: &["Temperature"],
        y_axis_id: "temperature",
        color: "#fd79a8",
    },
    MetricGroup {
        name: "Running Dynamics",
        metrics: &["Stride Length", "Ground Contact Time", "Respiration Rate"],
        y_axis_id: "dynamics",
        color: "#dda0dd",
    },
    OTHER,
];

const OTHER: MetricGroup = MetricGroup {
    name: "Other",
    metrics: &[],
    y_axis_id: "other",
    color: "#a29bfe",
};

/// Dataset colors, assigned in order and cycled
pub const PALETTE: [&str; 7] = [
    "#ff6b6b", "#4ecdc4", "#45b7d1", "#96ceb4", "#ffeaa7", "#dda0dd", "#fd79a8",
];

/// Axis family of a metric
pub fn metric_group(metric: &str) -> &'static MetricGroup {
    METRIC_GROUPS
        .iter()
        .find(|group| group.metrics.contains(&metric))
        .unwrap_or(&OTHER)
}

/// Palette color for the n-th dataset of a chart
pub fn palette_color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

/// Emoji standing in for a palette color in plain-text tooltips
pub fn color_indicator(color: &str) -> &'static str {
    match color {
        "#ff6b6b" => "🔴",
        "#4ecdc4" => "🟢",
        "#45b7d1" => "🔵",
        "#96ceb4" => "🟩",
        "#ffeaa7" => "🟡",
        "#dda0dd" => "🟣",
        "#fd79a8" => "🩷",
        _ => "⚫",
    }
}

/// Display name of a raw field. Unlisted fields are title-cased.
pub fn display_name(field: &str, activity: ActivityType) -> String {
    let name = match field {
        "heart_rate" | "hr" => "Heart Rate",
        "speed" | "enhanced_speed" => SpeedConverter::speed_label(activity),
        "cadence" => "Cadence",
        "power" => "Power",
        "distance" => "Distance",
        "altitude" | "enhanced_altitude" => "Elevation",
        "temperature" => "Temperature",
        "calories" => "Calories",
        "grade" => "Grade",
        "position_lat" => "Latitude",
        "position_long" => "Longitude",
        "timestamp" => "Timestamp",
        "left_right_balance" => "Left Right Balance",
        "vertical_oscillation" => "Vertical Oscillation",
        "stance_time" => "Ground Contact Time",
        "stance_time_percent" => "Stance Time Percent",
        "vertical_ratio" => "Vertical Ratio",
        "step_length" => "Stride Length",
        "total_strokes" => "Stroke Rate",
        "stroke_type" => "Stroke Type",
        "respiration_rate" => "Respiration Rate",
        _ => return title_case(field),
    };
    name.to_string()
}

/// Y-axis unit label of a metric; metrics without a unit use their own name
pub fn axis_label(metric: &str, activity: ActivityType, units: UnitSystem) -> String {
    let label = match metric {
        "Heart Rate" => "BPM",
        "Speed" | "Pace" => SpeedConverter::speed_unit(activity, units),
        "Cadence" if activity == ActivityType::Running => "spm",
        "Cadence" => "RPM",
        "Power" => "Watts",
        "Distance" | "Altitude" | "Elevation" => "Meters",
        "Temperature" => "°C",
        "Calories" => "Calories",
        "Grade" => "%",
        "Stride Length" => "cm",
        "Ground Contact Time" => "ms",
        "Respiration Rate" => "breaths/min",
        _ => metric,
    };
    label.to_string()
}

fn title_case(field: &str) -> String {
    field
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
