//! Chart series construction
//!
//! Turns a set of display metrics into a [`ChartSpec`]: one time series per
//! metric that has data, each bound to the y-axis of its metric family.

use super::layout::{axis_label, color_indicator, display_name, metric_group, palette_color};
use crate::schema::{coerce_number, timestamp};
use crate::speed::SpeedConverter;
use crate::types::{ActivityType, FieldMapping, Record, RecordGroup, UnitSystem};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One sample of a series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub x: DateTime<Utc>,
    pub y: f64,
}

/// Side of the plot a y-axis is drawn on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisPosition {
    Left,
    Right,
}

/// A y-axis shared by every dataset of one metric family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisSpec {
    pub id: String,
    pub position: AxisPosition,
    /// Unit label of the first metric placed on the axis
    pub title: String,
}

/// One plotted metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSpec {
    pub label: String,
    pub points: Vec<DataPoint>,
    pub border_color: String,
    /// Border color with a `20` alpha suffix
    pub background_color: String,
    pub y_axis_id: String,
    pub unit: String,
}

/// Everything a renderer needs to draw one chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub title: String,
    pub datasets: Vec<DatasetSpec>,
    pub axes: Vec<AxisSpec>,
    pub show_legend: bool,
}

impl ChartSpec {
    /// Tooltip heading for the instant `x`
    pub fn tooltip_title(x: DateTime<Utc>) -> String {
        x.format("%H:%M:%S").to_string()
    }

    /// Tooltip body for the instant `x`: one line per dataset with a sample there
    pub fn tooltip_lines(&self, x: DateTime<Utc>) -> Vec<String> {
        self.datasets
            .iter()
            .filter_map(|dataset| {
                let point = dataset.points.iter().find(|p| p.x == x)?;
                Some(format!(
                    "{} {}: {:.2} {}",
                    color_indicator(&dataset.border_color),
                    dataset.label,
                    point.y,
                    dataset.unit
                ))
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}

/// Builds chart specs from record groups
#[derive(Debug, Clone, Copy)]
pub struct SeriesBuilder<'a> {
    groups: &'a [RecordGroup],
    mappings: &'a FieldMapping,
    activity: ActivityType,
    units: UnitSystem,
}

impl<'a> SeriesBuilder<'a> {
    pub fn new(
        groups: &'a [RecordGroup],
        mappings: &'a FieldMapping,
        activity: ActivityType,
        units: UnitSystem,
    ) -> Self {
        Self {
            groups,
            mappings,
            activity,
            units,
        }
    }

    /// Build the spec for a chart showing `metrics`.
    ///
    /// Metrics without samples are left out and take neither a color nor an
    /// axis. A new axis goes left when it is the 1st, 3rd, ... axis of the
    /// chart and right otherwise.
    pub fn build<S: AsRef<str>>(&self, metrics: &[S]) -> ChartSpec {
        let mut datasets = Vec::new();
        let mut axes: Vec<AxisSpec> = Vec::new();

        for metric in metrics {
            let metric = metric.as_ref();
            let points = self.series(metric);
            if points.is_empty() {
                continue;
            }

            let y_axis_id = metric_group(metric).y_axis_id;
            let unit = axis_label(metric, self.activity, self.units);
            if !axes.iter().any(|axis| axis.id == y_axis_id) {
                let position = if axes.len() % 2 == 0 {
                    AxisPosition::Left
                } else {
                    AxisPosition::Right
                };
                axes.push(AxisSpec {
                    id: y_axis_id.to_string(),
                    position,
                    title: unit.clone(),
                });
            }

            let color = palette_color(datasets.len());
            datasets.push(DatasetSpec {
                label: metric.to_string(),
                points,
                border_color: color.to_string(),
                background_color: format!("{}20", color),
                y_axis_id: y_axis_id.to_string(),
                unit,
            });
        }

        ChartSpec {
            title: metrics
                .iter()
                .map(AsRef::as_ref)
                .collect::<Vec<_>>()
                .join(", "),
            datasets,
            axes,
            show_legend: metrics.len() > 1,
        }
    }

    /// Time series of one metric, taken from the first group holding any of
    /// its fields. Time-series groups are searched before summary groups.
    pub fn series(&self, metric: &str) -> Vec<DataPoint> {
        let fields = self.candidate_fields(metric);
        if fields.is_empty() {
            return Vec::new();
        }

        let holds_metric = |group: &&RecordGroup| {
            group.records.iter().any(|record| {
                fields
                    .iter()
                    .any(|f| record.get(f.as_str()).is_some_and(|v| !v.is_null()))
            })
        };
        let source = self
            .groups
            .iter()
            .filter(|g| g.is_time_series())
            .find(holds_metric)
            .or_else(|| {
                self.groups
                    .iter()
                    .filter(|g| !g.is_time_series())
                    .find(holds_metric)
            });

        let Some(group) = source else {
            return Vec::new();
        };

        group
            .records
            .iter()
            .filter_map(|record| {
                let x = record.get("timestamp").and_then(timestamp)?;
                let y = self.sample(record, &fields)?;
                Some(DataPoint { x, y })
            })
            .collect()
    }

    /// Raw fields to read for a metric: its mapped candidates, else every
    /// field present in the data whose display name is the metric.
    fn candidate_fields(&self, metric: &str) -> Vec<String> {
        let mapped = self.mappings.fields_for(metric);
        if !mapped.is_empty() {
            return mapped.to_vec();
        }

        let mut fields: Vec<String> = Vec::new();
        for key in self
            .groups
            .iter()
            .flat_map(|g| g.records.iter())
            .flat_map(|record| record.keys())
        {
            if !fields.contains(key) && display_name(key, self.activity) == metric {
                fields.push(key.clone());
            }
        }
        fields
    }

    /// First candidate field of the record holding a number
    fn sample(&self, record: &Record, fields: &[String]) -> Option<f64> {
        fields.iter().find_map(|field| {
            let value = record.get(field.as_str()).and_then(coerce_number)?;
            if SpeedConverter::is_speed_field(field) {
                Some(SpeedConverter::convert_speed(value, self.activity, self.units))
            } else {
                Some(value)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    fn ride() -> Vec<RecordGroup> {
        vec![
            RecordGroup::new(
                "sessions",
                vec![record(json!({"timestamp": "2024-05-01T08:00:00Z", "power": 999}))],
            ),
            RecordGroup::new(
                "records",
                vec![
                    record(json!({"timestamp": "2024-05-01T08:00:00Z", "power": 200, "heart_rate": 120, "speed": 10.0})),
                    record(json!({"timestamp": "2024-05-01T08:00:01Z", "power": 210, "enhanced_speed": 5.0, "speed": 4.0})),
                    record(json!({"power": 220})),
                    record(json!({"timestamp": "2024-05-01T08:00:03Z", "power": null, "heart_rate": 125})),
                ],
            ),
        ]
    }

    fn mappings() -> FieldMapping {
        FieldMapping::from_table(&[
            ("Power", &["power"]),
            ("Heart Rate", &["heart_rate", "hr"]),
            ("Speed", &["enhanced_speed", "speed"]),
            ("Cadence", &["cadence"]),
        ])
    }

    #[test]
    fn test_series_prefers_time_series_group() {
        let groups = ride();
        let mappings = mappings();
        let builder =
            SeriesBuilder::new(&groups, &mappings, ActivityType::Cycling, UnitSystem::Metric);

        let power = builder.series("Power");
        assert_eq!(power.iter().map(|p| p.y).collect::<Vec<_>>(), vec![200.0, 210.0]);
    }

    #[test]
    fn test_speed_converted_with_enhanced_first() {
        let groups = ride();
        let mappings = mappings();
        let builder =
            SeriesBuilder::new(&groups, &mappings, ActivityType::Cycling, UnitSystem::Metric);

        let speed = builder.series("Speed");
        assert_eq!(speed.len(), 2);
        assert!((speed[0].y - 36.0).abs() < 1e-9);
        assert!((speed[1].y - 18.0).abs() < 1e-9);
    }

    #[test]
    fn test_unmapped_metric_uses_display_names() {
        let groups = vec![RecordGroup::new(
            "records",
            vec![record(json!({"timestamp": 1714550400000_i64, "step_length": 1200}))],
        )];
        let mappings = FieldMapping::new();
        let builder =
            SeriesBuilder::new(&groups, &mappings, ActivityType::Running, UnitSystem::Metric);

        assert_eq!(builder.series("Stride Length").len(), 1);
    }

    #[test]
    fn test_build_skips_empty_series_and_alternates_axes() {
        let groups = ride();
        let mappings = mappings();
        let builder =
            SeriesBuilder::new(&groups, &mappings, ActivityType::Cycling, UnitSystem::Metric);

        let spec = builder.build(&["Cadence", "Power", "Heart Rate", "Speed"]);

        assert_eq!(spec.title, "Cadence, Power, Heart Rate, Speed");
        assert!(spec.show_legend);
        assert_eq!(
            spec.datasets.iter().map(|d| d.label.as_str()).collect::<Vec<_>>(),
            vec!["Power", "Heart Rate", "Speed"]
        );
        assert_eq!(spec.datasets[0].border_color, "#ff6b6b");
        assert_eq!(spec.datasets[0].background_color, "#ff6b6b20");
        assert_eq!(spec.datasets[1].border_color, "#4ecdc4");
        assert_eq!(
            spec.axes
                .iter()
                .map(|a| (a.id.as_str(), a.position))
                .collect::<Vec<_>>(),
            vec![
                ("power", AxisPosition::Left),
                ("heartRate", AxisPosition::Right),
                ("speed", AxisPosition::Left),
            ]
        );
        assert_eq!(spec.axes[2].title, "km/h");
    }

    #[test]
    fn test_single_metric_hides_legend() {
        let groups = ride();
        let mappings = mappings();
        let builder =
            SeriesBuilder::new(&groups, &mappings, ActivityType::Cycling, UnitSystem::Metric);

        let spec = builder.build(&["Power"]);
        assert!(!spec.show_legend);
        assert_eq!(spec.axes[0].title, "Watts");
    }

    #[test]
    fn test_tooltip_lines() {
        let groups = ride();
        let mappings = mappings();
        let builder =
            SeriesBuilder::new(&groups, &mappings, ActivityType::Cycling, UnitSystem::Metric);
        let spec = builder.build(&["Power", "Heart Rate"]);

        let x = "2024-05-01T08:00:01Z".parse::<DateTime<Utc>>().unwrap();
        assert_eq!(ChartSpec::tooltip_title(x), "08:00:01");
        assert_eq!(spec.tooltip_lines(x), vec!["🔴 Power: 210.00 Watts".to_string()]);

        let x = "2024-05-01T08:00:00Z".parse::<DateTime<Utc>>().unwrap();
        assert_eq!(
            spec.tooltip_lines(x),
            vec![
                "🔴 Power: 200.00 Watts".to_string(),
                "🟢 Heart Rate: 120.00 BPM".to_string(),
            ]
        );
    }
}
