//! Core types for the fitscope pipeline
//!
//! This module defines the data structures that flow through each stage of the
//! pipeline: activity classification, device identity, field mappings, record
//! groups and aggregate statistics.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One sampled instant: raw field key to value
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Activity classification for a loaded file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    Running,
    Cycling,
    Swimming,
    Walking,
    #[default]
    Unknown,
}

impl ActivityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::Running => "running",
            ActivityType::Cycling => "cycling",
            ActivityType::Swimming => "swimming",
            ActivityType::Walking => "walking",
            ActivityType::Unknown => "unknown",
        }
    }

    /// Human readable label used in activity summaries
    pub fn display_name(&self) -> &'static str {
        match self {
            ActivityType::Running => "Running",
            ActivityType::Cycling => "Cycling",
            ActivityType::Swimming => "Swimming",
            ActivityType::Walking => "Walking",
            ActivityType::Unknown => "Unknown Activity",
        }
    }

    /// Whether speed is presented as pace (time per distance) for this activity
    pub fn uses_pace(&self) -> bool {
        matches!(self, ActivityType::Running | ActivityType::Walking)
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unit system for speed and pace values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

/// Recording device vendor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Manufacturer {
    Garmin,
    Wahoo,
    /// Unrecognized vendor, with the raw product string when one was found
    Unknown { product: Option<String> },
}

impl Manufacturer {
    pub fn display_name(&self) -> String {
        match self {
            Manufacturer::Garmin => "Garmin".to_string(),
            Manufacturer::Wahoo => "Wahoo".to_string(),
            Manufacturer::Unknown { product: Some(product) } => format!("Unknown ({})", product),
            Manufacturer::Unknown { product: None } => "Unknown".to_string(),
        }
    }
}

/// Display metric name to ordered candidate raw field keys.
///
/// The candidate order expresses preference: when a record carries several of
/// the fields, the first one with a value is used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMapping {
    entries: BTreeMap<String, Vec<String>>,
}

impl FieldMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a mapping from a static table
    pub fn from_table(table: &[(&str, &[&str])]) -> Self {
        let mut mapping = Self::new();
        for (metric, fields) in table {
            mapping.insert(*metric, fields);
        }
        mapping
    }

    /// Insert or replace the candidate fields of a metric
    pub fn insert(&mut self, metric: impl Into<String>, fields: &[&str]) {
        self.entries.insert(
            metric.into(),
            fields.iter().map(|f| (*f).to_string()).collect(),
        );
    }

    /// Candidate raw fields for a metric, empty when the metric is not mapped
    pub fn fields_for(&self, metric: &str) -> &[String] {
        self.entries.get(metric).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, metric: &str) -> bool {
        self.entries.contains_key(metric)
    }

    pub fn metrics(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(metric, fields)| (metric.as_str(), fields.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Device identity plus the field mapping table selected for it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManufacturerInfo {
    pub manufacturer: Manufacturer,
    /// Display name, e.g. "Garmin" or "Unknown (Edge 530)"
    pub name: String,
    pub field_mappings: FieldMapping,
}

impl ManufacturerInfo {
    pub fn new(manufacturer: Manufacturer, field_mappings: FieldMapping) -> Self {
        Self {
            name: manufacturer.display_name(),
            manufacturer,
            field_mappings,
        }
    }
}

/// A named group of records from the parser output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordGroup {
    /// Raw group key as produced by the parser (e.g. "records", "laps")
    #[serde(rename = "type")]
    pub group_type: String,
    pub name: String,
    pub records: Vec<Record>,
    pub description: String,
}

impl RecordGroup {
    pub fn new(group_type: impl Into<String>, records: Vec<Record>) -> Self {
        let group_type = group_type.into();
        Self {
            name: crate::schema::format_group_name(&group_type),
            description: crate::schema::describe_group(&group_type),
            group_type,
            records,
        }
    }

    /// Time-series groups hold per-instant samples; all others are summaries
    pub fn is_time_series(&self) -> bool {
        matches!(self.group_type.as_str(), "record" | "records")
    }
}

/// Aggregate statistics for one display metric
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricStats {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    /// Lower median: value at index `count / 2` of the sorted samples
    pub median: f64,
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manufacturer_display_names() {
        assert_eq!(Manufacturer::Garmin.display_name(), "Garmin");
        assert_eq!(
            Manufacturer::Unknown {
                product: Some("Edge 530".to_string())
            }
            .display_name(),
            "Unknown (Edge 530)"
        );
        assert_eq!(Manufacturer::Unknown { product: None }.display_name(), "Unknown");
    }

    #[test]
    fn test_field_mapping_lookup() {
        let mapping = FieldMapping::from_table(&[
            ("Heart Rate", &["heart_rate", "hr"]),
            ("Power", &["power"]),
        ]);

        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping.fields_for("Heart Rate"), ["heart_rate", "hr"]);
        assert!(mapping.fields_for("Cadence").is_empty());
        assert_eq!(mapping.metrics().collect::<Vec<_>>(), ["Heart Rate", "Power"]);
    }

    #[test]
    fn test_activity_serializes_lowercase() {
        let json = serde_json::to_string(&ActivityType::Cycling).unwrap();
        assert_eq!(json, "\"cycling\"");
        assert!(ActivityType::Walking.uses_pace());
        assert!(!ActivityType::Swimming.uses_pace());
    }
}
