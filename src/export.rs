//! Metrics export
//!
//! Collects every numeric sample of the fields behind the available metrics,
//! keyed by raw field. This is the `activity-metrics.json` artifact and the
//! input of the analysis summary.

use crate::schema::number;
use crate::types::{ManufacturerInfo, RecordGroup};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Raw field to numeric samples, in record order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricsExport {
    fields: BTreeMap<String, Vec<f64>>,
}

impl MetricsExport {
    /// Build the export from processed record groups.
    ///
    /// Only time-series groups contribute, and only JSON numbers are kept.
    /// The speed family also exports its derived `pace` or `speed` field.
    pub fn collect<S: AsRef<str>>(
        groups: &[RecordGroup],
        manufacturer: &ManufacturerInfo,
        available: &[S],
    ) -> Self {
        let mut allowed: BTreeSet<&str> = BTreeSet::new();
        for metric in available {
            let metric = metric.as_ref();
            allowed.extend(
                manufacturer
                    .field_mappings
                    .fields_for(metric)
                    .iter()
                    .map(String::as_str),
            );
            match metric {
                "Pace" => {
                    allowed.insert("pace");
                }
                "Speed" => {
                    allowed.insert("speed");
                }
                _ => {}
            }
        }

        let mut fields: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for record in groups
            .iter()
            .filter(|g| g.is_time_series())
            .flat_map(|g| g.records.iter())
        {
            for (key, value) in record {
                if !allowed.contains(key.as_str()) {
                    continue;
                }
                if let Some(v) = number(value) {
                    fields.entry(key.clone()).or_default().push(v);
                }
            }
        }

        Self { fields }
    }

    pub fn get(&self, field: &str) -> Option<&[f64]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.fields
            .iter()
            .map(|(field, values)| (field.as_str(), values.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FieldMapping, Manufacturer};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn info() -> ManufacturerInfo {
        ManufacturerInfo::new(
            Manufacturer::Garmin,
            FieldMapping::from_table(&[
                ("Heart Rate", &["heart_rate", "hr"]),
                ("Pace", &["enhanced_speed", "speed"]),
                ("Power", &["power"]),
            ]),
        )
    }

    fn records(values: Vec<serde_json::Value>) -> Vec<crate::types::Record> {
        values
            .into_iter()
            .map(|v| v.as_object().cloned().unwrap())
            .collect()
    }

    #[test]
    fn test_collects_available_fields_only() {
        let groups = vec![
            RecordGroup::new(
                "records",
                records(vec![
                    json!({"heart_rate": 120, "power": 250, "speed": 3.0, "pace": 5.5}),
                    json!({"heart_rate": "121", "power": 260, "cadence": 80}),
                    json!({"heart_rate": 122, "power": null}),
                ]),
            ),
            RecordGroup::new("laps", records(vec![json!({"heart_rate": 140})])),
        ];

        let export = MetricsExport::collect(&groups, &info(), &["Heart Rate", "Pace"]);

        assert_eq!(export.get("heart_rate"), Some(&[120.0, 122.0][..]));
        assert_eq!(export.get("speed"), Some(&[3.0][..]));
        assert_eq!(export.get("pace"), Some(&[5.5][..]));
        assert_eq!(export.get("power"), None);
        assert_eq!(export.get("cadence"), None);
        assert_eq!(export.len(), 3);
    }

    #[test]
    fn test_serializes_as_plain_object() {
        let groups = vec![RecordGroup::new(
            "record",
            records(vec![json!({"power": 200}), json!({"power": 210})]),
        )];

        let export = MetricsExport::collect(&groups, &info(), &["Power"]);
        assert_eq!(
            serde_json::to_value(&export).unwrap(),
            json!({"power": [200.0, 210.0]})
        );
    }
}
