//! Record normalization, metric availability and statistics
//!
//! This module turns raw record groups into display-ready data:
//! - Activity-aware speed/pace derived on every moving record
//! - Availability filtering of display metrics by data volume
//! - Min/max/avg/median/count aggregates for selected metrics

use crate::config::{AnalyzerConfig, AvailabilityThresholds};
use crate::schema::{coerce_number, number};
use crate::speed::SpeedConverter;
use crate::types::{ActivityType, ManufacturerInfo, MetricStats, Record, RecordGroup, UnitSystem};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Processor for normalized record data
#[derive(Debug, Clone, Default)]
pub struct DataProcessor {
    units: UnitSystem,
    thresholds: AvailabilityThresholds,
}

impl DataProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &AnalyzerConfig) -> Self {
        Self {
            units: config.units,
            thresholds: config.thresholds,
        }
    }

    /// Derive the activity-aware speed field on every record.
    ///
    /// Records whose speed (`enhanced_speed` when non-zero, else `speed`) is
    /// positive gain a `pace` or `speed` key holding the converted value. Raw
    /// fields are kept; the input is not modified.
    pub fn process_records(
        &self,
        groups: &[RecordGroup],
        _manufacturer: &ManufacturerInfo,
        activity: ActivityType,
    ) -> Vec<RecordGroup> {
        let derived_key = SpeedConverter::derived_field(activity);

        groups
            .iter()
            .map(|group| RecordGroup {
                group_type: group.group_type.clone(),
                name: group.name.clone(),
                description: group.description.clone(),
                records: group
                    .records
                    .iter()
                    .map(|record| {
                        let mut processed = record.clone();
                        if let Some(speed) = raw_speed(record).filter(|s| *s > 0.0) {
                            let converted =
                                SpeedConverter::convert_speed(speed, activity, self.units);
                            processed.insert(derived_key.to_string(), Value::from(converted));
                        }
                        processed
                    })
                    .collect(),
            })
            .collect()
    }

    /// Display metrics with substantial data in the time-series groups,
    /// deduplicated and sorted.
    pub fn extract_available_metrics(
        &self,
        groups: &[RecordGroup],
        manufacturer: &ManufacturerInfo,
        _activity: ActivityType,
    ) -> Vec<String> {
        let series: Vec<&RecordGroup> = groups.iter().filter(|g| g.is_time_series()).collect();
        let total: usize = series.iter().map(|g| g.records.len()).sum();
        if total == 0 {
            return Vec::new();
        }

        let min_nonzero = self.thresholds.min_nonzero(total);
        let min_nonnull = self.thresholds.min_nonnull(total);

        let mut available = BTreeSet::new();
        for (metric, fields) in manufacturer.field_mappings.iter() {
            let substantial = fields.iter().any(|field| {
                let counts = count_field(&series, field);
                debug!(
                    metric,
                    field = %field,
                    non_zero = counts.non_zero,
                    non_null = counts.non_null,
                    min_nonzero,
                    min_nonnull,
                    "metric availability"
                );
                counts.non_zero >= min_nonzero || counts.non_null >= min_nonnull
            });
            if substantial {
                available.insert(metric.to_string());
            }
        }

        available.into_iter().collect()
    }

    /// Aggregates for each selected metric over every candidate field in every
    /// group. Metrics without numeric samples are omitted.
    pub fn calculate_statistics<S: AsRef<str>>(
        &self,
        groups: &[RecordGroup],
        selected: &[S],
        manufacturer: &ManufacturerInfo,
    ) -> BTreeMap<String, MetricStats> {
        let mut stats = BTreeMap::new();

        for metric in selected {
            let metric = metric.as_ref();
            let fields = manufacturer.field_mappings.fields_for(metric);
            let values: Vec<f64> = groups
                .iter()
                .flat_map(|g| g.records.iter())
                .flat_map(|record| fields.iter().filter_map(|f| record.get(f).and_then(coerce_number)))
                .collect();

            if let Some(summary) = summarize(&values) {
                stats.insert(metric.to_string(), summary);
            }
        }

        stats
    }
}

/// Raw speed of a record, preferring a non-zero `enhanced_speed`
fn raw_speed(record: &Record) -> Option<f64> {
    let enhanced = record
        .get("enhanced_speed")
        .and_then(coerce_number)
        .filter(|s| *s != 0.0);
    enhanced.or_else(|| record.get("speed").and_then(coerce_number))
}

#[derive(Debug, Default, Clone, Copy)]
struct FieldCounts {
    non_null: usize,
    non_zero: usize,
}

fn count_field(groups: &[&RecordGroup], field: &str) -> FieldCounts {
    let mut counts = FieldCounts::default();
    for value in groups
        .iter()
        .flat_map(|g| g.records.iter())
        .filter_map(|record| record.get(field))
    {
        if value.is_null() {
            continue;
        }
        counts.non_null += 1;
        if number(value).is_some_and(|n| n != 0.0) {
            counts.non_zero += 1;
        }
    }
    counts
}

/// Min/max/avg/lower-median/count of a sample set
pub fn summarize(values: &[f64]) -> Option<MetricStats> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let sum: f64 = values.iter().sum();
    Some(MetricStats {
        min: sorted[0],
        max: sorted[sorted.len() - 1],
        avg: sum / values.len() as f64,
        median: sorted[sorted.len() / 2],
        count: values.len(),
    })
}
