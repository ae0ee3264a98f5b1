//! Parsed activity file wrapper

use crate::error::AnalyzerError;
use crate::types::{Record, RecordGroup};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Output of the external FIT parser: group key to records
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParsedFile {
    groups: Map<String, Value>,
}

impl ParsedFile {
    /// Parse the parser's JSON output
    pub fn from_json(raw_json: &str) -> Result<Self, AnalyzerError> {
        let value: Value = serde_json::from_str(raw_json)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, AnalyzerError> {
        match value {
            Value::Object(groups) => Ok(Self { groups }),
            other => Err(AnalyzerError::ParseError(format!(
                "expected an object of record groups, found {}",
                json_kind(&other)
            ))),
        }
    }

    /// Group keys in parser order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Records stored under `key`.
    ///
    /// Arrays yield their object elements; a single object (such as `file_id`)
    /// yields itself.
    pub fn entries(&self, key: &str) -> impl Iterator<Item = &Record> {
        let items: &[Value] = match self.groups.get(key) {
            Some(Value::Array(items)) => items.as_slice(),
            Some(value @ Value::Object(_)) => std::slice::from_ref(value),
            _ => &[],
        };
        items.iter().filter_map(Value::as_object)
    }

    /// First record under `key`
    pub fn first(&self, key: &str) -> Option<&Record> {
        self.entries(key).next()
    }

    /// First record under the first of `keys` that has one
    pub fn first_of(&self, keys: &[&str]) -> Option<&Record> {
        keys.iter().find_map(|key| self.first(key))
    }

    /// Every non-empty array of records, in parser order
    pub fn record_groups(&self) -> Vec<RecordGroup> {
        self.groups
            .iter()
            .filter_map(|(key, value)| {
                let items = value.as_array()?;
                let records: Vec<Record> = items
                    .iter()
                    .filter_map(Value::as_object)
                    .cloned()
                    .collect();
                if records.is_empty() {
                    None
                } else {
                    Some(RecordGroup::new(key.as_str(), records))
                }
            })
            .collect()
    }
}

/// Title-case a raw group key: `device_infos` becomes `Device Infos`
pub fn format_group_name(group_type: &str) -> String {
    group_type
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Description of a raw group key
pub fn describe_group(group_type: &str) -> String {
    let description = match group_type {
        "record" => "GPS and sensor data points recorded during the activity",
        "session" => "Summary information about the entire workout session",
        "lap" => "Data for individual laps or segments of the workout",
        "event" => "Specific events that occurred during the workout (start, stop, etc.)",
        "device_info" => "Information about the recording device and connected sensors",
        "file_id" => "Basic file identification and metadata",
        "activity" => "High-level activity information and totals",
        "workout" => "Structured workout data if the activity was based on a workout plan",
        "hrv" => "Heart rate variability measurements",
        "monitoring" => "Background monitoring data (steps, calories, etc.)",
        other => return format!("Data of type: {}", other),
    };
    description.to_string()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
