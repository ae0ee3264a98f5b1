//! Manufacturer detection
//!
//! This module identifies the recording device of a parsed file and selects the
//! field mapping table (display metric to candidate raw fields) for it. Each
//! supported vendor provides its own table; unrecognized devices fall back to a
//! generic table covering the full raw-field vocabulary.

mod garmin;
mod generic;
mod wahoo;

pub use garmin::GarminMappings;
pub use generic::GenericMappings;
pub use wahoo::WahooMappings;

use crate::schema::{number, text, ParsedFile};
use crate::types::{ActivityType, FieldMapping, Manufacturer, ManufacturerInfo, Record};
use serde_json::Value;
use tracing::debug;

/// FIT profile manufacturer ids understood when the parser emits raw numbers
const FIT_MANUFACTURER_IDS: &[(u64, &str)] = &[(1, "garmin"), (32, "wahoo_fitness")];

/// Raw device identity found in a parsed file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceIdentity {
    /// Lower-cased manufacturer token
    pub manufacturer: String,
    /// Product name as recorded, possibly empty
    pub product: String,
}

/// Trait for vendor field mapping tables
pub trait FieldMappingProvider {
    /// Vendor this table belongs to
    fn manufacturer(&self) -> Manufacturer;

    /// Whether the device identity belongs to this vendor
    fn matches(&self, device: &DeviceIdentity) -> bool;

    /// Field mapping table, which may vary by activity
    fn field_mappings(&self, activity: ActivityType) -> FieldMapping;
}

/// Detector for the recording device of a parsed file
pub struct ManufacturerDetector;

impl ManufacturerDetector {
    /// Detect the device vendor and its field mappings. Never fails: files
    /// without any device information get the generic table.
    pub fn detect(file: &ParsedFile, activity: ActivityType) -> ManufacturerInfo {
        let device = Self::identify(file).unwrap_or_default();
        debug!(manufacturer = %device.manufacturer, product = %device.product, "manufacturer detection");

        let vendors: [&dyn FieldMappingProvider; 2] = [&GarminMappings, &WahooMappings];
        for vendor in vendors {
            if vendor.matches(&device) {
                return ManufacturerInfo::new(vendor.manufacturer(), vendor.field_mappings(activity));
            }
        }

        let product = if device.product.is_empty() {
            None
        } else {
            Some(device.product)
        };
        ManufacturerInfo::new(
            Manufacturer::Unknown { product },
            GenericMappings.field_mappings(activity),
        )
    }

    /// Find the device identity, trying in order the file identification
    /// block, the device info list and the device list.
    pub fn identify(file: &ParsedFile) -> Option<DeviceIdentity> {
        if let Some(device) = file
            .first_of(&["file_id", "file_ids"])
            .and_then(|file_id| identity_from(file_id, "product"))
        {
            return Some(device);
        }

        ["device_infos", "devices"]
            .iter()
            .filter_map(|key| main_device(file, key))
            .find_map(|device| identity_from(device, "product_name"))
    }
}

/// Entry with device index 0 (the recording device), else the first entry
fn main_device<'a>(file: &'a ParsedFile, key: &str) -> Option<&'a Record> {
    file.entries(key)
        .find(|device| is_creator(device.get("device_index")))
        .or_else(|| file.first(key))
}

fn is_creator(index: Option<&Value>) -> bool {
    match index {
        Some(Value::String(s)) => s == "creator" || s == "0",
        Some(value) => number(value) == Some(0.0),
        None => false,
    }
}

fn identity_from(entry: &Record, product_key: &str) -> Option<DeviceIdentity> {
    let manufacturer = manufacturer_token(entry.get("manufacturer"));
    if manufacturer.is_empty() {
        return None;
    }
    Some(DeviceIdentity {
        manufacturer,
        product: text(entry.get(product_key)),
    })
}

fn manufacturer_token(value: Option<&Value>) -> String {
    if let Some(id) = value.and_then(Value::as_u64) {
        if let Some((_, name)) = FIT_MANUFACTURER_IDS.iter().find(|(known, _)| *known == id) {
            return (*name).to_string();
        }
    }
    text(value).trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect(json: &str, activity: ActivityType) -> ManufacturerInfo {
        ManufacturerDetector::detect(&ParsedFile::from_json(json).unwrap(), activity)
    }

    #[test]
    fn test_garmin_from_file_id() {
        let info = detect(
            r#"{"file_id": {"manufacturer": "Garmin", "product": "fenix7"}}"#,
            ActivityType::Running,
        );

        assert_eq!(info.manufacturer, Manufacturer::Garmin);
        assert_eq!(info.name, "Garmin");
        assert!(info.field_mappings.contains("Ground Contact Time"));
    }

    #[test]
    fn test_wahoo_from_device_infos_product() {
        let info = detect(
            r#"{"device_infos": [
                {"device_index": 1, "manufacturer": "garmin", "product_name": "HRM-Pro"},
                {"device_index": 0, "manufacturer": "development", "product_name": "ELEMNT BOLT"}
            ]}"#,
            ActivityType::Cycling,
        );

        assert_eq!(info.manufacturer, Manufacturer::Wahoo);
        assert!(info.field_mappings.contains("Power"));
    }

    #[test]
    fn test_first_device_when_no_creator() {
        let file = ParsedFile::from_json(
            r#"{"devices": [
                {"device_index": 2, "manufacturer": "wahoo_fitness"},
                {"device_index": 3, "manufacturer": "garmin"}
            ]}"#,
        )
        .unwrap();

        let device = ManufacturerDetector::identify(&file).unwrap();
        assert_eq!(device.manufacturer, "wahoo_fitness");
    }

    #[test]
    fn test_file_id_without_manufacturer_falls_through() {
        let info = detect(
            r#"{
                "file_id": {"product": "mystery"},
                "device_infos": [{"device_index": 0, "manufacturer": "garmin"}]
            }"#,
            ActivityType::Cycling,
        );
        assert_eq!(info.manufacturer, Manufacturer::Garmin);
    }

    #[test]
    fn test_numeric_manufacturer_id() {
        let info = detect(r#"{"file_id": {"manufacturer": 32}}"#, ActivityType::Cycling);
        assert_eq!(info.manufacturer, Manufacturer::Wahoo);
    }

    #[test]
    fn test_unknown_vendor_keeps_product() {
        let info = detect(
            r#"{"file_id": {"manufacturer": "coros", "product": "PACE 3"}}"#,
            ActivityType::Running,
        );

        assert_eq!(info.name, "Unknown (PACE 3)");
        assert_eq!(info.field_mappings, GenericMappings.field_mappings(ActivityType::Running));
    }

    #[test]
    fn test_no_device_information() {
        let info = detect(r#"{"records": [{"heart_rate": 120}]}"#, ActivityType::Cycling);

        assert!(info.name.starts_with("Unknown"));
        assert_eq!(info.manufacturer, Manufacturer::Unknown { product: None });
        assert_eq!(info.field_mappings, GenericMappings.field_mappings(ActivityType::Cycling));
    }
}
