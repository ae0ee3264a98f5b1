//! Parser output schema
//!
//! The external FIT parser delivers a JSON object mapping group keys
//! (`records`, `laps`, `sessions`, `device_infos`, ...) to ordered arrays of flat
//! field-keyed records, with identification blocks such as `file_id` as single
//! objects. This module wraps that shape and provides the value coercions the
//! rest of the pipeline shares.

mod parsed_file;
mod values;

pub use parsed_file::{describe_group, format_group_name, ParsedFile};
pub use values::{coerce_number, number, text, timestamp};
