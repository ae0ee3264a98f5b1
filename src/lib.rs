//! fitscope - Metric classification and multi-chart aggregation for FIT activity files
//!
//! fitscope takes the JSON output of a FIT parser and runs it through a
//! deterministic pipeline: record group extraction → activity detection →
//! manufacturer detection → speed/pace normalization → metric availability.
//!
//! ## Modules
//!
//! - **Pipeline**: Detection, normalization, statistics and metrics export
//! - **Charts**: User-composed charts that can be merged and split
//! - **Analysis**: Compact summaries for an external assessment service

pub mod activity;
pub mod analysis;
pub mod charts;
pub mod config;
pub mod error;
pub mod export;
pub mod manufacturers;
pub mod pipeline;
pub mod processor;
pub mod schema;
pub mod speed;
pub mod types;

pub use activity::ActivityDetector;
pub use config::{AnalyzerConfig, AvailabilityThresholds};
pub use error::AnalyzerError;
pub use manufacturers::ManufacturerDetector;
pub use pipeline::{analyze_fit_json, ActivityAnalysis, AnalysisReport, FileAnalyzer};
pub use processor::DataProcessor;
pub use speed::SpeedConverter;
pub use types::{
    ActivityType, FieldMapping, Manufacturer, ManufacturerInfo, MetricStats, Record, RecordGroup,
    UnitSystem,
};

// Chart exports
pub use charts::{ChartId, ChartRenderer, ChartSet, MemoryRenderer, MultiChartManager};

/// fitscope version
pub const FITSCOPE_VERSION: &str = env!("CARGO_PKG_VERSION");
