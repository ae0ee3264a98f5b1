//! Pipeline orchestration
//!
//! This module provides the public API for fitscope.
//! It runs a parsed activity file through every stage, from record group
//! extraction to charts, statistics, export and assessment.

use crate::activity::ActivityDetector;
use crate::analysis::AnalysisSummary;
use crate::charts::{ChartRenderer, MultiChartManager};
use crate::config::AnalyzerConfig;
use crate::error::AnalyzerError;
use crate::export::MetricsExport;
use crate::manufacturers::ManufacturerDetector;
use crate::processor::DataProcessor;
use crate::schema::ParsedFile;
use crate::types::{ActivityType, ManufacturerInfo, MetricStats, RecordGroup};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

/// Analyze parser output JSON with default settings.
///
/// # Arguments
/// * `raw_json` - JSON object produced by the FIT parser
///
/// # Returns
/// Overview of the activity: type, device, record groups and chartable metrics
///
/// # Example
/// ```ignore
/// let report = analyze_fit_json(parsed_json)?;
/// println!("{} on {}", report.activity_name, report.device);
/// ```
pub fn analyze_fit_json(raw_json: &str) -> Result<AnalysisReport, AnalyzerError> {
    let analysis = FileAnalyzer::new().analyze_json(raw_json)?;
    Ok(analysis.report())
}

/// Everything learned about one activity file
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityAnalysis {
    pub activity: ActivityType,
    pub manufacturer: ManufacturerInfo,
    /// Record groups as parsed
    pub raw_groups: Vec<RecordGroup>,
    /// Record groups with derived speed or pace
    pub groups: Vec<RecordGroup>,
    /// Display metrics with substantial data, sorted
    pub available_metrics: Vec<String>,
}

impl ActivityAnalysis {
    pub fn report(&self) -> AnalysisReport {
        AnalysisReport {
            activity: self.activity,
            activity_name: self.activity.display_name().to_string(),
            device: self.manufacturer.name.clone(),
            groups: self
                .groups
                .iter()
                .map(|group| GroupOverview {
                    group_type: group.group_type.clone(),
                    name: group.name.clone(),
                    description: group.description.clone(),
                    records: group.records.len(),
                })
                .collect(),
            available_metrics: self.available_metrics.clone(),
        }
    }
}

/// Serializable activity overview
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub activity: ActivityType,
    pub activity_name: String,
    pub device: String,
    pub groups: Vec<GroupOverview>,
    pub available_metrics: Vec<String>,
}

/// One record group in an [`AnalysisReport`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupOverview {
    #[serde(rename = "type")]
    pub group_type: String,
    pub name: String,
    pub description: String,
    pub records: usize,
}

/// Analyzer holding the configuration shared by every stage.
///
/// Use this when several operations run against the same file or settings.
#[derive(Debug, Clone, Default)]
pub struct FileAnalyzer {
    config: AnalyzerConfig,
    processor: DataProcessor,
}

impl FileAnalyzer {
    /// Create an analyzer with default settings
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AnalyzerConfig) -> Self {
        Self {
            processor: DataProcessor::from_config(&config),
            config,
        }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Parse parser output JSON and analyze it
    pub fn analyze_json(&self, raw_json: &str) -> Result<ActivityAnalysis, AnalyzerError> {
        let file = ParsedFile::from_json(raw_json)?;
        Ok(self.analyze(&file))
    }

    /// Run detection, normalization and availability filtering.
    ///
    /// Pipeline stages:
    /// 1. ParsedFile - Extract record groups
    /// 2. ActivityDetector - Classify the activity
    /// 3. ManufacturerDetector - Identify the device and its field mappings
    /// 4. DataProcessor - Derive speed/pace and filter available metrics
    pub fn analyze(&self, file: &ParsedFile) -> ActivityAnalysis {
        let raw_groups = file.record_groups();
        let activity = ActivityDetector::detect(file);
        let manufacturer = ManufacturerDetector::detect(file, activity);

        let groups = self
            .processor
            .process_records(&raw_groups, &manufacturer, activity);
        let available_metrics =
            self.processor
                .extract_available_metrics(&groups, &manufacturer, activity);

        info!(
            %activity,
            device = %manufacturer.name,
            groups = groups.len(),
            metrics = available_metrics.len(),
            "activity analyzed"
        );

        ActivityAnalysis {
            activity,
            manufacturer,
            raw_groups,
            groups,
            available_metrics,
        }
    }

    /// Statistics for `metrics`, or for every available metric when empty
    pub fn statistics<S: AsRef<str>>(
        &self,
        analysis: &ActivityAnalysis,
        metrics: &[S],
    ) -> BTreeMap<String, MetricStats> {
        if metrics.is_empty() {
            self.processor.calculate_statistics(
                &analysis.groups,
                &analysis.available_metrics,
                &analysis.manufacturer,
            )
        } else {
            self.processor
                .calculate_statistics(&analysis.groups, metrics, &analysis.manufacturer)
        }
    }

    pub fn export_metrics(&self, analysis: &ActivityAnalysis) -> MetricsExport {
        MetricsExport::collect(
            &analysis.groups,
            &analysis.manufacturer,
            &analysis.available_metrics,
        )
    }

    /// Compact summary for the assessment service
    pub fn summary(&self, analysis: &ActivityAnalysis) -> AnalysisSummary {
        AnalysisSummary::from_export(analysis.activity, &self.export_metrics(analysis))
    }

    /// Chart manager loaded with the file's data.
    ///
    /// Charts read the parsed groups, so speed fields are converted once,
    /// when a series is built.
    pub fn chart_manager<R: ChartRenderer>(
        &self,
        analysis: &ActivityAnalysis,
        renderer: R,
    ) -> MultiChartManager<R> {
        let mut manager = MultiChartManager::new(renderer).with_units(self.config.units);
        manager.set_data(analysis.raw_groups.clone(), analysis.activity);
        manager.set_field_mappings(analysis.manufacturer.field_mappings.clone());
        manager
    }
}
