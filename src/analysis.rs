//! Activity assessment
//!
//! A compact per-field summary of the metrics export is sent, together with a
//! short instruction, to a text-generation service. Any failure of the
//! service degrades to a fallback message instead of an error.

use crate::error::AnalyzerError;
use crate::export::MetricsExport;
use crate::types::ActivityType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// Instruction used when the caller provides none
pub const DEFAULT_ASSESSMENT_PROMPT: &str = "Given the activity metrics, can you give an assessment if the activity is hard. Recommend a recovery plan (if needed). What sections or area seems to need some improvement.";

const PROMPT_SUFFIX: &str = "\n\nKeep it concise (<= 200 words). Use the provided aggregates.";

/// Text returned by a service that answered without content
pub const EMPTY_RESPONSE: &str = "No analysis returned.";

/// Aggregates of one exported field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSummary {
    pub count: usize,
    /// First, middle and last samples
    pub sample: [f64; 3],
    pub min: f64,
    pub max: f64,
    pub avg: f64,
}

impl FieldSummary {
    pub fn from_samples(values: &[f64]) -> Option<Self> {
        let first = *values.first()?;
        let last = *values.last()?;
        let middle = values[values.len() / 2];

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let avg = values.iter().sum::<f64>() / values.len() as f64;

        Some(Self {
            count: values.len(),
            sample: [first, middle, last],
            min,
            max,
            avg,
        })
    }
}

/// Compact payload sent to the analysis service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    #[serde(rename = "activityType")]
    pub activity_type: ActivityType,
    #[serde(flatten)]
    pub fields: BTreeMap<String, FieldSummary>,
}

impl AnalysisSummary {
    /// Summarize an export; fields without samples are dropped
    pub fn from_export(activity: ActivityType, export: &MetricsExport) -> Self {
        let fields = export
            .iter()
            .filter_map(|(field, values)| {
                FieldSummary::from_samples(values).map(|summary| (field.to_string(), summary))
            })
            .collect();
        Self {
            activity_type: activity,
            fields,
        }
    }
}

/// Full instruction text for the service
pub fn build_prompt(instruction: &str) -> String {
    format!("{}{}", instruction, PROMPT_SUFFIX)
}

/// Trait for text-generation services
pub trait AnalysisClient {
    fn generate(&self, prompt: &str, summary: &AnalysisSummary) -> Result<String, AnalyzerError>;
}

/// Ask `client` for an assessment, turning failures into a fallback message
pub fn analyze_or_fallback<C: AnalysisClient + ?Sized>(
    client: &C,
    instruction: &str,
    summary: &AnalysisSummary,
) -> String {
    let prompt = build_prompt(instruction);
    match client.generate(&prompt, summary) {
        Ok(text) if text.trim().is_empty() => EMPTY_RESPONSE.to_string(),
        Ok(text) => text,
        Err(err) => {
            warn!(error = %err, "activity analysis failed");
            format!("AI analysis unavailable. {}", fallback_reason(&err))
        }
    }
}

fn fallback_reason(err: &AnalyzerError) -> String {
    match err {
        AnalyzerError::AnalysisError(reason) => reason.clone(),
        other => other.to_string(),
    }
}

#[cfg(feature = "gemini")]
pub use gemini::GeminiClient;

#[cfg(feature = "gemini")]
mod gemini {
    use super::{AnalysisClient, AnalysisSummary, EMPTY_RESPONSE};
    use crate::error::AnalyzerError;
    use serde::Deserialize;
    use serde_json::json;
    use ureq::Agent;

    const GEMINI_API_URL: &str =
        "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent";

    /// Environment variable holding the API key
    pub const API_KEY_VAR: &str = "GEMINI_API_KEY";

    #[derive(Debug, Deserialize)]
    struct GenerateResponse {
        #[serde(default)]
        candidates: Vec<Candidate>,
    }

    #[derive(Debug, Deserialize)]
    struct Candidate {
        content: Option<Content>,
    }

    #[derive(Debug, Deserialize)]
    struct Content {
        #[serde(default)]
        parts: Vec<Part>,
    }

    #[derive(Debug, Deserialize)]
    struct Part {
        text: Option<String>,
    }

    /// Blocking Gemini client
    pub struct GeminiClient {
        agent: Agent,
        api_key: String,
    }

    impl GeminiClient {
        pub fn new(api_key: impl Into<String>) -> Self {
            let agent = ureq::AgentBuilder::new()
                .timeout(std::time::Duration::from_secs(30))
                .build();
            Self {
                agent,
                api_key: api_key.into(),
            }
        }

        /// Client keyed from `GEMINI_API_KEY`
        pub fn from_env() -> Result<Self, AnalyzerError> {
            match std::env::var(API_KEY_VAR) {
                Ok(key) if !key.trim().is_empty() => Ok(Self::new(key)),
                _ => Err(AnalyzerError::AnalysisError(format!(
                    "Missing {}",
                    API_KEY_VAR
                ))),
            }
        }
    }

    impl AnalysisClient for GeminiClient {
        fn generate(
            &self,
            prompt: &str,
            summary: &AnalysisSummary,
        ) -> Result<String, AnalyzerError> {
            let body = json!({
                "contents": [{
                    "role": "user",
                    "parts": [
                        { "text": prompt },
                        { "text": serde_json::to_string(summary)? },
                    ],
                }],
            });

            let resp = self
                .agent
                .post(GEMINI_API_URL)
                .query("key", &self.api_key)
                .send_json(body)
                .map_err(|e| AnalyzerError::AnalysisError(e.to_string()))?;
            let parsed: GenerateResponse = resp.into_json()?;

            Ok(parsed
                .candidates
                .into_iter()
                .next()
                .and_then(|c| c.content)
                .and_then(|c| c.parts.into_iter().next())
                .and_then(|p| p.text)
                .unwrap_or_else(|| EMPTY_RESPONSE.to_string()))
        }
    }
}
