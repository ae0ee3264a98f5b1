//! Error types for fitscope

use thiserror::Error;

/// Errors that can occur while analyzing an activity file
#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("Failed to parse activity file: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Rendering target unavailable: {0}")]
    RenderTarget(String),

    #[error("Analysis service error: {0}")]
    AnalysisError(String),
}
