//! Error types for signal analysis.

use std::time::Duration;

use thiserror::Error;

/// Type alias for Result using [`AnalysisError`].
pub type Result<T> = std::result::Result<T, AnalysisError>;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Invalid analysis input: {0}")]
    InvalidInput(String),

    #[error("Failed to start analyzer '{analyzer}': {source}")]
    Spawn {
        analyzer: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Analyzer '{analyzer}' exited with {status}: {stderr}")]
    ExitStatus {
        analyzer: String,
        status: String,
        /// Trimmed tail of the analyzer's stderr
        stderr: String,
    },

    #[error("Analyzer '{analyzer}' produced invalid output: {message}")]
    InvalidOutput { analyzer: String, message: String },

    #[error("Analyzer '{analyzer}' timed out after {timeout:?}")]
    Timeout { analyzer: String, timeout: Duration },

    #[error("No analyzers configured")]
    NoAnalyzers,

    #[error("All {attempts} analyzers failed, last error: {last_error}")]
    AllAnalyzersFailed { attempts: usize, last_error: String },
}

impl AnalysisError {
    /// Whether the caller sent something unusable, as opposed to an analyzer
    /// failing.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}
