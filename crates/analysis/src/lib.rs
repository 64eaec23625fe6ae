//! Nexus signal analysis.
//!
//! Trading signals are produced by external analyzer programs. This crate
//! runs them ([`ProcessAnalyzer`]), models their output ([`SignalReport`]) and
//! puts a short-lived cache with an ordered fallback in front of them
//! ([`SignalService`]).

pub mod analyzer;
pub mod errors;
pub mod report;
pub mod service;

pub use analyzer::{ProcessAnalyzer, SignalAnalyzer, DEFAULT_ANALYZER_TIMEOUT};
pub use errors::{AnalysisError, Result};
pub use report::{Indicators, SignalReport, DEFAULT_TIMEFRAME, SUPPORTED_TIMEFRAMES};
pub use service::{SignalService, SignalServiceTrait};
