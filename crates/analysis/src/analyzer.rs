//! Signal analyzers.
//!
//! An analyzer turns `(pair, timeframe)` into a [`SignalReport`]. The
//! production analyzers are external programs that receive the pair and the
//! timeframe as their last two arguments and print the report as JSON on
//! stdout; a non-zero exit means failure.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::errors::{AnalysisError, Result};
use crate::report::SignalReport;

/// Default limit on a single analyzer run.
pub const DEFAULT_ANALYZER_TIMEOUT: Duration = Duration::from_secs(120);

const STDERR_TAIL_CHARS: usize = 500;

#[async_trait]
pub trait SignalAnalyzer: Send + Sync {
    /// Name used in logs and errors.
    fn id(&self) -> &str;

    async fn analyze(&self, pair: &str, timeframe: &str) -> Result<SignalReport>;
}

/// Runs an external program per analysis.
#[derive(Clone, Debug)]
pub struct ProcessAnalyzer {
    id: String,
    program: String,
    args: Vec<String>,
    workdir: Option<PathBuf>,
    timeout: Option<Duration>,
}

impl ProcessAnalyzer {
    pub fn new(id: impl Into<String>, program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            id: id.into(),
            program: program.into(),
            args,
            workdir: None,
            timeout: Some(DEFAULT_ANALYZER_TIMEOUT),
        }
    }

    /// Parse a whitespace separated command line such as
    /// `python3 python_backend/analyze_pair.py`.
    pub fn from_command_line(id: impl Into<String>, command_line: &str) -> Result<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next().ok_or_else(|| {
            AnalysisError::InvalidInput("analyzer command line is empty".to_string())
        })?;
        Ok(Self::new(id, program, parts.collect()))
    }

    pub fn with_workdir(mut self, workdir: impl Into<PathBuf>) -> Self {
        self.workdir = Some(workdir.into());
        self
    }

    /// `None` waits for the analyzer indefinitely.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn command(&self, pair: &str, timeframe: &str) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg(pair)
            .arg(timeframe)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(ref workdir) = self.workdir {
            cmd.current_dir(workdir);
        }
        cmd
    }

    fn parse_output(&self, stdout: &[u8]) -> Result<SignalReport> {
        let text = String::from_utf8_lossy(stdout);
        let trimmed = text.trim();

        if trimmed.is_empty() {
            return Err(AnalysisError::InvalidOutput {
                analyzer: self.id.clone(),
                message: "empty output".to_string(),
            });
        }

        // Stray prints may precede the report, which is always the last line.
        serde_json::from_str::<SignalReport>(trimmed).or_else(|first_err| {
            let last_line = trimmed.lines().last().unwrap_or_default();
            serde_json::from_str::<SignalReport>(last_line).map_err(|_| {
                AnalysisError::InvalidOutput {
                    analyzer: self.id.clone(),
                    message: first_err.to_string(),
                }
            })
        })
    }
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let text = text.trim();
    let count = text.chars().count();
    if count <= STDERR_TAIL_CHARS {
        return text.to_string();
    }
    text.chars().skip(count - STDERR_TAIL_CHARS).collect()
}

#[async_trait]
impl SignalAnalyzer for ProcessAnalyzer {
    fn id(&self) -> &str {
        &self.id
    }

    async fn analyze(&self, pair: &str, timeframe: &str) -> Result<SignalReport> {
        debug!(
            "Running analyzer '{}': {} {:?} {} {}",
            self.id, self.program, self.args, pair, timeframe
        );

        let child = self
            .command(pair, timeframe)
            .spawn()
            .map_err(|source| AnalysisError::Spawn {
                analyzer: self.id.clone(),
                source,
            })?;

        let output = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, child.wait_with_output())
                .await
                .map_err(|_| AnalysisError::Timeout {
                    analyzer: self.id.clone(),
                    timeout,
                })?,
            None => child.wait_with_output().await,
        }
        .map_err(|source| AnalysisError::Spawn {
            analyzer: self.id.clone(),
            source,
        })?;

        if !output.status.success() {
            let stderr = stderr_tail(&output.stderr);
            warn!(
                "Analyzer '{}' failed for {} {}: {} {}",
                self.id, pair, timeframe, output.status, stderr
            );
            return Err(AnalysisError::ExitStatus {
                analyzer: self.id.clone(),
                status: output.status.to_string(),
                stderr,
            });
        }

        self.parse_output(&output.stdout)
    }
}
