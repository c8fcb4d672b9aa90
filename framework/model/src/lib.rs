use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::io::{BufRead, Read, Write};
use std::path::Path;
use std::str::FromStr;

/// Column names of the consolidated report, in output order.
pub const REPORT_HEADER: [&str; 5] = [
    "experiment number",
    "query",
    "time (ns)",
    "cpu time (ns)",
    "iterations",
];

/// Identifies which run produced a result.
///
/// Numbered experiments come from the configured experiment slots. The baseline run uses only the
/// default arguments and is reported as `default`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display)]
pub enum ExperimentId {
    #[display("default")]
    Baseline,
    #[display("{_0}")]
    Numbered(u8),
}

impl FromStr for ExperimentId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(ExperimentId::Baseline),
            n => n
                .parse::<u8>()
                .map(ExperimentId::Numbered)
                .map_err(|e| anyhow::anyhow!("Invalid experiment id '{n}': {e}")),
        }
    }
}

impl Serialize for ExperimentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ExperimentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// One query timing extracted from the benchmark's console output.
///
/// The numeric fields are kept exactly as the benchmark printed them. No unit conversion or
/// validation is done here, that is left to whoever consumes the report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResultRow {
    #[serde(rename = "experiment number")]
    pub experiment: ExperimentId,
    #[serde(rename = "query")]
    pub query: String,
    #[serde(rename = "time (ns)")]
    pub time_ns: String,
    #[serde(rename = "cpu time (ns)")]
    pub cpu_time_ns: String,
    #[serde(rename = "iterations")]
    pub iterations: String,
}

impl ResultRow {
    pub fn new(
        experiment: ExperimentId,
        query: impl Into<String>,
        time_ns: impl Into<String>,
        cpu_time_ns: impl Into<String>,
        iterations: impl Into<String>,
    ) -> Self {
        Self {
            experiment,
            query: query.into(),
            time_ns: time_ns.into(),
            cpu_time_ns: cpu_time_ns.into(),
            iterations: iterations.into(),
        }
    }
}

/// The rows collected over a whole run.
///
/// Rows are kept in insertion order, which is experiment execution order and then the order the
/// lines appeared in each experiment's output. Nothing is ever sorted or removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    rows: Vec<ResultRow>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the rows parsed from a single invocation.
    pub fn append(&mut self, rows: impl IntoIterator<Item = ResultRow>) {
        self.rows.extend(rows);
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn into_rows(self) -> Vec<ResultRow> {
        self.rows
    }
}

/// What happened when a single experiment was executed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExperimentOutcome {
    /// The experiment that was run
    pub experiment: ExperimentId,
    /// The full command line, executable first
    pub command: Vec<String>,
    /// Exit code of the benchmark process
    ///
    /// Not set if the process was terminated by a signal or could not be started.
    pub exit_code: Option<i32>,
    /// Set when the benchmark process could not be started at all
    pub launch_error: Option<String>,
    /// Number of result rows extracted from the output
    pub rows: usize,
}

impl ExperimentOutcome {
    pub fn succeeded(&self) -> bool {
        self.launch_error.is_none() && self.exit_code == Some(0)
    }
}

/// Summary of a pipeline run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunSummary {
    /// The time the run started
    ///
    /// This is a Unix timestamp in seconds.
    pub started_at: i64,
    /// Hardware type the run was provisioned on, as given in the parameters
    pub hardware: Option<serde_json::Value>,
    /// Storage size the run was provisioned with, as given in the parameters
    pub storage: Option<serde_json::Value>,
    /// Scale factor of the generated benchmark data, as given in the parameters
    pub scale_factor: Option<serde_json::Value>,
    /// Path of the benchmark executable that was run
    pub benchmark: String,
    /// Where the report was written
    pub report_path: String,
    /// One entry per executed experiment, in execution order
    ///
    /// Skipped experiment slots do not appear here.
    pub outcomes: Vec<ExperimentOutcome>,
}

impl RunSummary {
    pub fn total_rows(&self) -> usize {
        self.outcomes.iter().map(|o| o.rows).sum()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.succeeded()).count()
    }
}

/// Append the run summary to a file
///
/// The summary will be serialized to JSON and output as a single line followed by a newline. The
/// recommended file extension is `.jsonl`.
pub fn append_run_summary(run_summary: &RunSummary, path: impl AsRef<Path>) -> anyhow::Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)?;
    store_run_summary(run_summary, &mut file)?;
    file.write_all(b"\n")?;
    Ok(())
}

/// Serialize the run summary to a writer
pub fn store_run_summary<W: Write>(run_summary: &RunSummary, writer: &mut W) -> anyhow::Result<()> {
    serde_json::to_writer(writer, run_summary)?;
    Ok(())
}

/// Load run summaries from a reader
///
/// The input should contain one JSON object per line. This is the format produced by
/// [append_run_summary]. Blank lines are ignored.
pub fn load_run_summaries<R: Read>(reader: R) -> anyhow::Result<Vec<RunSummary>> {
    let reader = std::io::BufReader::new(reader);
    let mut runs = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        runs.push(serde_json::from_str(&line)?);
    }
    Ok(runs)
}
