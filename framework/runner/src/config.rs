use std::path::PathBuf;

use crate::benchmark_binary::DEFAULT_BENCHMARK_PATH;
use crate::invocation::{DefaultArgs, PlanOptions};
use crate::params::{split_args, ParamsVariant};
use crate::parser::ParseMode;

/// Default location of the consolidated report.
pub const DEFAULT_REPORT_PATH: &str = "results/report.csv";

/// Everything the pipeline needs apart from the run parameters.
///
/// Paths are resolved when the pipeline starts, relative paths are relative to the current
/// directory of this process.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub benchmark_path: PathBuf,
    pub report_path: PathBuf,
    pub run_summary_path: Option<PathBuf>,
    pub parse_mode: ParseMode,
    pub default_args: Vec<String>,
    pub default_args_policy: DefaultArgs,
    /// Overrides whether the baseline run happens, otherwise the parameter variant decides.
    pub baseline: Option<bool>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            benchmark_path: PathBuf::from(DEFAULT_BENCHMARK_PATH),
            report_path: PathBuf::from(DEFAULT_REPORT_PATH),
            run_summary_path: None,
            parse_mode: ParseMode::default(),
            default_args: Vec::new(),
            default_args_policy: DefaultArgs::default(),
            baseline: None,
        }
    }
}

impl RunnerConfig {
    /// Builds a [`RunnerConfig`] with the specified benchmark executable.
    pub fn benchmark_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.benchmark_path = path.into();
        self
    }

    /// Builds a [`RunnerConfig`] with the specified report destination.
    pub fn report_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.report_path = path.into();
        self
    }

    /// Builds a [`RunnerConfig`] that appends a run summary to the specified JSONL file.
    pub fn run_summary_path(mut self, path: Option<PathBuf>) -> Self {
        self.run_summary_path = path;
        self
    }

    /// Builds a [`RunnerConfig`] with the specified parse mode.
    pub fn parse_mode(mut self, mode: ParseMode) -> Self {
        self.parse_mode = mode;
        self
    }

    /// Builds a [`RunnerConfig`] with the specified default arguments, split on whitespace.
    pub fn default_args(mut self, args: &str) -> Self {
        self.default_args = split_args(args);
        self
    }

    /// Builds a [`RunnerConfig`] with the specified use of the default arguments.
    pub fn default_args_policy(mut self, policy: DefaultArgs) -> Self {
        self.default_args_policy = policy;
        self
    }

    /// Builds a [`RunnerConfig`] that forces the baseline run on or off.
    pub fn baseline(mut self, baseline: Option<bool>) -> Self {
        self.baseline = baseline;
        self
    }

    pub fn plan_options(&self, variant: ParamsVariant) -> PlanOptions {
        PlanOptions {
            baseline: self.baseline.unwrap_or_else(|| variant.runs_baseline()),
            default_args: self.default_args.clone(),
            default_args_policy: self.default_args_policy,
        }
    }
}
