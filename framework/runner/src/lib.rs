mod benchmark_binary;
mod config;
mod error;
mod init;
mod invocation;
mod params;
mod parser;
mod report;
mod run;
mod types;

pub mod prelude {
    pub use crate::benchmark_binary::{
        resolve_benchmark_path, BenchmarkBinary, Launcher, DEFAULT_BENCHMARK_PATH,
        HUSTLE_BENCHMARK_PATH_ENV,
    };
    pub use crate::config::{RunnerConfig, DEFAULT_REPORT_PATH};
    pub use crate::error::{ConfigError, LaunchError, ReportWriteError};
    pub use crate::init::init_logging;
    pub use crate::invocation::{
        plan_invocations, CapturedOutput, DefaultArgs, PlanOptions, RunInvocation,
    };
    pub use crate::params::{
        split_args, unquote_plus, BenchParams, ExperimentSlot, ParamsVariant, SkipSentinel,
        SlotArguments, EXPERIMENT_SLOT_COUNT,
    };
    pub use crate::parser::{ParseMode, ResultParser};
    pub use crate::report::{write_report_file, CsvReportWriter, WriteReport};
    pub use crate::run::{run, ExperimentRunner, RunOutcome};
    pub use crate::types::HustleBenchResult;
}
