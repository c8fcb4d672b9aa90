use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use hustle_bench_runner::prelude::{
    DefaultArgs, ParamsVariant, ParseMode, RunnerConfig, DEFAULT_BENCHMARK_PATH,
    DEFAULT_REPORT_PATH, HUSTLE_BENCHMARK_PATH_ENV,
};

/// Environment variable holding form encoded JSON parameters.
pub const HUSTLE_BENCH_PARAMS_ENV: &str = "HUSTLE_BENCH_PARAMS";

#[derive(Parser, Debug)]
#[command(about, version, long_about = None)]
pub struct CliArgs {
    /// The run parameters as a JSON object.
    ///
    /// Takes precedence over `--params-file`. If neither is given the parameters are read from
    /// the `HUSTLE_BENCH_PARAMS` environment variable, which may be form encoded.
    pub params_json: Option<String>,

    /// Path to the parameters file. Only the first line is read and it may be form encoded.
    #[arg(long)]
    pub params_file: Option<PathBuf>,

    /// Which parameter layout to expect.
    #[arg(long, value_enum, default_value_t = VariantOpt::Args)]
    pub variant: VariantOpt,

    /// Path to the benchmark executable. It is run from the directory that contains it.
    #[arg(long, env = HUSTLE_BENCHMARK_PATH_ENV, default_value = DEFAULT_BENCHMARK_PATH)]
    pub benchmark: PathBuf,

    /// Where to write the CSV report.
    #[arg(long, default_value = DEFAULT_REPORT_PATH)]
    pub report: PathBuf,

    /// Append a JSON summary of this run to the given file.
    #[arg(long)]
    pub run_summary: Option<PathBuf>,

    /// Only look for results after the `------` rule in the benchmark output, or on every line.
    #[arg(long, value_enum, default_value_t = ParseModeOpt::Gated)]
    pub parse_mode: ParseModeOpt,

    /// Arguments for the baseline run.
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    pub default_args: String,

    /// Also put the default arguments in front of every numbered experiment.
    #[arg(long, default_value = "false")]
    pub prefix_default_args: bool,

    /// Run the baseline before the numbered experiments, whatever the variant.
    #[arg(long, default_value = "false", conflicts_with = "no_baseline")]
    pub baseline: bool,

    /// Never run the baseline, whatever the variant.
    #[arg(long, default_value = "false")]
    pub no_baseline: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum VariantOpt {
    /// `experiment_<k>_args` keys, `skip` marks an unused experiment
    Args,
    /// `experiment_<k>_flags` keys, an empty value marks an unused experiment
    Flags,
}

impl From<VariantOpt> for ParamsVariant {
    fn from(value: VariantOpt) -> Self {
        match value {
            VariantOpt::Args => ParamsVariant::Args,
            VariantOpt::Flags => ParamsVariant::Flags,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseModeOpt {
    Gated,
    Ungated,
}

impl From<ParseModeOpt> for ParseMode {
    fn from(value: ParseModeOpt) -> Self {
        match value {
            ParseModeOpt::Gated => ParseMode::Gated,
            ParseModeOpt::Ungated => ParseMode::Ungated,
        }
    }
}

impl CliArgs {
    pub fn runner_config(&self) -> RunnerConfig {
        let baseline = match (self.baseline, self.no_baseline) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };
        let policy = if self.prefix_default_args {
            DefaultArgs::PrefixAll
        } else {
            DefaultArgs::BaselineOnly
        };

        RunnerConfig::default()
            .benchmark_path(&self.benchmark)
            .report_path(&self.report)
            .run_summary_path(self.run_summary.clone())
            .parse_mode(self.parse_mode.into())
            .default_args(&self.default_args)
            .default_args_policy(policy)
            .baseline(baseline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_defaults() {
        let args = CliArgs::try_parse_from(["hustle-cloudlab", r#"{"a": 1}"#]).unwrap();

        assert_eq!(args.params_json.as_deref(), Some(r#"{"a": 1}"#));
        assert_eq!(args.variant, VariantOpt::Args);
        assert_eq!(args.report, PathBuf::from(DEFAULT_REPORT_PATH));
        assert_eq!(args.parse_mode, ParseModeOpt::Gated);

        let config = args.runner_config();
        assert_eq!(config.baseline, None);
        assert!(config.default_args.is_empty());
        assert_eq!(config.default_args_policy, DefaultArgs::BaselineOnly);
    }

    #[test]
    fn parse_all_options() {
        let args = CliArgs::try_parse_from([
            "hustle-cloudlab",
            "--params-file",
            "/mydata/params.json",
            "--variant",
            "flags",
            "--benchmark",
            "/mydata/repo/build_release/src/benchmark/hustle_src_benchmark_main",
            "--report",
            "/mydata/results/report.csv",
            "--run-summary",
            "/mydata/results/run_summary.jsonl",
            "--parse-mode",
            "ungated",
            "--default-args",
            "--benchmark_repetitions=3",
            "--prefix-default-args",
            "--no-baseline",
        ])
        .unwrap();

        assert_eq!(args.params_file, Some(PathBuf::from("/mydata/params.json")));
        assert_eq!(ParamsVariant::from(args.variant), ParamsVariant::Flags);

        let config = args.runner_config();
        assert_eq!(config.parse_mode, ParseMode::Ungated);
        assert_eq!(config.default_args, vec!["--benchmark_repetitions=3"]);
        assert_eq!(config.default_args_policy, DefaultArgs::PrefixAll);
        assert_eq!(config.baseline, Some(false));
        assert_eq!(
            config.run_summary_path,
            Some(PathBuf::from("/mydata/results/run_summary.jsonl"))
        );
    }

    #[test]
    fn baseline_flags_conflict() {
        let result = CliArgs::try_parse_from(["hustle-cloudlab", "--baseline", "--no-baseline"]);
        assert!(result.is_err());
    }
}
