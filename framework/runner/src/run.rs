use anyhow::Context;
use hustle_bench_model::{append_run_summary, ExperimentOutcome, Report, ResultRow, RunSummary};

use crate::benchmark_binary::{BenchmarkBinary, Launcher};
use crate::config::RunnerConfig;
use crate::invocation::{plan_invocations, RunInvocation};
use crate::params::BenchParams;
use crate::parser::ResultParser;
use crate::report::write_report_file;
use crate::types::HustleBenchResult;

/// Everything collected from running a list of invocations.
#[derive(Debug, Default)]
pub struct RunOutcome {
    pub report: Report,
    pub outcomes: Vec<ExperimentOutcome>,
}

/// Runs planned invocations one at a time and parses each one's output as soon as it finishes.
pub struct ExperimentRunner<L: Launcher> {
    launcher: L,
    parser: ResultParser,
}

impl<L: Launcher> ExperimentRunner<L> {
    pub fn new(launcher: L, parser: ResultParser) -> Self {
        Self { launcher, parser }
    }

    /// Run every invocation in order.
    ///
    /// A benchmark that fails, or can't be started, is logged and recorded in its outcome. The
    /// remaining invocations still run.
    pub fn run(&self, plan: &[RunInvocation]) -> RunOutcome {
        let mut outcome = RunOutcome::default();
        for invocation in plan {
            let (rows, experiment_outcome) = self.run_one(invocation);
            outcome.report.append(rows);
            outcome.outcomes.push(experiment_outcome);
        }
        outcome
    }

    fn run_one(&self, invocation: &RunInvocation) -> (Vec<ResultRow>, ExperimentOutcome) {
        let mut command = vec![self.launcher.program().display().to_string()];
        command.extend(invocation.args.iter().cloned());

        log::info!("Starting Experiment #{}...", invocation.experiment);
        log::info!("Experiment Command: {}", command.join(" "));

        let mut outcome = ExperimentOutcome {
            experiment: invocation.experiment,
            command,
            exit_code: None,
            launch_error: None,
            rows: 0,
        };

        let output = match self.launcher.launch(&invocation.args) {
            Ok(output) => output,
            Err(e) => {
                log::error!("Experiment #{} could not be started: {e:?}", invocation.experiment);
                outcome.launch_error = Some(e.to_string());
                return (Vec::new(), outcome);
            }
        };

        log::debug!("Experiment Output:\n{}", output.text);
        match output.exit_code {
            Some(0) => log::info!("Experiment Return Code: 0"),
            Some(code) => log::warn!(
                "Experiment #{} failed with return code {code}",
                invocation.experiment
            ),
            None => log::warn!(
                "Experiment #{} was terminated by a signal",
                invocation.experiment
            ),
        }

        let rows = self.parser.parse(invocation.experiment, &output.text);
        log::info!(
            "Experiment #{} produced {} result rows",
            invocation.experiment,
            rows.len()
        );

        outcome.exit_code = output.exit_code;
        outcome.rows = rows.len();
        (rows, outcome)
    }
}

/// Run all configured experiments and write the report.
///
/// Only a missing benchmark executable or a failure to write the report is an error. Individual
/// experiments failing is not, they just contribute no rows.
pub fn run(config: &RunnerConfig, params: &BenchParams) -> HustleBenchResult<RunSummary> {
    let started_at = chrono::Utc::now().timestamp();

    log::info!("Machine Parameters:");
    log::info!("Hardware: {}", display_param(&params.hardware));
    log::info!("Storage Size: {}", display_param(&params.storage));
    log::info!("scale_factor: {}", display_param(&params.scale_factor));

    let binary = BenchmarkBinary::locate(&config.benchmark_path)
        .context("Cannot run experiments without the benchmark executable")?;
    log::info!(
        "Using benchmark '{}' in '{}'",
        binary.program().display(),
        binary.working_dir().display()
    );

    let plan = plan_invocations(params, &config.plan_options(params.variant));
    for slot in params.experiments.iter().filter(|slot| slot.is_skipped()) {
        log::info!("Experiment #{} skipped.", slot.id);
    }

    log::info!("Starting Experiments...");
    let benchmark = binary.program().display().to_string();
    let runner = ExperimentRunner::new(binary, ResultParser::new(config.parse_mode));
    let RunOutcome { report, outcomes } = runner.run(&plan);
    log::info!("Experiments finished.");

    log::info!("Saving results...");
    write_report_file(&config.report_path, &report).with_context(|| {
        format!(
            "Failed to write report to '{}'",
            config.report_path.display()
        )
    })?;
    log::info!("Results saved to: \"{}\"", config.report_path.display());

    let summary = RunSummary {
        started_at,
        hardware: params.hardware.clone(),
        storage: params.storage.clone(),
        scale_factor: params.scale_factor.clone(),
        benchmark,
        report_path: config.report_path.display().to_string(),
        outcomes,
    };

    if summary.failed_count() > 0 {
        log::warn!(
            "{} out of {} experiments failed",
            summary.failed_count(),
            summary.outcomes.len()
        );
    }

    if let Some(path) = &config.run_summary_path {
        // The report is already written, so losing the summary isn't worth failing the run for.
        match append_run_summary(&summary, path) {
            Ok(()) => log::info!("Run summary appended to: \"{}\"", path.display()),
            Err(e) => log::error!("Failed to append run summary to '{}': {e:?}", path.display()),
        }
    }

    Ok(summary)
}

fn display_param(value: &Option<serde_json::Value>) -> String {
    match value {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "not set".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::path::Path;

    use hustle_bench_model::ExperimentId;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::error::LaunchError;
    use crate::invocation::CapturedOutput;
    use crate::parser::ParseMode;

    /// Hands out canned outputs in order and remembers the arguments it was launched with.
    #[derive(Default)]
    struct ScriptedLauncher {
        outputs: RefCell<VecDeque<Result<CapturedOutput, LaunchError>>>,
        launched: RefCell<Vec<Vec<String>>>,
    }

    impl ScriptedLauncher {
        fn with_outputs(outputs: Vec<Result<CapturedOutput, LaunchError>>) -> Self {
            Self {
                outputs: RefCell::new(outputs.into()),
                launched: RefCell::default(),
            }
        }
    }

    impl Launcher for &ScriptedLauncher {
        fn program(&self) -> &Path {
            Path::new("bench")
        }

        fn launch(&self, args: &[String]) -> Result<CapturedOutput, LaunchError> {
            self.launched.borrow_mut().push(args.to_vec());
            self.outputs
                .borrow_mut()
                .pop_front()
                .expect("launched more often than expected")
        }
    }

    fn ok(text: &str, exit_code: i32) -> Result<CapturedOutput, LaunchError> {
        Ok(CapturedOutput {
            text: text.to_string(),
            exit_code: Some(exit_code),
        })
    }

    fn invocation(id: u8) -> RunInvocation {
        RunInvocation {
            experiment: ExperimentId::Numbered(id),
            args: vec![format!("q{id}")],
        }
    }

    #[test]
    fn failed_experiment_does_not_stop_the_run() {
        let launcher = ScriptedLauncher::with_outputs(vec![
            ok("------\nquery11 1 ns 2 ns 3\n", 0),
            ok("", 1),
            ok("------\nquery31 4 ns 5 ns 6\nquery32 7 ns 8 ns 9\n", 0),
        ]);
        let runner = ExperimentRunner::new(&launcher, ResultParser::new(ParseMode::Gated));

        let outcome = runner.run(&[invocation(1), invocation(2), invocation(3)]);

        assert_eq!(
            outcome.report.rows(),
            &[
                ResultRow::new(ExperimentId::Numbered(1), "query11", "1", "2", "3"),
                ResultRow::new(ExperimentId::Numbered(3), "query31", "4", "5", "6"),
                ResultRow::new(ExperimentId::Numbered(3), "query32", "7", "8", "9"),
            ]
        );
        assert_eq!(
            outcome
                .outcomes
                .iter()
                .map(|o| (o.experiment, o.exit_code, o.rows))
                .collect::<Vec<_>>(),
            vec![
                (ExperimentId::Numbered(1), Some(0), 1),
                (ExperimentId::Numbered(2), Some(1), 0),
                (ExperimentId::Numbered(3), Some(0), 2),
            ]
        );
        assert_eq!(launcher.launched.borrow().len(), 3);
    }

    #[test]
    fn launch_error_is_recorded_and_run_continues() {
        let launcher = ScriptedLauncher::with_outputs(vec![
            Err(LaunchError::Spawn {
                path: "bench".into(),
                source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            }),
            ok("------\nquery21 1 ns 2 ns 3\n", 0),
        ]);
        let runner = ExperimentRunner::new(&launcher, ResultParser::default());

        let outcome = runner.run(&[invocation(1), invocation(2)]);

        assert_eq!(outcome.report.len(), 1);
        assert!(outcome.outcomes[0].launch_error.is_some());
        assert!(!outcome.outcomes[0].succeeded());
        assert!(outcome.outcomes[1].succeeded());
    }

    #[test]
    fn rows_from_failed_run_are_kept() {
        let launcher = ScriptedLauncher::with_outputs(vec![ok(
            "------\nquery11 1 ns 2 ns 3\nSegmentation fault\n",
            139,
        )]);
        let runner = ExperimentRunner::new(&launcher, ResultParser::default());

        let outcome = runner.run(&[invocation(1)]);

        assert_eq!(outcome.report.len(), 1);
        assert_eq!(outcome.outcomes[0].exit_code, Some(139));
    }

    #[test]
    fn command_is_recorded() {
        let launcher = ScriptedLauncher::with_outputs(vec![ok("", 0)]);
        let runner = ExperimentRunner::new(&launcher, ResultParser::default());

        let outcome = runner.run(&[RunInvocation {
            experiment: ExperimentId::Baseline,
            args: vec!["hash-aggregate".to_string(), "ssb".to_string()],
        }]);

        assert_eq!(outcome.outcomes[0].command, vec!["bench", "hash-aggregate", "ssb"]);
        assert_eq!(
            *launcher.launched.borrow(),
            vec![vec!["hash-aggregate".to_string(), "ssb".to_string()]]
        );
    }

    #[test]
    fn empty_plan_runs_nothing() {
        let launcher = ScriptedLauncher::default();
        let runner = ExperimentRunner::new(&launcher, ResultParser::default());

        let outcome = runner.run(&[]);

        assert!(outcome.report.is_empty());
        assert!(outcome.outcomes.is_empty());
        assert!(launcher.launched.borrow().is_empty());
    }

    #[test]
    fn display_param_formats_values() {
        assert_eq!(display_param(&Some(serde_json::json!("c220g5"))), "c220g5");
        assert_eq!(display_param(&Some(serde_json::json!(10))), "10");
        assert_eq!(display_param(&None), "not set");
    }
}
