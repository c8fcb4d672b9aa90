use hustle_bench_model::ExperimentId;

use crate::params::BenchParams;

/// How the default arguments are used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DefaultArgs {
    /// Only the baseline run uses them.
    #[default]
    BaselineOnly,
    /// The baseline run uses them and every numbered experiment is prefixed with them, after the
    /// common arguments.
    PrefixAll,
}

/// Options that shape the list of invocations.
#[derive(Debug, Clone, Default)]
pub struct PlanOptions {
    /// Run the benchmark once with only the default arguments before the numbered experiments
    pub baseline: bool,
    pub default_args: Vec<String>,
    pub default_args_policy: DefaultArgs,
}

/// A single planned run of the benchmark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunInvocation {
    pub experiment: ExperimentId,
    /// Arguments passed to the executable, not including the executable itself
    pub args: Vec<String>,
}

/// What a finished benchmark process left behind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    /// Standard output followed by standard error
    pub text: String,
    /// `None` if the process was terminated by a signal
    pub exit_code: Option<i32>,
}

impl CapturedOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Work out which benchmark runs to do, in the order they must happen.
///
/// The baseline run, if enabled, comes first. Then one invocation per experiment slot that is
/// not skipped, in slot order.
pub fn plan_invocations(params: &BenchParams, options: &PlanOptions) -> Vec<RunInvocation> {
    let mut plan = Vec::new();

    if options.baseline {
        plan.push(RunInvocation {
            experiment: ExperimentId::Baseline,
            args: options.default_args.clone(),
        });
    }

    let common = params.common_tokens();
    for slot in params.experiments.iter().filter(|slot| !slot.is_skipped()) {
        let mut args = common.clone();
        if options.default_args_policy == DefaultArgs::PrefixAll {
            args.extend(options.default_args.iter().cloned());
        }
        args.extend(slot.tokens());

        plan.push(RunInvocation {
            experiment: ExperimentId::Numbered(slot.id),
            args,
        });
    }

    plan
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::params::ParamsVariant;

    fn params() -> BenchParams {
        BenchParams::from_value(
            json!({
                "common_args": "hash-aggregate",
                "experiment_1_args": "ssb q1",
                "experiment_2_args": "skip",
                "experiment_3_args": "ssb q3",
                "experiment_4_args": "skip",
                "experiment_5_args": "skip",
            }),
            ParamsVariant::Args,
        )
        .unwrap()
    }

    #[test]
    fn skipped_slots_are_not_planned() {
        let plan = plan_invocations(&params(), &PlanOptions::default());

        assert_eq!(
            plan,
            vec![
                RunInvocation {
                    experiment: ExperimentId::Numbered(1),
                    args: vec!["hash-aggregate".into(), "ssb".into(), "q1".into()],
                },
                RunInvocation {
                    experiment: ExperimentId::Numbered(3),
                    args: vec!["hash-aggregate".into(), "ssb".into(), "q3".into()],
                },
            ]
        );
    }

    #[test]
    fn all_skipped_plans_nothing() {
        let mut params = params();
        params.experiments.iter_mut().for_each(|slot| {
            slot.arguments = crate::params::SlotArguments::Skip;
        });

        assert!(plan_invocations(&params, &PlanOptions::default()).is_empty());
    }

    #[test]
    fn baseline_runs_first_with_default_args_only() {
        let options = PlanOptions {
            baseline: true,
            default_args: vec!["--benchmark_repetitions=3".into()],
            default_args_policy: DefaultArgs::BaselineOnly,
        };
        let plan = plan_invocations(&params(), &options);

        assert_eq!(plan.len(), 3);
        assert_eq!(plan[0].experiment, ExperimentId::Baseline);
        assert_eq!(plan[0].args, vec!["--benchmark_repetitions=3"]);
        assert_eq!(plan[1].args, vec!["hash-aggregate", "ssb", "q1"]);
    }

    #[test]
    fn default_args_prefix_numbered_experiments() {
        let options = PlanOptions {
            baseline: false,
            default_args: vec!["--sf".into(), "1".into()],
            default_args_policy: DefaultArgs::PrefixAll,
        };
        let plan = plan_invocations(&params(), &options);

        assert_eq!(
            plan.iter().map(|i| i.experiment).collect::<Vec<_>>(),
            vec![ExperimentId::Numbered(1), ExperimentId::Numbered(3)]
        );
        assert_eq!(plan[1].args, vec!["hash-aggregate", "--sf", "1", "ssb", "q3"]);
    }

    #[test]
    fn without_common_args_only_slot_tokens_are_used() {
        let mut params = params();
        params.common_args = None;
        let plan = plan_invocations(&params, &PlanOptions::default());
        assert_eq!(plan[0].args, vec!["ssb", "q1"]);
    }
}
