#[macro_use]
extern crate log;

use clap::Parser as _;
use hustle_bench_runner::prelude::{init_logging, run, BenchParams, ParamsVariant};

use crate::cli::{CliArgs, HUSTLE_BENCH_PARAMS_ENV};

mod cli;

const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
const CRATE_VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() -> anyhow::Result<()> {
    init_logging();

    let args = CliArgs::parse();
    info!("Starting Automated Cloudlab Benchmark.");
    info!("{CRATE_NAME} {CRATE_VERSION}");

    info!("Loading parameters...");
    let params = load_params(&args)?;
    info!("Parameters loaded. Printing:");
    info!("{params:#?}");

    let summary = run(&args.runner_config(), &params)?;

    info!(
        "{} experiments run, {} failed, {} result rows",
        summary.outcomes.len(),
        summary.failed_count(),
        summary.total_rows()
    );

    Ok(())
}

/// Load the run parameters from the first source that was given.
fn load_params(args: &CliArgs) -> anyhow::Result<BenchParams> {
    let variant = ParamsVariant::from(args.variant);
    let params = match (&args.params_json, &args.params_file) {
        (Some(json), _) => {
            debug!("Reading parameters from the command line");
            BenchParams::from_json_str(json, variant)?
        }
        (None, Some(path)) => {
            debug!("Reading parameters from {}", path.display());
            BenchParams::from_file(path, variant)?
        }
        (None, None) => {
            debug!("Reading parameters from '{HUSTLE_BENCH_PARAMS_ENV}'");
            BenchParams::from_env(HUSTLE_BENCH_PARAMS_ENV, variant)?
        }
    };
    Ok(params)
}
