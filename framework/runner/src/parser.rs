use hustle_bench_model::{ExperimentId, ResultRow};

/// The result table starts after a line containing this rule.
pub const SEPARATOR_RULE: &str = "------";

/// Number of whitespace separated tokens on a result line:
/// `<query> <time> ns <cpu time> ns <iterations>`.
const RESULT_LINE_TOKENS: usize = 6;

/// Which lines of the benchmark output are considered when looking for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// Only lines after the first separator rule.
    #[default]
    Gated,
    /// Every line.
    Ungated,
}

/// Extracts [ResultRow]s from the console output of the benchmark.
///
/// A result line looks like
///
/// ```text
/// query11      41149293 ns      2607978 ns          100
/// ```
///
/// Anything that does not split into exactly six tokens with `query` in the first one is ignored.
/// This includes the banner, warnings and error messages.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultParser {
    mode: ParseMode,
}

impl ResultParser {
    pub fn new(mode: ParseMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> ParseMode {
        self.mode
    }

    /// Parse the output of one benchmark run, keeping the order of the lines.
    pub fn parse(&self, experiment: ExperimentId, output: &str) -> Vec<ResultRow> {
        let mut gate_open = self.mode == ParseMode::Ungated;
        let mut rows = Vec::new();

        for line in output.lines() {
            if !gate_open {
                gate_open = line.contains(SEPARATOR_RULE);
                continue;
            }

            match parse_result_line(experiment, line) {
                Some(row) => rows.push(row),
                None => log::trace!("Ignoring output line: {line}"),
            }
        }

        rows
    }
}

fn parse_result_line(experiment: ExperimentId, line: &str) -> Option<ResultRow> {
    let tokens = line.split_whitespace().collect::<Vec<_>>();
    if tokens.len() != RESULT_LINE_TOKENS || !tokens[0].contains("query") {
        return None;
    }

    Some(ResultRow::new(experiment, tokens[0], tokens[1], tokens[3], tokens[5]))
}
