use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{ConfigError, LaunchError};
use crate::invocation::CapturedOutput;

/// Environment variable to override the path to the benchmark executable.
pub const HUSTLE_BENCHMARK_PATH_ENV: &str = "HUSTLE_BENCHMARK_PATH";

/// Where the benchmark executable lives in a release build of the repository.
pub const DEFAULT_BENCHMARK_PATH: &str = "build_release/src/benchmark/hustle_src_benchmark_main";

/// Something that can run the benchmark with a list of arguments.
pub trait Launcher {
    /// The executable that is run, used when recording the command line.
    fn program(&self) -> &Path;

    /// Run the benchmark to completion and capture its output.
    ///
    /// A non-zero exit code is not an error, it is reported in the [CapturedOutput].
    fn launch(&self, args: &[String]) -> Result<CapturedOutput, LaunchError>;
}

/// Find the benchmark executable.
///
/// A bare name such as `hustle_src_benchmark_main` is looked up in the user's `PATH`. Anything
/// else is treated as a path which must exist. The result is made absolute so that the
/// executable can be started from its own directory.
pub fn resolve_benchmark_path(path: &Path) -> Result<PathBuf, ConfigError> {
    if path.as_os_str().is_empty() {
        return Err(ConfigError::BenchmarkNotFound(
            "path to benchmark executable is empty".to_string(),
        ));
    }

    let is_bare_name = path.parent().is_some_and(|p| p.as_os_str().is_empty());
    if is_bare_name {
        log::warn!(
            "'{}' is not a path so looking in user's 'PATH'",
            path.display()
        );
        return which::which(path).map_err(|e| {
            ConfigError::BenchmarkNotFound(format!(
                "'{}' not found in PATH: {e}. Set '{HUSTLE_BENCHMARK_PATH_ENV}' to the correct path.",
                path.display()
            ))
        });
    }

    std::fs::canonicalize(path).map_err(|e| {
        ConfigError::BenchmarkNotFound(format!("'{}' does not exist: {e}", path.display()))
    })
}

/// The benchmark executable, started as a child process.
///
/// The process runs in the directory that contains the executable because the benchmark finds
/// its data files relative to that directory. Arguments are passed directly, never through a
/// shell.
#[derive(Debug, Clone)]
pub struct BenchmarkBinary {
    path: PathBuf,
    working_dir: PathBuf,
}

impl BenchmarkBinary {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let working_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self { path, working_dir }
    }

    /// Resolve the executable with [resolve_benchmark_path] and wrap it.
    pub fn locate(path: &Path) -> Result<Self, ConfigError> {
        resolve_benchmark_path(path).map(Self::new)
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }
}

impl Launcher for BenchmarkBinary {
    fn program(&self) -> &Path {
        &self.path
    }

    fn launch(&self, args: &[String]) -> Result<CapturedOutput, LaunchError> {
        let output = Command::new(&self.path)
            .args(args)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| LaunchError::Spawn {
                path: self.path.clone(),
                source,
            })?;

        Ok(CapturedOutput {
            text: merge_output(&output.stdout, &output.stderr),
            exit_code: output.status.code(),
        })
    }
}

/// Join the captured streams, stdout first.
///
/// Stderr always starts on a line of its own so an unterminated last line of stdout stays intact.
fn merge_output(stdout: &[u8], stderr: &[u8]) -> String {
    let mut text = String::from_utf8_lossy(stdout).into_owned();
    if !stderr.is_empty() && !text.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }
    text.push_str(&String::from_utf8_lossy(stderr));
    text
}
