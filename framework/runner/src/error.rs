use std::path::PathBuf;

/// The run parameters could not be loaded.
///
/// This is always fatal and is raised before any benchmark process is started.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read parameters: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parameters are not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Parameters must be a JSON object")]
    NotAnObject,
    #[error("Missing required parameter '{0}'")]
    MissingKey(String),
    #[error("Parameter '{0}' must be a string")]
    NotAString(String),
    #[error("Environment variable '{0}' is not set or is not valid unicode")]
    MissingEnv(String),
    #[error("Benchmark executable not found: {0}")]
    BenchmarkNotFound(String),
}

/// A benchmark process could not be started.
///
/// This only affects the experiment being launched, later experiments still run.
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("Failed to start '{path}': {source}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The report could not be written.
///
/// A failed write can leave a partial file behind.
#[derive(Debug, thiserror::Error)]
pub enum ReportWriteError {
    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to write report record: {0}")]
    Csv(#[from] csv::Error),
}
