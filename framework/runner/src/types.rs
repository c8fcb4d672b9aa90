/// Error type for the pipeline entry point and the binaries built on it. Library errors convert
/// into it with `?`.
pub type HustleBenchResult<T> = anyhow::Result<T>;
