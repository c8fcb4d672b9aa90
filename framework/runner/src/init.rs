use std::io::Write as _;

/// Format of the timestamp at the start of every log line.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Initialise logging for the benchmark runner.
///
/// Logs at `info` unless `RUST_LOG` says otherwise. Each line is prefixed with the local time.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} | {:<5} | {}",
                chrono::Local::now().format(TIME_FORMAT),
                record.level(),
                record.args()
            )
        })
        .init();
}
