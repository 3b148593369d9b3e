use crate::args::LogLevel;

/// Diagnostics go to stderr; `RUST_LOG` takes precedence over `--log-level`.
pub fn init(level: LogLevel) {
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(level.as_filter()),
    )
    .target(env_logger::Target::Stderr)
    .format_timestamp(None)
    .try_init();
}
