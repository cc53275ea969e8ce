//! Tracing subscriber setup.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{ClientConfig, LogFormat};

/// Installs the global subscriber.
///
/// `RUST_LOG` wins over the configured filter. Safe to call more than once;
/// later calls are ignored.
pub fn init_tracing(config: &ClientConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let builder = fmt().with_env_filter(env_filter).with_writer(std::io::stderr);

    let _ = match config.log_format {
        LogFormat::Pretty => builder.with_target(false).compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
