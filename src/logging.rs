use std::sync::Once;

use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Installs the stdout subscriber. `RUST_LOG` wins over `LOG_LEVEL` when set.
pub fn init(level: &str) {
    INIT.call_once(|| {
        fmt()
            .with_env_filter(build_filter(level))
            .with_writer(std::io::stdout)
            .with_target(false)
            .init();
    });
}

fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback_directive(level)))
}

/// Our own events follow `level`; dependencies stay at info.
fn fallback_directive(level: &str) -> String {
    format!("parquet_converter={},info", parse_level(level))
}

fn parse_level(level: &str) -> &'static str {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "warn" | "warning" => "warn",
        "error" => "error",
        "off" => "off",
        _ => "info",
    }
}
