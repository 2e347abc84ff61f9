//! Tracing setup for the `rshb` binary.
//!
//! The output format is chosen by `RSHELL_LOG_FORMAT`:
//!
//! - `text` (default): flat `tracing-subscriber` lines
//! - `json`: one JSON object per event
//!
//! ```bash
//! RSHELL_LOG=debug rshb resolve Get-Item -fo
//! RSHELL_LOG="rshell_params=trace" RSHELL_LOG_FORMAT=json rshb sets Get-Item
//! ```
//!
//! Nothing is installed unless `RSHELL_LOG`, `RUST_LOG` or the `logFilter`
//! option is set.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter, Registry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    fn from_env() -> Self {
        match std::env::var("RSHELL_LOG_FORMAT")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// `RSHELL_LOG` wins over `RUST_LOG`, which wins over the configured filter.
fn build_filter(configured: Option<&str>) -> Option<EnvFilter> {
    if let Ok(value) = std::env::var("RSHELL_LOG") {
        return Some(EnvFilter::builder().parse_lossy(value));
    }
    if std::env::var("RUST_LOG").is_ok() {
        return Some(EnvFilter::from_default_env());
    }
    configured.map(|value| EnvFilter::builder().parse_lossy(value))
}

/// Install the global subscriber. Output goes to stderr so command output
/// on stdout stays clean.
pub fn init_tracing(configured: Option<&str>) {
    let Some(filter) = build_filter(configured) else {
        return;
    };

    match LogFormat::from_env() {
        LogFormat::Json => {
            let json_layer = fmt::layer().json().with_writer(std::io::stderr);
            Registry::default().with(filter).with(json_layer).init();
        }
        LogFormat::Text => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}
