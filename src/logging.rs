//! Logging setup shared by the binaries
//!
//! `RUST_LOG` wins over the configured level. The `json` format emits one
//! object per line, anything else falls back to the human-readable output.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Install the global subscriber. `targets` lists extra filter directives,
/// e.g. `tower_http=debug` for the relay.
pub fn init(config: &LoggingConfig, targets: &[&str]) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(config, targets));

    let registry = tracing_subscriber::registry().with(filter);

    if config.format.eq_ignore_ascii_case("json") {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn default_filter(config: &LoggingConfig, targets: &[&str]) -> EnvFilter {
    let mut directives = vec![
        format!("railchat={}", config.level),
        format!("railchat_core={}", config.level),
    ];
    directives.extend(targets.iter().map(|t| t.to_string()));
    EnvFilter::new(directives.join(","))
}
