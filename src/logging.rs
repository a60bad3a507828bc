//! Structured logging setup.
//!
//! - `RUST_LOG` takes precedence when set (e.g. `RUST_LOG=pin_dispatch=trace`).
//! - Otherwise the level is `debug` when the debug toggle is on, `info` when it is off.
//! - `LOG_FORMAT=json` switches to JSON lines for log aggregation.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_FORMAT_VAR: &str = "LOG_FORMAT";

/// Install the global subscriber. Call once, from the binary.
pub fn init_logging(debug: bool) {
    let json = std::env::var(LOG_FORMAT_VAR)
        .map(|value| value.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(debug)));

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_target(true)
                    .flatten_event(true),
            )
            .init();
    } else {
        registry.with(fmt::layer().with_target(true)).init();
    }
}

fn default_directive(debug: bool) -> &'static str {
    if debug {
        "info,pin_dispatch=debug"
    } else {
        "info"
    }
}
