//! Log output setup.
//!
//! Development logs are pretty-printed with source locations, production logs
//! are flattened JSON lines. `RUST_LOG` overrides the default filter in both.

use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Environment;

const DEVELOPMENT_FILTER: &str = "debug,tower_http=debug,sqlx=warn,aws_config=info,aws_smithy_runtime=info";
const PRODUCTION_FILTER: &str = "info,tower_http=info,sqlx=warn,aws_config=warn,aws_smithy_runtime=warn";

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Install the global subscriber. Call once, before anything logs.
pub fn init_tracing(env: Environment) {
    let layer = if env.is_development() {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_line_number(true)
            .with_file(true)
            .pretty()
            .with_filter(env_filter(DEVELOPMENT_FILTER))
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .flatten_event(true)
            .with_target(true)
            .with_filter(env_filter(PRODUCTION_FILTER))
            .boxed()
    };

    tracing_subscriber::registry().with(layer).init();
    tracing::info!(environment = ?env, "tracing initialized");
}
