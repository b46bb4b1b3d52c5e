//! Logging infrastructure
//!
//! Tracing subscriber setup plus the JSONL usage log.

pub mod usage;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use usage::{EventType, UsageEvent, UsageLogger};

/// Install the global tracing subscriber
///
/// `RUST_LOG` wins when set; otherwise `levelup_edge=<level>,info`.
pub fn init_tracing(log_level: &str, json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("levelup_edge={},info", log_level).into());

    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
