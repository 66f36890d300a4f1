//! Console logging for the daemon.
//!
//! Events are filtered through `RUST_LOG` (default `info`). Allocator
//! lifecycle events (initialize, load, rollover) come from `chronopool`'s
//! `tracing` feature; per-claim events are emitted at `debug`.

use anyhow::Context;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub fn init_telemetry() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_thread_ids(true)
                .with_line_number(true)
                .with_target(false)
                .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
                .with_file(true),
        )
        .try_init()
        .context("failed to install the tracing subscriber")
}
