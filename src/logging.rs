// SPDX-License-Identifier: MIT

//! Diagnostic logging.
//!
//! Configure via the `RUST_LOG` environment variable:
//! - `RUST_LOG=debug` - every buffer mutation and search
//! - `RUST_LOG=n_bytes::search=debug` - module-level filtering
//!
//! Without `RUST_LOG` only warnings are shown. Output goes to stderr so
//! command results on stdout stay clean for piping.

use std::io;

use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let stderr_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_filter(filter);

    tracing_subscriber::registry().with(stderr_layer).init();
}
