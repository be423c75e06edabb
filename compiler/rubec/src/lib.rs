//! Rube developer CLI library.
//!
//! The binary is a thin argv dispatcher; the commands live here so they can
//! be tested against in-memory sources.

pub mod commands;

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install a tracing subscriber for the front-end crates.
///
/// Does nothing unless `RUST_LOG` is set, e.g. `RUST_LOG=rube_lexer=trace`
/// for every token with its scanner state, or `RUST_LOG=rube_parse=trace`
/// for scope open/close events.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_level(true)
                        .with_writer(std::io::stderr),
                )
                .with(filter)
                .init();
        }
    });
}
