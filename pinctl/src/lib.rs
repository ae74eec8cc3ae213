//! pinctl library
//!
//! Provides the command-line surface for:
//! - Rendering a pinning fragment from inline parameters or a layout file
//! - Printing the per-core plan
//! - Patching a libvirt domain file in place

pub mod cli;
pub mod config;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use cli::{exit_code, run, Cli, Commands, LayoutArgs};
pub use config::Config;

// =============================================================================
// Tracing Initialization
// =============================================================================

/// Filter used by `--verbose`
pub const VERBOSE_FILTER: &str = "pinctl=debug,cpupin=debug";

/// Initialize tracing/logging with the given filter level
///
/// Logs go to stderr; stdout carries rendered output only.
pub fn init_tracing(filter: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
