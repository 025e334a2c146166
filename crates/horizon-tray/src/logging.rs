//! Logging setup for applications using Horizon Tray.
//!
//! The tray crates only emit `tracing` events. Call [`init`] once at startup
//! to print them, or install your own subscriber instead.

use horizon_tray_core::{Result, TrayError};
use tracing_subscriber::EnvFilter;

pub use horizon_tray_core::logging::{
    MenuTreeDebug, TreeFormatOptions, TreeStyle, span_names, targets,
};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info";

/// Install a formatting subscriber filtered by `RUST_LOG`.
///
/// Falls back to [`DEFAULT_FILTER`] when `RUST_LOG` is unset or invalid.
///
/// # Errors
///
/// Returns [`TrayError::Logging`] if a global subscriber is already set.
pub fn init() -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    install(filter)
}

/// Install a formatting subscriber with an explicit filter directive.
///
/// ```no_run
/// horizon_tray::logging::init_with_filter("horizon_tray_core::dispatch=trace").unwrap();
/// ```
///
/// # Errors
///
/// Returns [`TrayError::Logging`] if the directive cannot be parsed or a
/// global subscriber is already set.
pub fn init_with_filter(directives: &str) -> Result<()> {
    let filter = EnvFilter::try_new(directives).map_err(|e| TrayError::Logging(e.to_string()))?;
    install(filter)
}

fn install(filter: EnvFilter) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| TrayError::Logging(e.to_string()))
}
