//! Tray configuration.

use std::time::Duration;

use crate::error::{Result, TrayError};
use crate::tray::Tray;

/// Default interval at which an idle presentation loop pumps native events.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Default name of the thread that runs the ready callback.
pub const DEFAULT_READY_THREAD_NAME: &str = "horizon-tray-ready";

/// Configuration for creating a [`Tray`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrayConfig {
    /// Name of the thread the ready callback runs on.
    pub ready_thread_name: String,
    /// How long the presentation loop waits for a command before pumping
    /// native events again.
    pub poll_interval: Duration,
    /// Title pushed to the presentation right after registration.
    pub title: Option<String>,
    /// Tooltip pushed to the presentation right after registration.
    pub tooltip: Option<String>,
}

impl Default for TrayConfig {
    fn default() -> Self {
        Self {
            ready_thread_name: DEFAULT_READY_THREAD_NAME.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            title: None,
            tooltip: None,
        }
    }
}

impl TrayConfig {
    /// Check that the configuration can be used to build a tray.
    ///
    /// # Errors
    ///
    /// Returns [`TrayError::InvalidConfig`] for a zero poll interval or a
    /// thread name that is blank or contains NUL.
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval.is_zero() {
            return Err(TrayError::InvalidConfig(
                "poll interval must be non-zero".to_string(),
            ));
        }
        if self.ready_thread_name.trim().is_empty() {
            return Err(TrayError::InvalidConfig(
                "ready thread name must not be empty".to_string(),
            ));
        }
        if self.ready_thread_name.contains('\0') {
            return Err(TrayError::InvalidConfig(
                "ready thread name must not contain NUL bytes".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for creating a [`Tray`] with custom configuration.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use horizon_tray_core::Tray;
///
/// let tray = Tray::builder()
///     .title("Sync")
///     .tooltip("Everything is up to date")
///     .poll_interval(Duration::from_millis(20))
///     .build()
///     .expect("valid configuration");
/// assert_eq!(tray.config().title.as_deref(), Some("Sync"));
/// ```
#[derive(Debug, Default)]
pub struct TrayBuilder {
    config: TrayConfig,
}

impl TrayBuilder {
    /// Create a builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the name of the ready callback thread.
    pub fn ready_thread_name(mut self, name: impl Into<String>) -> Self {
        self.config.ready_thread_name = name.into();
        self
    }

    /// Set the idle poll interval of the presentation loop.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    /// Set the initial tray title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.config.title = Some(title.into());
        self
    }

    /// Set the initial tray tooltip.
    pub fn tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.config.tooltip = Some(tooltip.into());
        self
    }

    /// Validate the configuration and create the tray.
    pub fn build(self) -> Result<Tray> {
        Tray::with_config(self.config)
    }
}
