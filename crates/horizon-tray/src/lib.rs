//! Horizon Tray: a system tray icon with a hierarchical menu.
//!
//! This crate re-exports the platform-independent core from
//! [`horizon_tray_core`] and adds:
//!
//! - [`logging`]: a ready-made `tracing` subscriber
//! - `native` (feature `native`, Windows and macOS): a real tray icon built on
//!   `tray-icon` and `winit`
//!
//! # Example
//!
//! ```no_run
//! use horizon_tray::{HeadlessPresentation, Tray, with_checkable, with_on_clicked};
//!
//! fn main() -> horizon_tray::Result<()> {
//!     horizon_tray::logging::init()?;
//!
//!     let tray = Tray::builder().title("Sync").tooltip("Sync client").build()?;
//!     let paused = tray.add_menu_item("Paused", [with_checkable(false)]);
//!     let toggle = paused.clone();
//!
//!     let quitter = tray.clone();
//!     tray.add_separator();
//!     tray.add_menu_item("Quit", [with_on_clicked(move || quitter.quit())]);
//!
//!     let (presentation, _handle) = HeadlessPresentation::new();
//!     tray.run(presentation, move || toggle.check(), || println!("exiting"))
//! }
//! ```

pub mod logging;
#[cfg(all(feature = "native", any(target_os = "windows", target_os = "macos")))]
pub mod native;

pub use horizon_tray_core::presentation;
pub use horizon_tray_core::{
    ClickHandler, DEFAULT_POLL_INTERVAL, DEFAULT_READY_THREAD_NAME, ExitCallback, HeadlessEntry,
    HeadlessHandle, HeadlessPresentation, IdAllocator, ItemSnapshot, LifecycleState, MenuItem,
    MenuItemBuilder, MenuItemId, MenuItemOption, MenuRegistry, Presentation, ReadySignal, Result,
    SelectionSink, Tray, TrayBuilder, TrayConfig, TrayError, TrayIconData, with_checkable,
    with_disabled, with_on_clicked, with_parent, with_parent_id, with_tooltip,
};
