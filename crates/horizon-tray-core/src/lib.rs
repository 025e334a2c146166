//! Core systems for Horizon Tray.
//!
//! This crate provides the platform-independent half of a system tray icon
//! with a hierarchical menu:
//!
//! - **Identity**: Process-unique, monotonically increasing item ids
//! - **Registry**: Lookup from id to live item for click routing
//! - **Menu Items**: Thread-safe handles whose every change is mirrored to the
//!   presentation layer in order
//! - **Presentation Protocol**: The [`Presentation`] trait a native backend
//!   implements, plus an in-memory [`HeadlessPresentation`]
//! - **Lifecycle**: Register, ready and exactly-once quit
//! - **Dispatch**: Routing of native clicks back to item callbacks
//!
//! # Example
//!
//! ```
//! use horizon_tray_core::{HeadlessPresentation, Tray, with_checkable, with_on_clicked};
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! let tray = Tray::new();
//! let opened = Arc::new(AtomicUsize::new(0));
//!
//! let file = tray.add_menu_item("File", []);
//! let counter = opened.clone();
//! let open = file.add_sub_menu_item(
//!     "Open",
//!     [with_on_clicked(move || {
//!         counter.fetch_add(1, Ordering::SeqCst);
//!     })],
//! );
//! let paused = tray.add_menu_item("Paused", [with_checkable(false)]);
//! paused.check();
//!
//! let (presentation, handle) = HeadlessPresentation::new();
//! let runner = {
//!     let tray = tray.clone();
//!     std::thread::spawn(move || tray.run(presentation, || {}, || {}))
//! };
//!
//! while !handle.click(open.id()) {
//!     std::thread::yield_now();
//! }
//! assert_eq!(opened.load(Ordering::SeqCst), 1);
//!
//! tray.quit();
//! runner.join().unwrap().unwrap();
//! ```

mod command;
mod config;
mod dispatch;
mod error;
mod id;
mod item;
mod lifecycle;
pub mod logging;
mod options;
pub mod presentation;
mod registry;
mod tray;

pub use command::{ExitCallback, PresentationCommand};
pub use config::{DEFAULT_POLL_INTERVAL, DEFAULT_READY_THREAD_NAME, TrayBuilder, TrayConfig};
pub use dispatch::SelectionSink;
pub use error::{Result, TrayError};
pub use id::{IdAllocator, MenuItemId};
pub use item::{ClickHandler, ItemSnapshot, MenuItem};
pub use lifecycle::LifecycleState;
pub use logging::{MenuTreeDebug, TreeFormatOptions, TreeStyle};
pub use options::{
    MenuItemBuilder, MenuItemOption, with_checkable, with_disabled, with_on_clicked, with_parent,
    with_parent_id, with_tooltip,
};
pub use presentation::{
    HeadlessEntry, HeadlessHandle, HeadlessPresentation, Presentation, ReadySignal, TrayIconData,
};
pub use registry::MenuRegistry;
pub use tray::Tray;
