//! The native presentation surface.
//!
//! Drawing the tray icon and its menu is the job of a per-platform backend
//! implementing [`Presentation`]. The core only ever calls a backend from the
//! thread running [`Tray::run_loop`](crate::Tray::run_loop), so backends may
//! hold thread-affine native handles and need not be `Send`.
//!
//! [`HeadlessPresentation`] is a backend without any native surface. It keeps
//! an in-memory mirror of what a native layer would display, which makes it
//! useful for tests and for hosts running without a desktop session.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender, bounded};
use parking_lot::Mutex;

use crate::dispatch::SelectionSink;
use crate::error::{Result, TrayError};
use crate::id::MenuItemId;
use crate::item::ItemSnapshot;
use crate::logging::targets;

/// Single-use token a presentation fires once it has finished registering.
///
/// The tray's ready callback runs only after [`signal`](ReadySignal::signal).
/// Dropping the token without signalling means registration never completed
/// and the ready callback never runs.
pub struct ReadySignal {
    sender: Sender<()>,
}

impl ReadySignal {
    pub(crate) fn pair() -> (Self, Receiver<()>) {
        let (sender, receiver) = bounded(1);
        (Self { sender }, receiver)
    }

    /// Report that native registration has completed.
    pub fn signal(self) {
        // The waiting side may already be gone if the tray was dropped.
        let _ = self.sender.send(());
    }
}

impl fmt::Debug for ReadySignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadySignal").finish_non_exhaustive()
    }
}

/// Raw RGBA pixels for the tray icon.
///
/// The data is passed through to the backend untouched; no image formats are
/// decoded here.
#[derive(Clone, PartialEq, Eq)]
pub struct TrayIconData {
    rgba: Vec<u8>,
    width: u32,
    height: u32,
}

impl TrayIconData {
    /// Wrap RGBA pixel data (4 bytes per pixel).
    ///
    /// # Errors
    ///
    /// Returns [`TrayError::InvalidIcon`] if the data length does not match
    /// `width * height * 4`, or if either dimension is zero.
    pub fn from_rgba(rgba: Vec<u8>, width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(TrayError::InvalidIcon(format!(
                "dimensions must be non-zero, got {width}x{height}"
            )));
        }
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(TrayError::InvalidIcon(format!(
                "expected {expected} bytes for {width}x{height}, got {}",
                rgba.len()
            )));
        }
        Ok(Self {
            rgba,
            width,
            height,
        })
    }

    /// The raw pixel bytes.
    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }
}

impl fmt::Debug for TrayIconData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrayIconData")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

/// A native presentation backend.
///
/// All methods are invoked on the presentation loop's thread, in the order
/// the corresponding commands were queued for any single item. Snapshot
/// pushes are full state and may repeat unchanged state; implementations
/// must tolerate redundant pushes.
pub trait Presentation {
    /// Begin native initialization.
    ///
    /// Must eventually call [`ReadySignal::signal`] exactly once if
    /// registration succeeds. `selection` reports user clicks back into the
    /// tray and may be cloned and moved to other threads.
    fn register(&mut self, ready: ReadySignal, selection: SelectionSink);

    /// Upsert an item's full visual state.
    fn push_item_snapshot(&mut self, snapshot: &ItemSnapshot);

    /// Show or hide an item.
    fn push_visibility(&mut self, id: MenuItemId, visible: bool);

    /// Create a non-interactive divider at the slot reserved by `id`.
    fn push_separator(&mut self, id: MenuItemId, parent: Option<MenuItemId>);

    /// Set the text shown next to the tray icon, where supported.
    fn set_tray_title(&mut self, _title: &str) {}

    /// Set the tray icon's hover text, where supported.
    fn set_tray_tooltip(&mut self, _tooltip: &str) {}

    /// Replace the tray icon image.
    fn set_tray_icon(&mut self, _icon: &TrayIconData) {}

    /// Process pending native events.
    ///
    /// Called by the loop after every command and at least once per poll
    /// interval while idle.
    fn pump(&mut self) {}

    /// Release the tray icon and all native resources.
    fn teardown(&mut self);
}

impl<P: Presentation + ?Sized> Presentation for Box<P> {
    fn register(&mut self, ready: ReadySignal, selection: SelectionSink) {
        (**self).register(ready, selection);
    }

    fn push_item_snapshot(&mut self, snapshot: &ItemSnapshot) {
        (**self).push_item_snapshot(snapshot);
    }

    fn push_visibility(&mut self, id: MenuItemId, visible: bool) {
        (**self).push_visibility(id, visible);
    }

    fn push_separator(&mut self, id: MenuItemId, parent: Option<MenuItemId>) {
        (**self).push_separator(id, parent);
    }

    fn set_tray_title(&mut self, title: &str) {
        (**self).set_tray_title(title);
    }

    fn set_tray_tooltip(&mut self, tooltip: &str) {
        (**self).set_tray_tooltip(tooltip);
    }

    fn set_tray_icon(&mut self, icon: &TrayIconData) {
        (**self).set_tray_icon(icon);
    }

    fn pump(&mut self) {
        (**self).pump();
    }

    fn teardown(&mut self) {
        (**self).teardown();
    }
}

// ============================================================================
// Headless Presentation
// ============================================================================

/// One row of the headless menu mirror.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeadlessEntry {
    /// A regular item with its latest snapshot.
    Item(ItemSnapshot),
    /// A divider.
    Separator {
        /// The identifier consumed by the separator.
        id: MenuItemId,
        /// The submenu holding the separator, if any.
        parent: Option<MenuItemId>,
    },
}

impl HeadlessEntry {
    /// The identifier of this row.
    pub fn id(&self) -> MenuItemId {
        match self {
            Self::Item(snapshot) => snapshot.id,
            Self::Separator { id, .. } => *id,
        }
    }
}

#[derive(Default)]
struct HeadlessModel {
    registered: bool,
    torn_down: bool,
    title: String,
    tooltip: String,
    icon: Option<TrayIconData>,
    entries: Vec<HeadlessEntry>,
    hidden: HashSet<MenuItemId>,
    history: Vec<ItemSnapshot>,
    selection: Option<SelectionSink>,
}

/// A presentation backend with no native surface.
///
/// Registration completes immediately. The state it would have displayed is
/// observable through the paired [`HeadlessHandle`].
///
/// # Example
///
/// ```
/// use horizon_tray_core::{HeadlessPresentation, Tray};
///
/// let tray = Tray::new();
/// let (presentation, handle) = HeadlessPresentation::new();
///
/// let runner = {
///     let tray = tray.clone();
///     std::thread::spawn(move || tray.run(presentation, || {}, || {}))
/// };
///
/// let item = tray.add_menu_item("Status", []);
/// tray.quit();
/// runner.join().unwrap().unwrap();
///
/// assert_eq!(handle.item(item.id()).unwrap().title, "Status");
/// assert!(handle.is_torn_down());
/// ```
pub struct HeadlessPresentation {
    model: Arc<Mutex<HeadlessModel>>,
}

impl HeadlessPresentation {
    /// Create a headless backend and a handle for inspecting it.
    pub fn new() -> (Self, HeadlessHandle) {
        let model = Arc::new(Mutex::new(HeadlessModel::default()));
        (
            Self {
                model: model.clone(),
            },
            HeadlessHandle { model },
        )
    }
}

impl fmt::Debug for HeadlessPresentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let model = self.model.lock();
        f.debug_struct("HeadlessPresentation")
            .field("registered", &model.registered)
            .field("entries", &model.entries.len())
            .finish()
    }
}

impl Presentation for HeadlessPresentation {
    fn register(&mut self, ready: ReadySignal, selection: SelectionSink) {
        tracing::debug!(target: targets::PRESENTATION, "headless presentation registered");
        {
            let mut model = self.model.lock();
            model.registered = true;
            model.selection = Some(selection);
        }
        ready.signal();
    }

    fn push_item_snapshot(&mut self, snapshot: &ItemSnapshot) {
        let mut model = self.model.lock();
        model.history.push(snapshot.clone());

        let entry = HeadlessEntry::Item(snapshot.clone());
        match model.entries.iter().position(|e| e.id() == snapshot.id) {
            Some(index) => model.entries[index] = entry,
            None => model.entries.push(entry),
        }
    }

    fn push_visibility(&mut self, id: MenuItemId, visible: bool) {
        let mut model = self.model.lock();
        if visible {
            model.hidden.remove(&id);
        } else {
            model.hidden.insert(id);
        }
    }

    fn push_separator(&mut self, id: MenuItemId, parent: Option<MenuItemId>) {
        self.model
            .lock()
            .entries
            .push(HeadlessEntry::Separator { id, parent });
    }

    fn set_tray_title(&mut self, title: &str) {
        self.model.lock().title = title.to_string();
    }

    fn set_tray_tooltip(&mut self, tooltip: &str) {
        self.model.lock().tooltip = tooltip.to_string();
    }

    fn set_tray_icon(&mut self, icon: &TrayIconData) {
        self.model.lock().icon = Some(icon.clone());
    }

    fn teardown(&mut self) {
        tracing::debug!(target: targets::PRESENTATION, "headless presentation torn down");
        let mut model = self.model.lock();
        model.torn_down = true;
        model.selection = None;
    }
}

/// Inspection handle for a [`HeadlessPresentation`].
///
/// Cloneable and usable from any thread.
#[derive(Clone)]
pub struct HeadlessHandle {
    model: Arc<Mutex<HeadlessModel>>,
}

impl HeadlessHandle {
    /// Check whether registration has completed.
    pub fn is_registered(&self) -> bool {
        self.model.lock().registered
    }

    /// Check whether teardown has run.
    pub fn is_torn_down(&self) -> bool {
        self.model.lock().torn_down
    }

    /// The tray title last pushed.
    pub fn title(&self) -> String {
        self.model.lock().title.clone()
    }

    /// The tray tooltip last pushed.
    pub fn tooltip(&self) -> String {
        self.model.lock().tooltip.clone()
    }

    /// The tray icon last pushed.
    pub fn icon(&self) -> Option<TrayIconData> {
        self.model.lock().icon.clone()
    }

    /// All rows in creation order.
    pub fn entries(&self) -> Vec<HeadlessEntry> {
        self.model.lock().entries.clone()
    }

    /// The latest snapshot of an item, if it has been pushed.
    pub fn item(&self, id: MenuItemId) -> Option<ItemSnapshot> {
        self.model.lock().entries.iter().find_map(|entry| match entry {
            HeadlessEntry::Item(snapshot) if snapshot.id == id => Some(snapshot.clone()),
            _ => None,
        })
    }

    /// Check whether a row is currently shown.
    pub fn is_visible(&self, id: MenuItemId) -> bool {
        let model = self.model.lock();
        model.entries.iter().any(|entry| entry.id() == id) && !model.hidden.contains(&id)
    }

    /// Every snapshot pushed for an item, oldest first.
    pub fn history(&self, id: MenuItemId) -> Vec<ItemSnapshot> {
        self.model
            .lock()
            .history
            .iter()
            .filter(|snapshot| snapshot.id == id)
            .cloned()
            .collect()
    }

    /// Total number of snapshot pushes received.
    pub fn snapshot_count(&self) -> usize {
        self.model.lock().history.len()
    }

    /// Simulate the user clicking a row.
    ///
    /// The click handler runs on the calling thread. Returns `false` if the
    /// presentation is not registered or has been torn down.
    pub fn click(&self, id: MenuItemId) -> bool {
        let selection = self.model.lock().selection.clone();
        match selection {
            Some(selection) => {
                selection.notify_selection(id);
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for HeadlessHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let model = self.model.lock();
        f.debug_struct("HeadlessHandle")
            .field("registered", &model.registered)
            .field("torn_down", &model.torn_down)
            .field("entries", &model.entries.len())
            .finish()
    }
}
