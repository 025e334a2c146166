//! Menu items and their mutators.
//!
//! A [`MenuItem`] is a cheap, cloneable handle to one row of the tray menu.
//! Every mutator updates the in-memory state, re-registers the item and
//! pushes a full [`ItemSnapshot`] to the presentation loop. The protocol is
//! "push state", not "push diff": calling [`MenuItem::enable`] on an enabled
//! item still produces a push.
//!
//! # Concurrency
//!
//! Mutators may be called from any thread. Each item has its own short
//! critical section covering "write field, capture snapshot, enqueue", so a
//! later mutation's snapshot is never queued ahead of an earlier one for the
//! same item. Two threads racing on the same field resolve as last write
//! wins; different fields are not updated transactionally.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::command::PresentationCommand;
use crate::id::MenuItemId;
use crate::logging::targets;
use crate::options::MenuItemOption;
use crate::tray::TrayShared;

/// Callback invoked when a menu item is clicked.
pub type ClickHandler = Arc<dyn Fn() + Send + Sync + 'static>;

/// The full visual state of a menu item as pushed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemSnapshot {
    /// The item's identifier.
    pub id: MenuItemId,
    /// Display text.
    pub title: String,
    /// Hover text.
    pub tooltip: String,
    /// Whether the item is grayed out.
    pub disabled: bool,
    /// Whether the check indicator is set.
    pub checked: bool,
    /// Whether the item renders a check indicator at all.
    pub checkable: bool,
    /// The submenu this item belongs to, if any.
    pub parent: Option<MenuItemId>,
}

/// Mutable fields of a menu item.
#[derive(Debug, Clone, Default)]
pub(crate) struct ItemState {
    pub title: String,
    pub tooltip: String,
    pub disabled: bool,
    pub checked: bool,
    pub checkable: bool,
    pub parent: Option<MenuItemId>,
}

impl ItemState {
    fn snapshot(&self, id: MenuItemId) -> ItemSnapshot {
        ItemSnapshot {
            id,
            title: self.title.clone(),
            tooltip: self.tooltip.clone(),
            disabled: self.disabled,
            checked: self.checked,
            checkable: self.checkable,
            parent: self.parent,
        }
    }
}

/// Shared item state stored in the registry.
pub(crate) struct ItemNode {
    id: MenuItemId,
    state: Mutex<ItemState>,
    visible: AtomicBool,
    on_clicked: Option<ClickHandler>,
}

impl ItemNode {
    pub(crate) fn new(id: MenuItemId, state: ItemState, on_clicked: Option<ClickHandler>) -> Self {
        Self {
            id,
            state: Mutex::new(state),
            visible: AtomicBool::new(true),
            on_clicked,
        }
    }

    pub(crate) fn id(&self) -> MenuItemId {
        self.id
    }

    pub(crate) fn snapshot(&self) -> ItemSnapshot {
        self.state.lock().snapshot(self.id)
    }

    pub(crate) fn is_visible(&self) -> bool {
        self.visible.load(Ordering::Acquire)
    }

    pub(crate) fn on_clicked(&self) -> Option<&ClickHandler> {
        self.on_clicked.as_ref()
    }
}

/// A handle to one entry of the tray menu.
///
/// Created with [`Tray::add_menu_item`](crate::Tray::add_menu_item) or
/// [`Tray::menu_item`](crate::Tray::menu_item). Clones refer to the same item.
#[derive(Clone)]
pub struct MenuItem {
    node: Arc<ItemNode>,
    shared: Arc<TrayShared>,
}

impl MenuItem {
    /// Allocate, configure, register and push a new item.
    pub(crate) fn create(
        shared: &Arc<TrayShared>,
        title: String,
        options: impl IntoIterator<Item = MenuItemOption>,
    ) -> Self {
        let id = shared.ids.next();
        let mut state = ItemState {
            title,
            ..ItemState::default()
        };
        let mut on_clicked = None;
        for option in options {
            option.apply(&mut state, &mut on_clicked);
        }

        let item = Self {
            node: Arc::new(ItemNode::new(id, state, on_clicked)),
            shared: shared.clone(),
        };
        tracing::debug!(target: targets::MENU, item = %item, "menu item created");
        item.update(|_| {});
        item
    }

    /// Rebuild a handle for a node found in the registry.
    pub(crate) fn from_node(node: Arc<ItemNode>, shared: Arc<TrayShared>) -> Self {
        Self { node, shared }
    }

    /// Get this item's identifier.
    pub fn id(&self) -> MenuItemId {
        self.node.id
    }

    /// Get the display text.
    pub fn title(&self) -> String {
        self.node.state.lock().title.clone()
    }

    /// Get the hover text.
    pub fn tooltip(&self) -> String {
        self.node.state.lock().tooltip.clone()
    }

    /// Check whether the item is disabled.
    pub fn is_disabled(&self) -> bool {
        self.node.state.lock().disabled
    }

    /// Check whether the item has a check mark.
    pub fn is_checked(&self) -> bool {
        self.node.state.lock().checked
    }

    /// Check whether the item renders a check indicator.
    pub fn is_checkable(&self) -> bool {
        self.node.state.lock().checkable
    }

    /// The parent item's identifier, if this item lives in a submenu.
    pub fn parent(&self) -> Option<MenuItemId> {
        self.node.state.lock().parent
    }

    /// Check whether the item was last shown rather than hidden.
    pub fn is_visible(&self) -> bool {
        self.node.is_visible()
    }

    /// Check whether a click handler is attached.
    pub fn has_click_handler(&self) -> bool {
        self.node.on_clicked.is_some()
    }

    /// Capture the item's current full state.
    pub fn snapshot(&self) -> ItemSnapshot {
        self.node.snapshot()
    }

    /// Set the display text.
    pub fn set_title(&self, title: impl Into<String>) {
        let title = title.into();
        self.update(move |state| state.title = title);
    }

    /// Set the hover text.
    pub fn set_tooltip(&self, tooltip: impl Into<String>) {
        let tooltip = tooltip.into();
        self.update(move |state| state.tooltip = tooltip);
    }

    /// Enable the item regardless of its previous state.
    pub fn enable(&self) {
        self.update(|state| state.disabled = false);
    }

    /// Disable the item regardless of its previous state.
    pub fn disable(&self) {
        self.update(|state| state.disabled = true);
    }

    /// Set the check mark regardless of its previous state.
    pub fn check(&self) {
        self.update(|state| state.checked = true);
    }

    /// Clear the check mark regardless of its previous state.
    pub fn uncheck(&self) {
        self.update(|state| state.checked = false);
    }

    /// Show a previously hidden item.
    pub fn show(&self) {
        self.set_visible(true);
    }

    /// Hide the item. Its state stays queryable and can still be mutated.
    pub fn hide(&self) {
        self.set_visible(false);
    }

    /// Add a child item nested under this one.
    ///
    /// The parent option is applied first, so an explicit parent among
    /// `options` takes precedence.
    pub fn add_sub_menu_item(
        &self,
        title: impl Into<String>,
        options: impl IntoIterator<Item = MenuItemOption>,
    ) -> MenuItem {
        let options = std::iter::once(MenuItemOption::Parent(self.id())).chain(options);
        MenuItem::create(&self.shared, title.into(), options)
    }

    /// Apply a field update and push the resulting snapshot.
    fn update(&self, apply: impl FnOnce(&mut ItemState)) {
        self.shared.registry.upsert(&self.node);

        let mut state = self.node.state.lock();
        apply(&mut state);
        let snapshot = state.snapshot(self.node.id);
        self.shared.commands.send(PresentationCommand::Snapshot(snapshot));
    }

    fn set_visible(&self, visible: bool) {
        // Held so the directive is ordered with this item's snapshots.
        let _state = self.node.state.lock();
        self.node.visible.store(visible, Ordering::Release);
        self.shared.commands.send(PresentationCommand::Visibility {
            id: self.node.id,
            visible,
        });
    }
}

impl fmt::Display for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.node.state.lock();
        match state.parent {
            None => write!(f, "MenuItem[{}, {:?}]", self.node.id, state.title),
            Some(parent) => write!(
                f,
                "MenuItem[{}, parent {}, {:?}]",
                self.node.id, parent, state.title
            ),
        }
    }
}

impl fmt::Debug for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuItem")
            .field("snapshot", &self.snapshot())
            .field("visible", &self.is_visible())
            .field("has_click_handler", &self.has_click_handler())
            .finish()
    }
}

impl PartialEq for MenuItem {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }
}

impl Eq for MenuItem {}

static_assertions::assert_impl_all!(MenuItem: Send, Sync);
