//! Configuration options for new menu items.
//!
//! Options are applied in the order given to a freshly constructed item, so
//! a later option of the same kind overwrites an earlier one.
//!
//! # Example
//!
//! ```
//! use horizon_tray_core::{Tray, with_checkable, with_tooltip};
//!
//! let tray = Tray::new();
//! let paused = tray.add_menu_item(
//!     "Paused",
//!     [with_tooltip("Stop syncing"), with_checkable(false)],
//! );
//! assert!(paused.is_checkable());
//!
//! // The same item through the builder.
//! let muted = tray
//!     .menu_item("Muted")
//!     .tooltip("Silence notifications")
//!     .checkable(true)
//!     .build();
//! assert!(muted.is_checked());
//! ```

use std::fmt;
use std::sync::Arc;

use crate::id::MenuItemId;
use crate::item::{ClickHandler, ItemState, MenuItem};
use crate::tray::Tray;

/// A single configuration step for a new menu item.
#[derive(Clone)]
pub enum MenuItemOption {
    /// Set the hover text.
    Tooltip(String),
    /// Render a check indicator, with the given initial checked state.
    ///
    /// Some platforms only draw the indicator when this is set; others treat
    /// it as a hint.
    Checkable(bool),
    /// Nest the item under an existing item.
    Parent(MenuItemId),
    /// Start out disabled.
    Disabled,
    /// Attach a click handler.
    OnClicked(ClickHandler),
}

impl MenuItemOption {
    pub(crate) fn apply(self, state: &mut ItemState, on_clicked: &mut Option<ClickHandler>) {
        match self {
            Self::Tooltip(tooltip) => state.tooltip = tooltip,
            Self::Checkable(checked) => {
                state.checkable = true;
                state.checked = checked;
            }
            Self::Parent(parent) => state.parent = Some(parent),
            Self::Disabled => state.disabled = true,
            Self::OnClicked(handler) => *on_clicked = Some(handler),
        }
    }
}

impl fmt::Debug for MenuItemOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tooltip(tooltip) => f.debug_tuple("Tooltip").field(tooltip).finish(),
            Self::Checkable(checked) => f.debug_tuple("Checkable").field(checked).finish(),
            Self::Parent(parent) => f.debug_tuple("Parent").field(parent).finish(),
            Self::Disabled => f.write_str("Disabled"),
            Self::OnClicked(_) => f.write_str("OnClicked(..)"),
        }
    }
}

/// Set the tooltip of the item to be created.
pub fn with_tooltip(tooltip: impl Into<String>) -> MenuItemOption {
    MenuItemOption::Tooltip(tooltip.into())
}

/// Make the item checkable with an initial checked state.
pub fn with_checkable(checked: bool) -> MenuItemOption {
    MenuItemOption::Checkable(checked)
}

/// Nest the item to be created under `parent`.
pub fn with_parent(parent: &MenuItem) -> MenuItemOption {
    MenuItemOption::Parent(parent.id())
}

/// Nest the item to be created under the item with id `parent`.
pub fn with_parent_id(parent: MenuItemId) -> MenuItemOption {
    MenuItemOption::Parent(parent)
}

/// Create the item disabled. Items are enabled by default.
pub fn with_disabled() -> MenuItemOption {
    MenuItemOption::Disabled
}

/// Call `handler` whenever the item is clicked.
pub fn with_on_clicked<F>(handler: F) -> MenuItemOption
where
    F: Fn() + Send + Sync + 'static,
{
    MenuItemOption::OnClicked(Arc::new(handler))
}

/// Fluent builder for menu items.
///
/// Collects options in call order and creates the item on
/// [`build`](MenuItemBuilder::build).
#[must_use = "the item is only created when build() is called"]
pub struct MenuItemBuilder<'a> {
    tray: &'a Tray,
    title: String,
    options: Vec<MenuItemOption>,
}

impl<'a> MenuItemBuilder<'a> {
    pub(crate) fn new(tray: &'a Tray, title: String) -> Self {
        Self {
            tray,
            title,
            options: Vec::new(),
        }
    }

    /// Set the tooltip.
    pub fn tooltip(self, tooltip: impl Into<String>) -> Self {
        self.option(with_tooltip(tooltip))
    }

    /// Make the item checkable with an initial checked state.
    pub fn checkable(self, checked: bool) -> Self {
        self.option(with_checkable(checked))
    }

    /// Nest the item under `parent`.
    pub fn parent(self, parent: &MenuItem) -> Self {
        self.option(with_parent(parent))
    }

    /// Create the item disabled.
    pub fn disabled(self) -> Self {
        self.option(with_disabled())
    }

    /// Attach a click handler.
    pub fn on_clicked<F>(self, handler: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.option(with_on_clicked(handler))
    }

    /// Append an arbitrary option.
    pub fn option(mut self, option: MenuItemOption) -> Self {
        self.options.push(option);
        self
    }

    /// Create, register and push the item.
    pub fn build(self) -> MenuItem {
        self.tray.add_menu_item(self.title, self.options)
    }
}

impl fmt::Debug for MenuItemBuilder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuItemBuilder")
            .field("title", &self.title)
            .field("options", &self.options)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_options() {
        let tray = Tray::new();
        let item = tray.add_menu_item("Plain", []);

        assert_eq!(item.tooltip(), "");
        assert!(!item.is_disabled());
        assert!(!item.is_checkable());
        assert!(!item.has_click_handler());
    }

    #[test]
    fn test_options_compose_in_any_order() {
        let tray = Tray::new();
        let parent = tray.add_menu_item("Parent", []);

        let a = tray.add_menu_item(
            "A",
            [with_disabled(), with_parent(&parent), with_tooltip("tip"), with_checkable(true)],
        );
        let b = tray.add_menu_item(
            "B",
            [with_checkable(true), with_tooltip("tip"), with_parent(&parent), with_disabled()],
        );

        for item in [&a, &b] {
            assert!(item.is_disabled());
            assert!(item.is_checkable());
            assert!(item.is_checked());
            assert_eq!(item.tooltip(), "tip");
            assert_eq!(item.parent(), Some(parent.id()));
        }
    }

    #[test]
    fn test_duplicate_options_last_write_wins() {
        let tray = Tray::new();
        let item = tray.add_menu_item(
            "Dup",
            [
                with_tooltip("first"),
                with_checkable(true),
                with_tooltip("second"),
                with_checkable(false),
            ],
        );

        assert_eq!(item.tooltip(), "second");
        assert!(item.is_checkable());
        assert!(!item.is_checked());
    }

    #[test]
    fn test_builder_matches_options() {
        let tray = Tray::new();
        let root = tray.menu_item("Root").build();
        let child = tray
            .menu_item("Child")
            .parent(&root)
            .tooltip("nested")
            .disabled()
            .on_clicked(|| {})
            .build();

        assert_eq!(child.parent(), Some(root.id()));
        assert_eq!(child.tooltip(), "nested");
        assert!(child.is_disabled());
        assert!(child.has_click_handler());
    }

    #[test]
    fn test_explicit_parent_overrides_sub_menu_parent() {
        let tray = Tray::new();
        let first = tray.add_menu_item("First", []);
        let second = tray.add_menu_item("Second", []);

        let child = first.add_sub_menu_item("Child", [with_parent_id(second.id())]);
        assert_eq!(child.parent(), Some(second.id()));
    }

    #[test]
    fn test_option_debug() {
        assert_eq!(format!("{:?}", with_disabled()), "Disabled");
        assert_eq!(format!("{:?}", with_on_clicked(|| {})), "OnClicked(..)");
        assert_eq!(format!("{:?}", with_tooltip("x")), "Tooltip(\"x\")");
    }
}
