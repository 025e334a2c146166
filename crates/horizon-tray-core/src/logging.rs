//! Logging and debugging facilities for Horizon Tray.
//!
//! The tray is instrumented with the `tracing` crate. Nothing is printed
//! unless the host installs a subscriber; the `horizon-tray` crate offers a
//! ready-made one in its `logging` module.
//!
//! # Filtering
//!
//! Each subsystem logs under its own target (see [`targets`]), so one noisy
//! area can be enabled on its own:
//!
//! ```text
//! RUST_LOG=horizon_tray_core::dispatch=trace
//! ```
//!
//! # Debug Visualization
//!
//! [`MenuTreeDebug`] renders the current menu hierarchy:
//!
//! ```
//! use horizon_tray_core::Tray;
//! use horizon_tray_core::logging::MenuTreeDebug;
//!
//! let tray = Tray::new();
//! let file = tray.add_menu_item("File", []);
//! file.add_sub_menu_item("Open", []);
//!
//! let output = MenuTreeDebug::new().format(&tray);
//! assert!(output.contains("File"));
//! assert!(output.contains("Open"));
//! ```

use std::collections::{BTreeMap, HashSet};
use std::fmt::Write as FmtWrite;
use std::sync::Arc;

use crate::id::MenuItemId;
use crate::item::ItemNode;
use crate::tray::Tray;

/// Span names used throughout Horizon Tray for tracing.
pub mod span_names {
    /// The presentation loop, open for as long as it runs.
    pub const PRESENTATION_LOOP: &str = "horizon_tray::presentation_loop";
    /// A single click being routed to its handler.
    pub const DISPATCH: &str = "horizon_tray::dispatch";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core crate target.
    pub const CORE: &str = "horizon_tray_core";
    /// Item creation and mutation.
    pub const MENU: &str = "horizon_tray_core::menu";
    /// Click routing.
    pub const DISPATCH: &str = "horizon_tray_core::dispatch";
    /// Register, ready and quit transitions.
    pub const LIFECYCLE: &str = "horizon_tray_core::lifecycle";
    /// The presentation loop and backends.
    pub const PRESENTATION: &str = "horizon_tray_core::presentation";
}

/// Style options for menu tree visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Plain indentation.
    Compact,
}

/// Configuration for menu tree debug output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    /// The style of tree visualization.
    pub style: TreeStyle,
    /// Whether to show item ids.
    pub show_ids: bool,
    /// Whether to show disabled/checked/hidden flags.
    pub show_state: bool,
    /// Maximum depth to traverse (None for unlimited).
    pub max_depth: Option<usize>,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_ids: true,
            show_state: false,
            max_depth: None,
        }
    }
}

impl TreeFormatOptions {
    /// Options for detailed debugging output.
    pub fn detailed() -> Self {
        Self {
            show_state: true,
            ..Default::default()
        }
    }

    /// Options for minimal output.
    pub fn minimal() -> Self {
        Self {
            show_ids: false,
            show_state: false,
            ..Default::default()
        }
    }
}

/// Debug utility for visualizing a tray's menu.
///
/// Items whose parent is not a registered item are shown at the root.
/// Separators are not registered and do not appear.
#[derive(Debug, Clone, Default)]
pub struct MenuTreeDebug {
    options: TreeFormatOptions,
}

impl MenuTreeDebug {
    /// Create a visualizer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a visualizer with custom options.
    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// Format the whole menu of `tray`.
    pub fn format(&self, tray: &Tray) -> String {
        let nodes = tray.registry().nodes();
        let known: HashSet<MenuItemId> = nodes.iter().map(|node| node.id()).collect();

        let mut roots = Vec::new();
        let mut children: BTreeMap<MenuItemId, Vec<Arc<ItemNode>>> = BTreeMap::new();
        for node in nodes.iter() {
            match node.snapshot().parent {
                Some(parent) if known.contains(&parent) => {
                    children.entry(parent).or_default().push(node.clone());
                }
                _ => roots.push(node.clone()),
            }
        }

        let mut output = String::new();
        writeln!(output, "Menu ({} items):", nodes.len()).expect("write to String");
        if roots.is_empty() {
            writeln!(output, "  (empty)").expect("write to String");
        }
        let root_count = roots.len();
        for (i, root) in roots.iter().enumerate() {
            self.format_node(root, &children, 0, i + 1 == root_count, &mut output);
        }
        output
    }

    fn format_node(
        &self,
        node: &ItemNode,
        children: &BTreeMap<MenuItemId, Vec<Arc<ItemNode>>>,
        depth: usize,
        is_last: bool,
        output: &mut String,
    ) {
        if self.options.max_depth.is_some_and(|max| depth > max) {
            return;
        }

        let snapshot = node.snapshot();
        output.push_str(&self.build_prefix(depth, is_last));
        if snapshot.title.is_empty() {
            output.push_str("(untitled)");
        } else {
            output.push_str(&snapshot.title);
        }

        if self.options.show_ids {
            write!(output, " [{}]", snapshot.id).expect("write to String");
        }

        if self.options.show_state {
            let mut flags = Vec::new();
            if snapshot.disabled {
                flags.push("disabled");
            }
            if snapshot.checkable {
                flags.push(if snapshot.checked { "checked" } else { "unchecked" });
            }
            if !node.is_visible() {
                flags.push("hidden");
            }
            if !flags.is_empty() {
                write!(output, " ({})", flags.join(", ")).expect("write to String");
            }
        }
        output.push('\n');

        let Some(kids) = children.get(&snapshot.id) else {
            return;
        };
        let count = kids.len();
        for (i, child) in kids.iter().enumerate() {
            self.format_node(child, children, depth + 1, i + 1 == count, output);
        }
    }

    fn build_prefix(&self, depth: usize, is_last: bool) -> String {
        let (branch, tee, corner) = match self.options.style {
            TreeStyle::Ascii => ("|   ", "+-- ", "`-- "),
            TreeStyle::Unicode => ("\u{2502}   ", "\u{251c}\u{2500}\u{2500} ", "\u{2514}\u{2500}\u{2500} "),
            TreeStyle::Compact => ("  ", "", ""),
        };

        let mut prefix = String::from("  ");
        if depth == 0 {
            return prefix;
        }
        for _ in 0..(depth - 1) {
            prefix.push_str(branch);
        }
        prefix.push_str(if is_last { corner } else { tee });
        if self.options.style == TreeStyle::Compact {
            prefix.push_str("  ");
        }
        prefix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{with_checkable, with_parent_id};

    #[test]
    fn test_format_empty() {
        let tray = Tray::new();
        let output = MenuTreeDebug::new().format(&tray);
        assert!(output.contains("Menu (0 items)"));
        assert!(output.contains("(empty)"));
    }

    #[test]
    fn test_format_hierarchy() {
        let tray = Tray::new();
        let file = tray.add_menu_item("File", []);
        file.add_sub_menu_item("Open", []);
        file.add_sub_menu_item("Save", []);
        tray.add_menu_item("Quit", []);

        let output = MenuTreeDebug::with_options(TreeFormatOptions {
            style: TreeStyle::Ascii,
            ..Default::default()
        })
        .format(&tray);

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "Menu (4 items):");
        assert_eq!(lines[1], "  File [1]");
        assert_eq!(lines[2], "  +-- Open [2]");
        assert_eq!(lines[3], "  `-- Save [3]");
        assert_eq!(lines[4], "  Quit [4]");
    }

    #[test]
    fn test_format_minimal_hides_ids() {
        let tray = Tray::new();
        tray.add_menu_item("Only", []);

        let output = MenuTreeDebug::with_options(TreeFormatOptions::minimal()).format(&tray);
        assert!(output.contains("Only"));
        assert!(!output.contains('['));
    }

    #[test]
    fn test_format_detailed_shows_state() {
        let tray = Tray::new();
        let paused = tray.add_menu_item("Paused", [with_checkable(true)]);
        paused.check();
        let hidden = tray.add_menu_item("Hidden", []);
        hidden.hide();
        hidden.disable();

        let output = MenuTreeDebug::with_options(TreeFormatOptions::detailed()).format(&tray);
        assert!(output.contains("Paused [1] (checked)"));
        assert!(output.contains("Hidden [2] (disabled, hidden)"));
    }

    #[test]
    fn test_unknown_parent_is_root() {
        let tray = Tray::new();
        tray.add_menu_item("Orphan", [with_parent_id(MenuItemId::from_raw(99))]);

        let output = MenuTreeDebug::with_options(TreeFormatOptions::minimal()).format(&tray);
        assert!(output.lines().any(|line| line == "  Orphan"));
    }

    #[test]
    fn test_max_depth() {
        let tray = Tray::new();
        let top = tray.add_menu_item("Top", []);
        let mid = top.add_sub_menu_item("Mid", []);
        mid.add_sub_menu_item("Deep", []);

        let output = MenuTreeDebug::with_options(TreeFormatOptions {
            max_depth: Some(1),
            ..Default::default()
        })
        .format(&tray);
        assert!(output.contains("Mid"));
        assert!(!output.contains("Deep"));
    }
}
