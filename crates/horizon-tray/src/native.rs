//! Native presentation backend built on `tray-icon` and `winit`.
//!
//! Available on Windows and macOS with the `native` feature.
//!
//! [`NativePresentation`] must be created on the thread that will run the
//! presentation loop, which on macOS has to be the main thread:
//!
//! ```no_run
//! use horizon_tray::native::NativePresentation;
//! use horizon_tray::Tray;
//!
//! fn main() -> horizon_tray::Result<()> {
//!     let tray = Tray::new();
//!     let quitter = tray.clone();
//!     tray.add_menu_item("Quit", [horizon_tray::with_on_clicked(move || quitter.quit())]);
//!
//!     let presentation = NativePresentation::new()?;
//!     tray.run(presentation, || println!("tray ready"), || println!("bye"))
//! }
//! ```
//!
//! # Platform notes
//!
//! - A row that gains its first child is rebuilt as a submenu. Submenus do
//!   not report clicks and cannot show a check mark.
//! - Per-item tooltips are not supported by the native menus and are ignored.
//! - Hidden rows are removed from their menu and reinserted when shown.

use std::collections::BTreeMap;
use std::time::Duration;

use horizon_tray_core::logging::targets;
use horizon_tray_core::{
    ItemSnapshot, MenuItemId, Presentation, ReadySignal, Result, SelectionSink, TrayError,
    TrayIconData,
};
use tray_icon::menu::{
    CheckMenuItem, IsMenuItem, Menu, MenuEvent, MenuId, MenuItem, PredefinedMenuItem, Submenu,
};
use tray_icon::{Icon, TrayIcon, TrayIconBuilder};
use winit::application::ApplicationHandler;
use winit::event::{StartCause, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::WindowId;

/// The native widget behind one menu row.
enum NativeRow {
    Item(MenuItem),
    Check(CheckMenuItem),
    Submenu(Submenu),
    Separator(PredefinedMenuItem),
}

impl NativeRow {
    fn for_snapshot(snapshot: &ItemSnapshot) -> Self {
        let id = menu_id(snapshot.id);
        if snapshot.checkable {
            Self::Check(CheckMenuItem::with_id(
                id,
                &snapshot.title,
                !snapshot.disabled,
                snapshot.checked,
                None,
            ))
        } else {
            Self::Item(MenuItem::with_id(id, &snapshot.title, !snapshot.disabled, None))
        }
    }

    fn as_menu_item(&self) -> &dyn IsMenuItem {
        match self {
            Self::Item(item) => item,
            Self::Check(item) => item,
            Self::Submenu(submenu) => submenu,
            Self::Separator(separator) => separator,
        }
    }

    fn apply(&self, snapshot: &ItemSnapshot) {
        match self {
            Self::Item(item) => {
                item.set_text(&snapshot.title);
                item.set_enabled(!snapshot.disabled);
            }
            Self::Check(item) => {
                item.set_text(&snapshot.title);
                item.set_enabled(!snapshot.disabled);
                item.set_checked(snapshot.checked);
            }
            Self::Submenu(submenu) => {
                submenu.set_text(&snapshot.title);
                submenu.set_enabled(!snapshot.disabled);
            }
            Self::Separator(_) => {}
        }
    }
}

struct RowEntry {
    row: NativeRow,
    /// The row this one is nested under, resolved when it was first seen.
    container: Option<MenuItemId>,
    snapshot: Option<ItemSnapshot>,
    visible: bool,
    attached: bool,
}

/// Drives winit's event loop one step at a time.
#[derive(Default)]
struct PumpHandler {
    started: bool,
}

impl ApplicationHandler for PumpHandler {
    fn new_events(&mut self, _event_loop: &ActiveEventLoop, cause: StartCause) {
        if matches!(cause, StartCause::Init) {
            self.started = true;
        }
    }

    fn resumed(&mut self, _event_loop: &ActiveEventLoop) {}

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _id: WindowId, _event: WindowEvent) {}
}

/// A presentation that shows a real tray icon.
pub struct NativePresentation {
    event_loop: EventLoop<()>,
    handler: PumpHandler,
    menu: Menu,
    tray: Option<TrayIcon>,
    rows: BTreeMap<MenuItemId, RowEntry>,
    selection: Option<SelectionSink>,
    title: Option<String>,
    tooltip: Option<String>,
    icon: Option<TrayIconData>,
}

impl NativePresentation {
    /// Create the backend on the current thread.
    ///
    /// # Errors
    ///
    /// Returns [`TrayError::Presentation`] if the platform event loop cannot
    /// be created, for example because one already exists in this process.
    pub fn new() -> Result<Self> {
        let event_loop = EventLoop::new().map_err(|e| TrayError::Presentation(e.to_string()))?;
        Ok(Self {
            event_loop,
            handler: PumpHandler::default(),
            menu: Menu::new(),
            tray: None,
            rows: BTreeMap::new(),
            selection: None,
            title: None,
            tooltip: None,
            icon: None,
        })
    }

    fn pump_events(&mut self) {
        let status = self
            .event_loop
            .pump_app_events(Some(Duration::ZERO), &mut self.handler);
        if let PumpStatus::Exit(code) = status {
            tracing::debug!(target: targets::PRESENTATION, code, "platform event loop exited");
        }
    }

    fn build_tray(&self) -> Result<TrayIcon> {
        let mut builder = TrayIconBuilder::new().with_menu(Box::new(self.menu.clone()));
        if let Some(title) = &self.title {
            builder = builder.with_title(title);
        }
        if let Some(tooltip) = &self.tooltip {
            builder = builder.with_tooltip(tooltip);
        }
        if let Some(icon) = &self.icon {
            builder = builder.with_icon(native_icon(icon)?);
        }
        builder
            .build()
            .map_err(|e| TrayError::Presentation(e.to_string()))
    }

    /// Resolve the container for a new row; unknown parents mean the root.
    fn container_for(&self, parent: Option<MenuItemId>) -> Option<MenuItemId> {
        parent.filter(|parent| self.rows.contains_key(parent))
    }

    /// Turn a leaf row into a submenu so it can hold children.
    fn ensure_submenu(&mut self, id: MenuItemId) {
        let Some(entry) = self.rows.get(&id) else {
            return;
        };
        if matches!(entry.row, NativeRow::Submenu(_)) {
            return;
        }
        let (title, enabled) = entry
            .snapshot
            .as_ref()
            .map(|s| (s.title.clone(), !s.disabled))
            .unwrap_or_default();
        let was_attached = entry.attached;

        if was_attached {
            self.detach(id);
        }
        tracing::debug!(target: targets::PRESENTATION, %id, "converting row to submenu");
        if let Some(entry) = self.rows.get_mut(&id) {
            entry.row = NativeRow::Submenu(Submenu::with_id(menu_id(id), title, enabled));
        }
        if was_attached {
            self.attach(id);
        }
    }

    /// Insert a row into its container at the position given by creation order.
    fn attach(&mut self, id: MenuItemId) {
        let Some(entry) = self.rows.get(&id) else {
            return;
        };
        let container = entry.container;
        let position = self
            .rows
            .range(..id)
            .filter(|(_, other)| other.container == container && other.attached)
            .count();

        let result = match container {
            None => self.menu.insert(entry.row.as_menu_item(), position),
            Some(parent) => match self.rows.get(&parent).map(|p| &p.row) {
                Some(NativeRow::Submenu(submenu)) => {
                    submenu.insert(entry.row.as_menu_item(), position)
                }
                _ => return,
            },
        };
        match result {
            Ok(()) => {
                if let Some(entry) = self.rows.get_mut(&id) {
                    entry.attached = true;
                }
            }
            Err(err) => {
                tracing::warn!(target: targets::PRESENTATION, %id, %err, "failed to insert menu row");
            }
        }
    }

    fn detach(&mut self, id: MenuItemId) {
        let Some(entry) = self.rows.get(&id) else {
            return;
        };
        let result = match entry.container {
            None => self.menu.remove(entry.row.as_menu_item()),
            Some(parent) => match self.rows.get(&parent).map(|p| &p.row) {
                Some(NativeRow::Submenu(submenu)) => submenu.remove(entry.row.as_menu_item()),
                _ => return,
            },
        };
        if let Err(err) = result {
            tracing::warn!(target: targets::PRESENTATION, %id, %err, "failed to remove menu row");
        }
        if let Some(entry) = self.rows.get_mut(&id) {
            entry.attached = false;
        }
    }

    fn insert_row(
        &mut self,
        id: MenuItemId,
        row: NativeRow,
        parent: Option<MenuItemId>,
        snapshot: Option<ItemSnapshot>,
    ) {
        let container = self.container_for(parent);
        if let Some(container) = container {
            self.ensure_submenu(container);
        }
        self.rows.insert(
            id,
            RowEntry {
                row,
                container,
                snapshot,
                visible: true,
                attached: false,
            },
        );
        self.attach(id);
    }
}

impl std::fmt::Debug for NativePresentation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativePresentation")
            .field("registered", &self.tray.is_some())
            .field("rows", &self.rows.len())
            .finish_non_exhaustive()
    }
}

impl Presentation for NativePresentation {
    fn register(&mut self, ready: ReadySignal, selection: SelectionSink) {
        // Let the platform finish launching before the status item is created.
        self.pump_events();
        if !self.handler.started {
            tracing::debug!(target: targets::PRESENTATION, "event loop not started after first pump");
        }

        match self.build_tray() {
            Ok(tray) => {
                tracing::info!(target: targets::PRESENTATION, "native tray icon registered");
                self.tray = Some(tray);
                self.selection = Some(selection);
                ready.signal();
            }
            Err(err) => {
                tracing::error!(target: targets::PRESENTATION, %err, "failed to create tray icon");
            }
        }
    }

    fn push_item_snapshot(&mut self, snapshot: &ItemSnapshot) {
        if let Some(entry) = self.rows.get_mut(&snapshot.id) {
            entry.row.apply(snapshot);
            entry.snapshot = Some(snapshot.clone());
            return;
        }
        self.insert_row(
            snapshot.id,
            NativeRow::for_snapshot(snapshot),
            snapshot.parent,
            Some(snapshot.clone()),
        );
    }

    fn push_visibility(&mut self, id: MenuItemId, visible: bool) {
        let Some(entry) = self.rows.get_mut(&id) else {
            tracing::trace!(target: targets::PRESENTATION, %id, "visibility for unknown row");
            return;
        };
        if entry.visible == visible {
            return;
        }
        entry.visible = visible;
        if visible {
            self.attach(id);
        } else {
            self.detach(id);
        }
    }

    fn push_separator(&mut self, id: MenuItemId, parent: Option<MenuItemId>) {
        self.insert_row(
            id,
            NativeRow::Separator(PredefinedMenuItem::separator()),
            parent,
            None,
        );
    }

    fn set_tray_title(&mut self, title: &str) {
        if let Some(tray) = &self.tray {
            tray.set_title(Some(title));
        }
        self.title = Some(title.to_string());
    }

    fn set_tray_tooltip(&mut self, tooltip: &str) {
        if let Some(tray) = &self.tray {
            if let Err(err) = tray.set_tooltip(Some(tooltip)) {
                tracing::warn!(target: targets::PRESENTATION, %err, "failed to set tray tooltip");
            }
        }
        self.tooltip = Some(tooltip.to_string());
    }

    fn set_tray_icon(&mut self, icon: &TrayIconData) {
        if let Some(tray) = &self.tray {
            let result = native_icon(icon).and_then(|icon| {
                tray.set_icon(Some(icon))
                    .map_err(|e| TrayError::Presentation(e.to_string()))
            });
            if let Err(err) = result {
                tracing::warn!(target: targets::PRESENTATION, %err, "failed to set tray icon");
            }
        }
        self.icon = Some(icon.clone());
    }

    fn pump(&mut self) {
        self.pump_events();

        let Some(selection) = &self.selection else {
            return;
        };
        while let Ok(event) = MenuEvent::receiver().try_recv() {
            match event.id.0.parse::<u32>() {
                Ok(raw) => selection.notify_selection(MenuItemId::from_raw(raw)),
                Err(_) => {
                    tracing::trace!(target: targets::PRESENTATION, id = %event.id.0, "ignoring foreign menu event");
                }
            }
        }
    }

    fn teardown(&mut self) {
        tracing::info!(target: targets::PRESENTATION, "removing native tray icon");
        self.selection = None;
        self.tray = None;
        self.rows.clear();
        self.menu = Menu::new();
    }
}

fn menu_id(id: MenuItemId) -> MenuId {
    MenuId::new(id.to_string())
}

fn native_icon(icon: &TrayIconData) -> Result<Icon> {
    Icon::from_rgba(icon.rgba().to_vec(), icon.width(), icon.height())
        .map_err(|e| TrayError::InvalidIcon(e.to_string()))
}
