//! The tray application context and its presentation loop.
//!
//! A [`Tray`] owns everything one tray icon needs: the id allocator, the item
//! registry, the command queue and the lifecycle state. Each `Tray` is fully
//! independent, so tests can create as many as they like.
//!
//! # Threading
//!
//! Items may be created and mutated from any thread. Every change is queued
//! and applied by [`Tray::run_loop`] on the thread that calls it, which is
//! the only thread that ever touches the [`Presentation`]. Several native
//! toolkits require that thread to be the process's main thread.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{Receiver, RecvTimeoutError};
use parking_lot::Mutex;

use crate::command::{CommandQueue, PresentationCommand};
use crate::config::{TrayBuilder, TrayConfig};
use crate::dispatch::SelectionSink;
use crate::error::{Result, TrayError};
use crate::id::{IdAllocator, MenuItemId};
use crate::item::MenuItem;
use crate::lifecycle::{Lifecycle, LifecycleState};
use crate::logging::{span_names, targets};
use crate::options::{MenuItemBuilder, MenuItemOption};
use crate::presentation::{Presentation, ReadySignal, TrayIconData};
use crate::registry::MenuRegistry;

/// State shared between a [`Tray`] and the [`MenuItem`] handles it creates.
pub(crate) struct TrayShared {
    pub(crate) config: TrayConfig,
    pub(crate) ids: IdAllocator,
    pub(crate) registry: Arc<MenuRegistry>,
    pub(crate) commands: CommandQueue,
    receiver: Mutex<Option<Receiver<PresentationCommand>>>,
    lifecycle: Lifecycle,
}

/// A tray icon with a hierarchical menu.
///
/// `Tray` is a cheap, cloneable handle; clones share the same menu.
///
/// # Example
///
/// ```
/// use horizon_tray_core::{HeadlessPresentation, Tray, with_on_clicked};
///
/// let tray = Tray::new();
/// let (presentation, handle) = HeadlessPresentation::new();
///
/// let quitter = tray.clone();
/// let quit = tray.add_menu_item("Quit", [with_on_clicked(move || quitter.quit())]);
///
/// let runner = {
///     let tray = tray.clone();
///     std::thread::spawn(move || tray.run(presentation, || {}, || {}))
/// };
///
/// // Simulate the user picking "Quit".
/// while !handle.click(quit.id()) {
///     std::thread::yield_now();
/// }
/// runner.join().unwrap().unwrap();
/// assert!(handle.is_torn_down());
/// ```
#[derive(Clone)]
pub struct Tray {
    shared: Arc<TrayShared>,
}

impl Tray {
    /// Create a tray with default configuration.
    pub fn new() -> Self {
        Self::from_config(TrayConfig::default())
    }

    /// Create a tray with custom configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TrayError::InvalidConfig`] if the configuration is rejected
    /// by [`TrayConfig::validate`].
    pub fn with_config(config: TrayConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_config(config))
    }

    /// Start building a tray with custom configuration.
    pub fn builder() -> TrayBuilder {
        TrayBuilder::new()
    }

    fn from_config(config: TrayConfig) -> Self {
        let (commands, receiver) = CommandQueue::new();
        Self {
            shared: Arc::new(TrayShared {
                config,
                ids: IdAllocator::new(),
                registry: Arc::new(MenuRegistry::new()),
                commands,
                receiver: Mutex::new(Some(receiver)),
                lifecycle: Lifecycle::new(),
            }),
        }
    }

    /// The configuration this tray was created with.
    pub fn config(&self) -> &TrayConfig {
        &self.shared.config
    }

    /// The current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.shared.lifecycle.state()
    }

    /// The registry of all items created through this tray.
    pub fn registry(&self) -> &MenuRegistry {
        &self.shared.registry
    }

    /// Number of commands waiting for the presentation loop.
    pub fn pending_commands(&self) -> usize {
        self.shared.commands.pending()
    }

    // -------------------------------------------------------------------------
    // Menu API
    // -------------------------------------------------------------------------

    /// Add a menu item with the given title and options.
    ///
    /// Safe to call from any thread. The item is registered and its initial
    /// state queued for the presentation before this returns.
    pub fn add_menu_item(
        &self,
        title: impl Into<String>,
        options: impl IntoIterator<Item = MenuItemOption>,
    ) -> MenuItem {
        MenuItem::create(&self.shared, title.into(), options)
    }

    /// Start building a menu item.
    pub fn menu_item(&self, title: impl Into<String>) -> MenuItemBuilder<'_> {
        MenuItemBuilder::new(self, title.into())
    }

    /// Add a separator bar to the root menu.
    ///
    /// The separator consumes an id but is never registered; it cannot be
    /// clicked or updated.
    pub fn add_separator(&self) -> MenuItemId {
        self.push_separator(None)
    }

    /// Add a separator bar inside `parent`'s submenu.
    pub fn add_separator_in(&self, parent: &MenuItem) -> MenuItemId {
        self.push_separator(Some(parent.id()))
    }

    fn push_separator(&self, parent: Option<MenuItemId>) -> MenuItemId {
        let id = self.shared.ids.next();
        tracing::debug!(target: targets::MENU, %id, ?parent, "separator created");
        self.shared
            .commands
            .send(PresentationCommand::Separator { id, parent });
        id
    }

    /// Look up a registered item by id.
    pub fn find_item(&self, id: MenuItemId) -> Option<MenuItem> {
        self.shared
            .registry
            .node(id)
            .map(|node| MenuItem::from_node(node, self.shared.clone()))
    }

    /// All registered items in creation order.
    pub fn items(&self) -> Vec<MenuItem> {
        self.shared
            .registry
            .nodes()
            .into_iter()
            .map(|node| MenuItem::from_node(node, self.shared.clone()))
            .collect()
    }

    // -------------------------------------------------------------------------
    // Tray icon API
    // -------------------------------------------------------------------------

    /// Set the text shown next to the tray icon, on platforms that support it.
    pub fn set_title(&self, title: impl Into<String>) {
        self.shared
            .commands
            .send(PresentationCommand::TrayTitle(title.into()));
    }

    /// Set the tray icon's hover text.
    pub fn set_tooltip(&self, tooltip: impl Into<String>) {
        self.shared
            .commands
            .send(PresentationCommand::TrayTooltip(tooltip.into()));
    }

    /// Replace the tray icon image.
    pub fn set_icon(&self, icon: TrayIconData) {
        self.shared.commands.send(PresentationCommand::TrayIcon(icon));
    }

    // -------------------------------------------------------------------------
    // Dispatch API
    // -------------------------------------------------------------------------

    /// A sink presentations use to report clicks.
    pub fn selection_sink(&self) -> SelectionSink {
        SelectionSink::new(self.shared.registry.clone())
    }

    /// Report that the user activated item `id`.
    ///
    /// See [`SelectionSink::notify_selection`].
    pub fn notify_selection(&self, id: MenuItemId) {
        self.selection_sink().notify_selection(id);
    }

    // -------------------------------------------------------------------------
    // Lifecycle API
    // -------------------------------------------------------------------------

    /// Register the tray with the presentation layer.
    ///
    /// `on_ready` runs once, on its own thread, after the presentation
    /// reports that registration completed. It never runs if registration
    /// does not complete. `on_exit` runs on the presentation thread during
    /// [`quit`](Tray::quit), before the presentation is torn down.
    ///
    /// The loop itself must be driven with [`run_loop`](Tray::run_loop),
    /// possibly from another part of the program. Registering twice is
    /// ignored.
    pub fn register<R, E>(&self, on_ready: R, on_exit: E)
    where
        R: FnOnce() + Send + 'static,
        E: FnOnce() + Send + 'static,
    {
        if !self.shared.lifecycle.begin(Box::new(on_exit)) {
            tracing::warn!(
                target: targets::LIFECYCLE,
                state = ?self.state(),
                "tray already registered or quit; ignoring register"
            );
            return;
        }
        tracing::info!(target: targets::LIFECYCLE, "registering tray");

        let (ready, waiter) = ReadySignal::pair();
        let spawned = thread::Builder::new()
            .name(self.shared.config.ready_thread_name.clone())
            .spawn(move || {
                if waiter.recv().is_ok() {
                    tracing::debug!(target: targets::LIFECYCLE, "presentation ready");
                    on_ready();
                } else {
                    tracing::debug!(
                        target: targets::LIFECYCLE,
                        "registration never completed; skipping ready callback"
                    );
                }
            });
        if let Err(err) = spawned {
            tracing::error!(
                target: targets::LIFECYCLE,
                %err,
                "failed to spawn ready thread; ready callback will not run"
            );
        }

        self.shared.commands.send(PresentationCommand::Register(ready));
        if let Some(title) = &self.shared.config.title {
            self.set_title(title.clone());
        }
        if let Some(tooltip) = &self.shared.config.tooltip {
            self.set_tooltip(tooltip.clone());
        }
    }

    /// Register the tray and run the presentation loop on this thread.
    ///
    /// Blocks until [`quit`](Tray::quit) completes.
    ///
    /// # Errors
    ///
    /// Returns [`TrayError::LoopUnavailable`] if the loop is already running
    /// or has finished.
    pub fn run<P, R, E>(&self, presentation: P, on_ready: R, on_exit: E) -> Result<()>
    where
        P: Presentation,
        R: FnOnce() + Send + 'static,
        E: FnOnce() + Send + 'static,
    {
        self.register(on_ready, on_exit);
        self.run_loop(presentation)
    }

    /// Run the presentation loop on this thread until quit.
    ///
    /// Applies queued commands to `presentation` in order and pumps it while
    /// idle. The loop can only run once per tray.
    ///
    /// # Errors
    ///
    /// Returns [`TrayError::LoopUnavailable`] if the loop is already running
    /// or has finished.
    pub fn run_loop<P: Presentation>(&self, mut presentation: P) -> Result<()> {
        let _span =
            tracing::debug_span!(target: targets::PRESENTATION, span_names::PRESENTATION_LOOP)
                .entered();
        let receiver = self
            .shared
            .receiver
            .lock()
            .take()
            .ok_or(TrayError::LoopUnavailable)?;

        tracing::info!(target: targets::PRESENTATION, "starting presentation loop");
        let selection = self.selection_sink();
        let poll_interval = self.shared.config.poll_interval;

        loop {
            match receiver.recv_timeout(poll_interval) {
                Ok(command) => {
                    if apply_command(&mut presentation, command, &selection).is_break() {
                        break;
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
            presentation.pump();
        }

        tracing::info!(target: targets::PRESENTATION, "presentation loop exited");
        Ok(())
    }

    /// Quit the tray.
    ///
    /// Only the first call has an effect, however many threads call it: the
    /// exit callback runs on the presentation thread, the presentation is
    /// torn down and [`run_loop`](Tray::run_loop) returns. Does not block.
    ///
    /// Changes made after quit are no longer queued for the presentation;
    /// item state itself stays readable and writable.
    pub fn quit(&self) {
        let Some(on_exit) = self.shared.lifecycle.request_quit() else {
            tracing::debug!(target: targets::LIFECYCLE, "quit already requested");
            return;
        };
        tracing::info!(target: targets::LIFECYCLE, "quit requested");
        self.shared.commands.close(PresentationCommand::Quit(on_exit));
    }

    /// Take every queued command without applying it.
    #[cfg(test)]
    pub(crate) fn drain_commands(&self) -> Vec<PresentationCommand> {
        self.shared
            .receiver
            .lock()
            .as_ref()
            .map(|receiver| receiver.try_iter().collect())
            .unwrap_or_default()
    }
}

impl Default for Tray {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Tray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tray")
            .field("state", &self.state())
            .field("items", &self.shared.registry.len())
            .field("pending_commands", &self.pending_commands())
            .finish()
    }
}

static_assertions::assert_impl_all!(Tray: Send, Sync);

/// Apply one command on the presentation thread.
fn apply_command<P: Presentation>(
    presentation: &mut P,
    command: PresentationCommand,
    selection: &SelectionSink,
) -> ControlFlow<()> {
    tracing::trace!(target: targets::PRESENTATION, kind = command.kind(), "applying command");
    match command {
        PresentationCommand::Register(ready) => presentation.register(ready, selection.clone()),
        PresentationCommand::Snapshot(snapshot) => presentation.push_item_snapshot(&snapshot),
        PresentationCommand::Visibility { id, visible } => {
            presentation.push_visibility(id, visible)
        }
        PresentationCommand::Separator { id, parent } => presentation.push_separator(id, parent),
        PresentationCommand::TrayTitle(title) => presentation.set_tray_title(&title),
        PresentationCommand::TrayTooltip(tooltip) => presentation.set_tray_tooltip(&tooltip),
        PresentationCommand::TrayIcon(icon) => presentation.set_tray_icon(&icon),
        PresentationCommand::Quit(on_exit) => {
            if let Some(on_exit) = on_exit {
                tracing::debug!(target: targets::LIFECYCLE, "running exit callback");
                on_exit();
            }
            presentation.teardown();
            return ControlFlow::Break(());
        }
    }
    ControlFlow::Continue(())
}
