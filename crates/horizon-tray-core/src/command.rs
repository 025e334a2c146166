//! The update propagation protocol.
//!
//! Application threads never touch native state directly. Every change is
//! wrapped in a [`PresentationCommand`] and queued to the single thread that
//! owns the presentation loop, which applies commands in arrival order.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam_channel::{Receiver, Sender, unbounded};

use crate::id::MenuItemId;
use crate::item::ItemSnapshot;
use crate::logging::targets;
use crate::presentation::{ReadySignal, TrayIconData};

/// Callback run on the presentation thread just before teardown.
pub type ExitCallback = Box<dyn FnOnce() + Send + 'static>;

/// A marshaled call into the presentation loop.
pub enum PresentationCommand {
    /// Begin native registration; the presentation must eventually signal
    /// the carried token once it is ready.
    Register(ReadySignal),
    /// Upsert the full state of one item.
    Snapshot(ItemSnapshot),
    /// Show or hide an item without resending its state.
    Visibility {
        /// The item to show or hide.
        id: MenuItemId,
        /// `true` to show.
        visible: bool,
    },
    /// Create a divider at the slot reserved by `id`.
    Separator {
        /// The identifier consumed by the separator.
        id: MenuItemId,
        /// The submenu holding the separator, if any.
        parent: Option<MenuItemId>,
    },
    /// Set the text shown next to the tray icon.
    TrayTitle(String),
    /// Set the tray icon's hover text.
    TrayTooltip(String),
    /// Replace the tray icon image.
    TrayIcon(TrayIconData),
    /// Run the exit callback, tear the presentation down and stop the loop.
    Quit(Option<ExitCallback>),
}

impl PresentationCommand {
    /// Short name of the command kind, used in log output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Register(_) => "register",
            Self::Snapshot(_) => "snapshot",
            Self::Visibility { .. } => "visibility",
            Self::Separator { .. } => "separator",
            Self::TrayTitle(_) => "tray_title",
            Self::TrayTooltip(_) => "tray_tooltip",
            Self::TrayIcon(_) => "tray_icon",
            Self::Quit(_) => "quit",
        }
    }
}

impl fmt::Debug for PresentationCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Register(_) => f.write_str("Register"),
            Self::Snapshot(snapshot) => f.debug_tuple("Snapshot").field(snapshot).finish(),
            Self::Visibility { id, visible } => f
                .debug_struct("Visibility")
                .field("id", id)
                .field("visible", visible)
                .finish(),
            Self::Separator { id, parent } => f
                .debug_struct("Separator")
                .field("id", id)
                .field("parent", parent)
                .finish(),
            Self::TrayTitle(title) => f.debug_tuple("TrayTitle").field(title).finish(),
            Self::TrayTooltip(tooltip) => f.debug_tuple("TrayTooltip").field(tooltip).finish(),
            Self::TrayIcon(icon) => f.debug_tuple("TrayIcon").field(icon).finish(),
            Self::Quit(on_exit) => f
                .debug_struct("Quit")
                .field("has_exit_callback", &on_exit.is_some())
                .finish(),
        }
    }
}

/// Sending half of the command queue.
///
/// The queue is unbounded: snapshots are never dropped for lack of capacity.
/// Once [`close`](CommandQueue::close) has queued the final command, later
/// sends are dropped, so a tray that quits without ever running its loop
/// holds at most the commands queued before quit.
pub(crate) struct CommandQueue {
    sender: Sender<PresentationCommand>,
    closed: AtomicBool,
}

impl CommandQueue {
    /// Create a queue and its receiving half.
    pub(crate) fn new() -> (Self, Receiver<PresentationCommand>) {
        let (sender, receiver) = unbounded();
        let queue = Self {
            sender,
            closed: AtomicBool::new(false),
        };
        (queue, receiver)
    }

    /// Queue a command for the presentation loop.
    ///
    /// Commands sent after the queue was closed or the loop has finished are
    /// dropped.
    pub(crate) fn send(&self, command: PresentationCommand) {
        if self.closed.load(Ordering::Acquire) {
            tracing::debug!(
                target: targets::PRESENTATION,
                kind = command.kind(),
                "tray has quit; dropping command"
            );
            return;
        }
        self.push(command);
    }

    /// Queue `last` and refuse every command sent afterwards.
    pub(crate) fn close(&self, last: PresentationCommand) {
        self.closed.store(true, Ordering::Release);
        self.push(last);
    }

    fn push(&self, command: PresentationCommand) {
        tracing::trace!(target: targets::PRESENTATION, kind = command.kind(), "queueing command");
        if let Err(err) = self.sender.send(command) {
            tracing::debug!(
                target: targets::PRESENTATION,
                kind = err.0.kind(),
                "presentation loop has finished; dropping command"
            );
        }
    }

    /// Number of commands waiting to be applied.
    pub(crate) fn pending(&self) -> usize {
        self.sender.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_preserves_order() {
        let (queue, receiver) = CommandQueue::new();
        for raw in 1..=5 {
            queue.send(PresentationCommand::Separator {
                id: MenuItemId::from_raw(raw),
                parent: None,
            });
        }
        assert_eq!(queue.pending(), 5);

        let ids: Vec<_> = receiver
            .try_iter()
            .map(|command| match command {
                PresentationCommand::Separator { id, .. } => id.as_u32(),
                other => panic!("unexpected command {other:?}"),
            })
            .collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_send_after_receiver_dropped_does_not_panic() {
        let (queue, receiver) = CommandQueue::new();
        drop(receiver);
        queue.send(PresentationCommand::TrayTitle("gone".to_string()));
    }

    #[test]
    fn test_close_drops_later_commands() {
        let (queue, receiver) = CommandQueue::new();
        queue.send(PresentationCommand::TrayTitle("before".to_string()));
        queue.close(PresentationCommand::Quit(None));
        queue.send(PresentationCommand::TrayTitle("after".to_string()));
        assert_eq!(queue.pending(), 2);

        let kinds: Vec<_> = receiver.try_iter().map(|command| command.kind()).collect();
        assert_eq!(kinds, vec!["tray_title", "quit"]);
    }

    #[test]
    fn test_command_debug_hides_callbacks() {
        let command = PresentationCommand::Quit(Some(Box::new(|| {})));
        assert_eq!(format!("{command:?}"), "Quit { has_exit_callback: true }");
        assert_eq!(command.kind(), "quit");
    }
}
