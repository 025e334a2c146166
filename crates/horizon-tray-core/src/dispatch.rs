//! Routing of native click notifications back to item callbacks.

use std::fmt;
use std::sync::Arc;

use crate::id::MenuItemId;
use crate::logging::{span_names, targets};
use crate::registry::MenuRegistry;

/// Receives click notifications from the presentation layer.
///
/// A presentation is handed a `SelectionSink` when it registers. It may clone
/// the sink and call [`notify_selection`](SelectionSink::notify_selection)
/// from whichever thread detects the click.
#[derive(Clone)]
pub struct SelectionSink {
    registry: Arc<MenuRegistry>,
}

impl SelectionSink {
    pub(crate) fn new(registry: Arc<MenuRegistry>) -> Self {
        Self { registry }
    }

    /// Report that the user activated item `id`.
    ///
    /// Unknown ids, including separators and stale ids, are ignored. If the
    /// item has a click handler it runs synchronously on the calling thread;
    /// a panic inside the handler is not caught.
    pub fn notify_selection(&self, id: MenuItemId) {
        let Some(node) = self.registry.node(id) else {
            tracing::trace!(target: targets::DISPATCH, %id, "ignoring selection of unknown item");
            return;
        };

        match node.on_clicked() {
            Some(handler) => {
                let _span =
                    tracing::trace_span!(target: targets::DISPATCH, span_names::DISPATCH, %id)
                        .entered();
                tracing::trace!(target: targets::DISPATCH, "dispatching click");
                handler();
            }
            None => {
                tracing::trace!(target: targets::DISPATCH, %id, "item has no click handler");
            }
        }
    }
}

impl fmt::Debug for SelectionSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionSink")
            .field("registry", &self.registry)
            .finish()
    }
}

static_assertions::assert_impl_all!(SelectionSink: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::with_on_clicked;
    use crate::tray::Tray;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_dispatch_invokes_handler() {
        let tray = Tray::new();
        let clicks = Arc::new(AtomicUsize::new(0));

        let clicks_clone = clicks.clone();
        let item = tray.add_menu_item(
            "Click me",
            [with_on_clicked(move || {
                clicks_clone.fetch_add(1, Ordering::SeqCst);
            })],
        );

        let sink = tray.selection_sink();
        sink.notify_selection(item.id());
        sink.clone().notify_selection(item.id());

        assert_eq!(clicks.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_unknown_and_separator_ids_are_ignored() {
        let tray = Tray::new();
        let clicks = Arc::new(AtomicUsize::new(0));

        let clicks_clone = clicks.clone();
        tray.add_menu_item(
            "Only",
            [with_on_clicked(move || {
                clicks_clone.fetch_add(1, Ordering::SeqCst);
            })],
        );
        let separator = tray.add_separator();

        let sink = tray.selection_sink();
        sink.notify_selection(separator);
        sink.notify_selection(MenuItemId::from_raw(9999));
        sink.notify_selection(MenuItemId::from_raw(0));

        assert_eq!(clicks.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_item_without_handler() {
        let tray = Tray::new();
        let item = tray.add_menu_item("Inert", []);
        tray.notify_selection(item.id());
    }

    #[test]
    fn test_handler_may_mutate_menu() {
        let tray = Tray::new();
        let created = Arc::new(AtomicUsize::new(0));

        let tray_clone = tray.clone();
        let created_clone = created.clone();
        let item = tray.add_menu_item(
            "Spawner",
            [with_on_clicked(move || {
                tray_clone.add_menu_item("Spawned", []);
                created_clone.fetch_add(1, Ordering::SeqCst);
            })],
        );

        tray.notify_selection(item.id());
        assert_eq!(created.load(Ordering::SeqCst), 1);
        assert_eq!(tray.registry().len(), 2);
    }
}
