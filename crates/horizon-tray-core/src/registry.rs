//! The menu item registry.
//!
//! The registry maps identifiers to item state and is the single source of
//! truth for which items exist. Entries are inserted the first time an item
//! is pushed and are never removed; separators are never stored.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::id::MenuItemId;
use crate::item::{ItemNode, ItemSnapshot};

/// Concurrent mapping from [`MenuItemId`] to menu item state.
///
/// Lookups and inserts may happen from any thread. The registry lock is never
/// held while an item's own state lock is taken, so readers of the whole
/// registry cannot deadlock against mutators.
#[derive(Default)]
pub struct MenuRegistry {
    items: RwLock<HashMap<MenuItemId, Arc<ItemNode>>>,
}

impl MenuRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the node unless an entry for its id already exists.
    ///
    /// Returns `true` if the node was newly inserted.
    pub(crate) fn upsert(&self, node: &Arc<ItemNode>) -> bool {
        if self.items.read().contains_key(&node.id()) {
            return false;
        }

        let mut items = self.items.write();
        if items.contains_key(&node.id()) {
            return false;
        }
        items.insert(node.id(), node.clone());
        true
    }

    /// Look up the shared node for an id.
    pub(crate) fn node(&self, id: MenuItemId) -> Option<Arc<ItemNode>> {
        self.items.read().get(&id).cloned()
    }

    /// All nodes ordered by id. The registry lock is released on return.
    pub(crate) fn nodes(&self) -> Vec<Arc<ItemNode>> {
        let mut nodes: Vec<_> = self.items.read().values().cloned().collect();
        nodes.sort_by_key(|node| node.id());
        nodes
    }

    /// Check whether an id names a registered item.
    ///
    /// Separator ids are never registered.
    pub fn contains(&self, id: MenuItemId) -> bool {
        self.items.read().contains_key(&id)
    }

    /// Number of registered items.
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    /// Check whether no items are registered.
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// Capture the current state of a registered item.
    pub fn snapshot(&self, id: MenuItemId) -> Option<ItemSnapshot> {
        self.node(id).map(|node| node.snapshot())
    }

    /// Capture the current state of every registered item, ordered by id.
    pub fn snapshots(&self) -> Vec<ItemSnapshot> {
        self.nodes().iter().map(|node| node.snapshot()).collect()
    }
}

impl std::fmt::Debug for MenuRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MenuRegistry")
            .field("item_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemState;
    use std::thread;

    fn node(raw: u32, title: &str, parent: Option<u32>) -> Arc<ItemNode> {
        let state = ItemState {
            title: title.to_string(),
            parent: parent.map(MenuItemId::from_raw),
            ..ItemState::default()
        };
        Arc::new(ItemNode::new(MenuItemId::from_raw(raw), state, None))
    }

    #[test]
    fn test_upsert_is_load_or_store() {
        let registry = MenuRegistry::new();
        assert!(registry.is_empty());

        let first = node(1, "File", None);
        assert!(registry.upsert(&first));
        assert!(!registry.upsert(&first));

        // A different node with the same id does not replace the original.
        let impostor = node(1, "Impostor", None);
        assert!(!registry.upsert(&impostor));
        assert_eq!(registry.snapshot(MenuItemId::from_raw(1)).unwrap().title, "File");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_lookup_unknown() {
        let registry = MenuRegistry::new();
        assert!(!registry.contains(MenuItemId::from_raw(7)));
        assert!(registry.snapshot(MenuItemId::from_raw(7)).is_none());
    }

    #[test]
    fn test_snapshots_ordered_by_id() {
        let registry = MenuRegistry::new();
        registry.upsert(&node(5, "Quit", None));
        registry.upsert(&node(2, "Open", Some(1)));
        registry.upsert(&node(1, "File", None));
        registry.upsert(&node(4, "Save", Some(1)));

        let titles: Vec<_> = registry.snapshots().into_iter().map(|s| s.title).collect();
        assert_eq!(titles, vec!["File", "Open", "Save", "Quit"]);

        let parents: Vec<_> = registry.nodes().iter().map(|n| n.snapshot().parent).collect();
        let file = Some(MenuItemId::from_raw(1));
        assert_eq!(parents, vec![None, file, file, None]);
    }

    #[test]
    fn test_concurrent_inserts() {
        let registry = Arc::new(MenuRegistry::new());

        let handles: Vec<_> = (0..4u32)
            .map(|t| {
                let registry = registry.clone();
                thread::spawn(move || {
                    for i in 0..100u32 {
                        let raw = t * 100 + i + 1;
                        registry.upsert(&node(raw, "item", None));
                        assert!(registry.contains(MenuItemId::from_raw(raw)));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(registry.len(), 400);
    }
}
