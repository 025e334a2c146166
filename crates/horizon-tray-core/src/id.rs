//! Identity allocation for menu items and separators.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

/// A unique identifier for a menu item or separator.
///
/// Identifiers are issued by an [`IdAllocator`] in strictly increasing order
/// and are never reassigned, even after an item is hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MenuItemId(u32);

impl MenuItemId {
    /// Wrap a raw identifier, typically one reported back by a native layer.
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw u32 value of this identifier.
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for MenuItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<MenuItemId> for u32 {
    fn from(id: MenuItemId) -> Self {
        id.0
    }
}

/// Issues monotonically increasing [`MenuItemId`]s.
///
/// Safe to call from any number of threads. The first identifier issued is
/// `1`; exhausting the `u32` space is not a practical concern.
#[derive(Debug, Default)]
pub struct IdAllocator {
    last: AtomicU32,
}

impl IdAllocator {
    /// Create an allocator that has issued nothing yet.
    pub const fn new() -> Self {
        Self {
            last: AtomicU32::new(0),
        }
    }

    /// Issue the next identifier.
    pub fn next(&self) -> MenuItemId {
        MenuItemId(self.last.fetch_add(1, Ordering::SeqCst) + 1)
    }
}
