//! Tray lifecycle: `Unstarted -> Running -> Quit`.
//!
//! The only mutual-exclusion invariant of the tray lives here: however many
//! threads call quit, exactly one of them wins the teardown sequence.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::command::ExitCallback;

/// The lifecycle state of a tray.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LifecycleState {
    /// Neither registered nor quit.
    #[default]
    Unstarted,
    /// Registered with the presentation layer.
    Running,
    /// Quit has been requested. Terminal.
    Quit,
}

struct LifecycleInner {
    state: LifecycleState,
    on_exit: Option<ExitCallback>,
}

/// Lifecycle state machine and exit callback slot.
pub(crate) struct Lifecycle {
    quit_latch: AtomicBool,
    inner: Mutex<LifecycleInner>,
}

impl Lifecycle {
    pub(crate) fn new() -> Self {
        Self {
            quit_latch: AtomicBool::new(false),
            inner: Mutex::new(LifecycleInner {
                state: LifecycleState::Unstarted,
                on_exit: None,
            }),
        }
    }

    pub(crate) fn state(&self) -> LifecycleState {
        self.inner.lock().state
    }

    /// Transition `Unstarted -> Running`, storing the exit callback.
    ///
    /// Returns `false` (and drops `on_exit`) if the tray was already
    /// registered or has quit.
    pub(crate) fn begin(&self, on_exit: ExitCallback) -> bool {
        let mut inner = self.inner.lock();
        if inner.state != LifecycleState::Unstarted {
            return false;
        }
        inner.state = LifecycleState::Running;
        inner.on_exit = Some(on_exit);
        true
    }

    /// Attempt the transition to `Quit`.
    ///
    /// Exactly one caller over the lifetime of the tray receives `Some`,
    /// carrying the stored exit callback if one was registered.
    pub(crate) fn request_quit(&self) -> Option<Option<ExitCallback>> {
        if self
            .quit_latch
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return None;
        }

        let mut inner = self.inner.lock();
        inner.state = LifecycleState::Quit;
        Some(inner.on_exit.take())
    }
}
