//! Change signals for the object model.
//!
//! A [`Signal<Args>`] keeps a table of slots and calls each one, oldest
//! first, on every [`Signal::emit`]. Each stylesheet owns one signal and emits
//! it once per successful mutation anywhere in its rule tree.
//!
//! Slots run after the table lock is released. A slot may read or mutate the
//! tree that emitted, and may connect or disconnect slots on the same signal;
//! a slot connected mid-emission first runs on the next emission.
//!
//! ```
//! use lattice_cssom_core::Signal;
//!
//! let changed = Signal::<&'static str>::new();
//! let id = changed.connect(|what| println!("changed: {}", what));
//!
//! assert_eq!(changed.emit("rule inserted"), 1);
//! assert!(changed.disconnect(id));
//! assert_eq!(changed.emit("rule deleted"), 0);
//! ```

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use crate::logging::targets;

new_key_type! {
    /// Handle to one connected slot, for [`Signal::disconnect`].
    pub struct ConnectionId;
}

type Slot<Args> = Arc<dyn Fn(&Args) + Send + Sync>;
type SlotTable<Args> = Mutex<SlotMap<ConnectionId, Slot<Args>>>;

/// A list of callbacks invoked synchronously on the emitting thread.
pub struct Signal<Args> {
    slots: Arc<SlotTable<Args>>,
}

impl<Args: 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args> std::fmt::Debug for Signal<Args> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("slots", &self.slots.lock().len())
            .finish()
    }
}

impl<Args: 'static> Signal<Args> {
    pub fn new() -> Self {
        Self {
            slots: Arc::new(Mutex::new(SlotMap::with_key())),
        }
    }

    /// Connect `slot`; it stays connected until [`Signal::disconnect`].
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        let id = self.slots.lock().insert(Arc::new(slot));
        tracing::trace!(target: targets::SIGNAL, ?id, "slot connected");
        id
    }

    /// Connect `slot` for as long as the returned guard lives.
    ///
    /// The guard holds the table weakly and may outlive the signal.
    pub fn connect_scoped<F>(&self, slot: F) -> ConnectionGuard<Args>
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        ConnectionGuard {
            slots: Arc::downgrade(&self.slots),
            id: self.connect(slot),
        }
    }

    /// Disconnect a slot. Returns `false` if it was already gone.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.slots.lock().remove(id).is_some()
    }

    /// Number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.slots.lock().len()
    }

    /// Call every connected slot with `args`, returning how many ran.
    pub fn emit(&self, args: Args) -> usize {
        let snapshot: Vec<Slot<Args>> = self.slots.lock().values().cloned().collect();
        tracing::trace!(target: targets::SIGNAL, slots = snapshot.len(), "emit");
        for slot in &snapshot {
            slot(&args);
        }
        snapshot.len()
    }
}

/// Disconnects its slot when dropped. See [`Signal::connect_scoped`].
pub struct ConnectionGuard<Args> {
    slots: Weak<SlotTable<Args>>,
    id: ConnectionId,
}

impl<Args> ConnectionGuard<Args> {
    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

impl<Args> Drop for ConnectionGuard<Args> {
    fn drop(&mut self) {
        if let Some(slots) = self.slots.upgrade() {
            slots.lock().remove(self.id);
        }
    }
}

static_assertions::assert_impl_all!(Signal<()>: Send, Sync);
static_assertions::assert_impl_all!(ConnectionGuard<()>: Send, Sync);
