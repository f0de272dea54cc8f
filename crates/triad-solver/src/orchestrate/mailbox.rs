use parking_lot::{Condvar, Mutex};

struct Slot<T> {
    value: Option<T>,
    closed: bool,
}

/// Depth-one handoff channel: a new post replaces any value that has not
/// been taken yet, so the consumer always sees the newest state and never
/// works through a backlog. A value already taken is unaffected.
pub struct Mailbox<T> {
    slot: Mutex<Slot<T>>,
    ready: Condvar,
}

impl<T> Mailbox<T> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(Slot {
                value: None,
                closed: false,
            }),
            ready: Condvar::new(),
        }
    }

    /// Deposit a value, overwriting any undelivered predecessor.
    pub fn post(&self, value: T) {
        let mut slot = self.slot.lock();
        if slot.closed {
            return;
        }
        slot.value = Some(value);
        self.ready.notify_one();
    }

    /// Block until a value arrives. Returns `None` once the mailbox is
    /// closed and drained.
    pub fn take(&self) -> Option<T> {
        let mut slot = self.slot.lock();
        loop {
            if let Some(value) = slot.value.take() {
                return Some(value);
            }
            if slot.closed {
                return None;
            }
            self.ready.wait(&mut slot);
        }
    }

    /// Non-blocking variant of `take`.
    pub fn try_take(&self) -> Option<T> {
        self.slot.lock().value.take()
    }

    pub fn close(&self) {
        let mut slot = self.slot.lock();
        slot.closed = true;
        self.ready.notify_all();
    }
}

impl<T> Default for Mailbox<T> {
    fn default() -> Self {
        Self::new()
    }
}
