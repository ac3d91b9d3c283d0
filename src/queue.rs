//! Thread-safe drop-boxes (§4.4): producers on any thread append items; the
//! audio thread drains the whole queue atomically once per block.
//!
//! A `Mutex<Vec<T>>` with `mem::take` gives exactly the semantics the spec
//! asks for — the drain is an atomic swap-with-empty, and the lock is held
//! only for the swap itself, never across a generator `pull` or callback.

use std::sync::Mutex;

pub struct PendingQueue<T> {
    items: Mutex<Vec<T>>,
}

impl<T> PendingQueue<T> {
    pub fn new() -> Self {
        Self {
            items: Mutex::new(Vec::new()),
        }
    }

    /// Append one item. Safe to call from any thread, including concurrently
    /// with a `drain` on the audio thread.
    pub fn push(&self, item: T) {
        self.items.lock().unwrap().push(item);
    }

    /// Append a batch of items, preserving relative order.
    pub fn push_many(&self, more: impl IntoIterator<Item = T>) {
        self.items.lock().unwrap().extend(more);
    }

    /// Atomically take everything queued so far, leaving the queue empty.
    /// Items pushed after this call returns are not included, even if they
    /// arrive before `drain` returns to its caller.
    pub fn drain(&self) -> Vec<T> {
        std::mem::take(&mut *self.items.lock().unwrap())
    }

    pub fn clear(&self) {
        self.items.lock().unwrap().clear();
    }
}

impl<T> Default for PendingQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
