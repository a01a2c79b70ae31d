use std::{fmt, sync::Mutex};

use thiserror::Error;
use tokio::sync::{Notify, Semaphore};

/// Error returned when waiting on a [`PendingResultSlot`] that has been closed.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SlotError {
    #[allow(missing_docs)]
    #[error("The pending result slot has been closed")]
    Closed,
}

/// Returned by [`PendingResultSlot::put`] when the slot is closed. Hands the rejected item back
/// so the caller can still answer it.
pub struct PutError<T>(pub T);

impl<T> PutError<T> {
    /// Recover the item that could not be placed in the slot.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Debug for PutError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PutError(..)")
    }
}

impl<T> fmt::Display for PutError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("The pending result slot has been closed")
    }
}

impl<T> std::error::Error for PutError<T> {}

struct SlotState<T> {
    item: Option<T>,
    /// Entries removed through [`PendingResultSlot::abandon_if`] whose completion event has not
    /// arrived yet.
    abandoned: usize,
    closed: bool,
}

/// A capacity-one rendezvous between the task that starts an operation and the task that
/// completes it.
///
/// - [`put`](Self::put) suspends while another item is resident. Items are never overwritten
///   or dropped, and waiting producers are admitted in arrival order.
/// - [`pop`](Self::pop) suspends until an item is resident, then removes it.
///
/// Both operations suspend the calling task instead of blocking the thread. The slot offers no
/// way to ask whether it is occupied.
pub struct PendingResultSlot<T> {
    state: Mutex<SlotState<T>>,
    vacancy: Semaphore,
    occupied: Notify,
}

impl<T> Default for PendingResultSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PendingResultSlot<T> {
    #[allow(missing_docs)]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SlotState {
                item: None,
                abandoned: 0,
                closed: false,
            }),
            vacancy: Semaphore::new(1),
            occupied: Notify::new(),
        }
    }

    /// Place an item in the slot, waiting for it to be vacated first if necessary.
    pub async fn put(&self, item: T) -> Result<(), PutError<T>> {
        let Ok(permit) = self.vacancy.acquire().await else {
            return Err(PutError(item));
        };

        let mut state = self.lock();
        if state.closed {
            return Err(PutError(item));
        }

        // The permit is handed back by whichever call removes the item.
        permit.forget();
        state.item = Some(item);
        drop(state);

        self.occupied.notify_one();
        Ok(())
    }

    /// Remove the resident item, waiting for one to arrive if the slot is empty.
    pub async fn pop(&self) -> Result<T, SlotError> {
        loop {
            let notified = self.occupied.notified();
            {
                let mut state = self.lock();
                if let Some(item) = self.vacate(&mut state) {
                    return Ok(item);
                }
                if state.closed {
                    return Err(SlotError::Closed);
                }
            }
            notified.await;
        }
    }

    /// Like [`pop`](Self::pop), but first accounts for entries that were given up through
    /// [`abandon_if`](Self::abandon_if). While such entries are outstanding each call consumes
    /// one of them and returns `None` without touching the resident item, so a completion that
    /// arrives late is never paired with a newer entry.
    pub async fn pop_unless_abandoned(&self) -> Result<Option<T>, SlotError> {
        loop {
            let notified = self.occupied.notified();
            {
                let mut state = self.lock();
                if state.abandoned > 0 {
                    state.abandoned -= 1;
                    return Ok(None);
                }
                if let Some(item) = self.vacate(&mut state) {
                    return Ok(Some(item));
                }
                if state.closed {
                    return Err(SlotError::Closed);
                }
            }
            notified.await;
        }
    }

    /// Remove the resident item without waiting, but only if it satisfies `predicate`.
    pub fn take_if(&self, predicate: impl FnOnce(&T) -> bool) -> Option<T> {
        let mut state = self.lock();
        if !state.item.as_ref().is_some_and(predicate) {
            return None;
        }
        self.vacate(&mut state)
    }

    /// Remove the resident item if it satisfies `predicate` and remember that the completion
    /// belonging to it is still outstanding. See [`pop_unless_abandoned`](Self::pop_unless_abandoned).
    pub fn abandon_if(&self, predicate: impl FnOnce(&T) -> bool) -> Option<T> {
        let mut state = self.lock();
        if !state.item.as_ref().is_some_and(predicate) {
            return None;
        }
        state.abandoned += 1;
        self.vacate(&mut state)
    }

    /// Forget every entry given up through [`abandon_if`](Self::abandon_if), so the next
    /// completion goes to the resident item again. Returns how many were forgotten.
    pub fn clear_abandoned(&self) -> usize {
        std::mem::take(&mut self.lock().abandoned)
    }

    /// Close the slot. Every suspended and future `put`/`pop` fails, and the resident item, if
    /// any, is returned so it can be answered.
    pub fn close(&self) -> Option<T> {
        let mut state = self.lock();
        state.closed = true;
        let item = state.item.take();
        drop(state);

        self.vacancy.close();
        self.occupied.notify_waiters();
        item
    }

    fn vacate(&self, state: &mut SlotState<T>) -> Option<T> {
        let item = state.item.take();
        if item.is_some() {
            self.vacancy.add_permits(1);
        }
        item
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SlotState<T>> {
        self.state.lock().expect("Mutex is not poisoned")
    }
}
