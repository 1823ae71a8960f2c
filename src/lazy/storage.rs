//! Per-instance slots, one per thread.
//!
//! Slots live in a `thread_local::ThreadLocal` owned by the instance, so
//! dropping the instance frees every thread's value at once. That crate hands
//! the id of an exited thread to the next new thread, together with whatever
//! the old thread left behind. Each entry therefore remembers the token of
//! the thread that filled it, and a mismatch is treated as an empty slot.

use std::cell::Cell;
use std::sync::atomic::{AtomicU64, Ordering};

use thread_local::ThreadLocal;

use super::slot::{Slot, SlotCell};
use crate::error::{Error, LResult};

/// Identity of a running thread. Unlike `ThreadLocal` ids, tokens are never
/// handed out twice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ThreadToken(u64);

struct TokenHolder(ThreadToken);

impl Drop for TokenHolder {
    fn drop(&mut self) {
        tracing::trace!(thread = self.0 .0, "thread-local slots retired");
    }
}

thread_local! {
    static TOKEN: TokenHolder = TokenHolder(ThreadToken::next());
}

impl ThreadToken {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    fn current() -> LResult<Self> {
        TOKEN
            .try_with(|holder| holder.0)
            .map_err(|_| Error::StorageDestroyed)
    }
}

struct Entry<T> {
    owner: Cell<ThreadToken>,
    slot: SlotCell<T>,
}

pub(crate) struct Slots<T: Send>(ThreadLocal<Entry<T>>);

impl<T: Send> Slots<T> {
    pub(crate) fn new() -> Self {
        Self(ThreadLocal::new())
    }

    /// This thread's slot, created in the `init` state on first touch.
    pub(crate) fn current(&self, init: fn() -> Slot<T>) -> LResult<&SlotCell<T>> {
        // Taking the token first registers its destructor ahead of the
        // `ThreadLocal` id guard, so the guard is torn down first.
        let token = ThreadToken::current()?;

        let entry = self.0.get_or(|| Entry {
            owner: Cell::new(token),
            slot: SlotCell::new(init()),
        });

        if entry.owner.replace(token) != token {
            let stale = entry.slot.replace(init());
            drop(stale);
        }

        Ok(&entry.slot)
    }

    /// This thread's slot, without creating one.
    pub(crate) fn peek(&self) -> Option<&SlotCell<T>> {
        let token = ThreadToken::current().ok()?;
        self.0
            .get()
            .filter(|entry| entry.owner.get() == token)
            .map(|entry| &entry.slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_are_unique() {
        assert_ne!(ThreadToken::next(), ThreadToken::next());

        let here = ThreadToken::current().unwrap();
        let there = std::thread::spawn(|| ThreadToken::current().unwrap())
            .join()
            .unwrap();
        assert_ne!(here, there);
    }

    #[test]
    fn test_slot_created_once() {
        let slots = Slots::<u8>::new();
        assert!(slots.peek().is_none());

        let first = slots.current(Slot::default).unwrap();
        *first.borrow_mut() = Slot::Set(5);

        let again = slots.current(|| unreachable!()).unwrap();
        assert!(std::ptr::eq(first, again));
        assert!(slots.peek().is_some_and(|cell| cell.borrow().is_set()));
    }

    #[test]
    fn test_slots_stay_on_their_thread() {
        let slots = Slots::<u8>::new();
        *slots.current(Slot::default).unwrap().borrow_mut() = Slot::Set(1);

        std::thread::scope(|s| {
            let seen_elsewhere = s.spawn(|| slots.peek().is_some()).join().unwrap();
            assert!(!seen_elsewhere);
        });
    }

    #[test]
    fn test_exited_thread_leaves_nothing_behind() {
        let slots = Slots::<u8>::new();

        for _ in 0..4 {
            std::thread::scope(|s| {
                s.spawn(|| {
                    let cell = slots.current(Slot::default).unwrap();
                    assert!(!cell.borrow().is_set());
                    *cell.borrow_mut() = Slot::Set(9);
                })
                .join()
                .unwrap();
            });
        }
    }
}
