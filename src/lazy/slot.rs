use std::cell::RefCell;

use crate::error::{Error, LResult};

/// State of one instance's value on one thread.
#[derive(Debug)]
pub(crate) enum Slot<T> {
    Unset,
    /// The producer is running on this thread right now.
    Computing,
    Set(T),
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self::Unset
    }
}

impl<T> Slot<T> {
    /// Seeing our own `Computing` marker means the producer came back around
    /// to this slot.
    pub(crate) const fn cached(&self) -> LResult<Option<&T>> {
        match self {
            Self::Set(v) => Ok(Some(v)),
            Self::Unset => Ok(None),
            Self::Computing => Err(Error::ReentrantComputation),
        }
    }

    pub(crate) fn into_value(self) -> Option<T> {
        match self {
            Self::Set(v) => Some(v),
            Self::Unset | Self::Computing => None,
        }
    }

    pub(crate) const fn is_set(&self) -> bool {
        matches!(self, Self::Set(_))
    }
}

pub(crate) type SlotCell<T> = RefCell<Slot<T>>;

/// Holds a slot in `Computing` and puts it back to `Unset` when dropped,
/// unless a value was stored first. Covers both producer errors and panics.
pub(crate) struct ComputeGuard<'a, T> {
    cell: &'a SlotCell<T>,
    done: bool,
}

impl<'a, T> ComputeGuard<'a, T> {
    pub(crate) fn enter(cell: &'a SlotCell<T>) -> Self {
        *cell.borrow_mut() = Slot::Computing;
        Self { cell, done: false }
    }

    pub(crate) fn store(mut self, value: T) {
        *self.cell.borrow_mut() = Slot::Set(value);
        self.done = true;
    }
}

impl<T> Drop for ComputeGuard<'_, T> {
    fn drop(&mut self) {
        if self.done {
            return;
        }

        if let Ok(mut slot) = self.cell.try_borrow_mut() {
            if matches!(*slot, Slot::Computing) {
                *slot = Slot::Unset;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_rolls_back() {
        let cell: SlotCell<u8> = RefCell::default();
        {
            let _guard = ComputeGuard::enter(&cell);
            assert_eq!(
                cell.borrow().cached().unwrap_err(),
                Error::ReentrantComputation
            );
        }
        assert!(matches!(cell.borrow().cached(), Ok(None)));
    }

    #[test]
    fn test_guard_store_keeps_value() {
        let cell: SlotCell<u8> = RefCell::default();
        ComputeGuard::enter(&cell).store(3);
        assert!(cell.borrow().is_set());
        assert_eq!(cell.borrow().cached(), Ok(Some(&3)));
        assert_eq!(cell.take().into_value(), Some(3));
        assert!(!cell.borrow().is_set());
    }
}
