use tap::Pipe;

use crate::identity::Identity;
use crate::producer::{Infallible, Producer};

use self::slot::{ComputeGuard, Slot};
use self::storage::Slots;

mod slot;
mod storage;


type SentinelCheck<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

/// A value computed lazily, once per thread.
///
/// The first access from a thread runs the producer and caches its result in
/// that thread's private slot; later accesses from the same thread return the
/// cached value. A failing producer leaves the slot empty, so the next access
/// on that thread tries again.
///
/// ```
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use lazy_local::LazyThreadLocal;
///
/// static CALLS: AtomicU32 = AtomicU32::new(0);
///
/// let local = LazyThreadLocal::infallible(|| CALLS.fetch_add(1, Ordering::SeqCst) + 1);
/// assert_eq!(local.get_or_compute(), Ok(1));
/// assert_eq!(local.get_or_compute(), Ok(1));
/// assert_eq!(CALLS.load(Ordering::SeqCst), 1);
/// ```
pub struct LazyThreadLocal<P>
where
    P: Producer,
    P::Output: Send,
{
    slots: Slots<P::Output>,
    sentinel: Option<SentinelCheck<P::Output>>,
    producer: P,
}

impl<P> LazyThreadLocal<P>
where
    P: Producer,
    P::Output: Send + 'static,
{
    pub fn new(producer: P) -> Self {
        Self {
            slots: Slots::new(),
            sentinel: None,
            producer,
        }
    }

    /// Like [`Self::new`], but a produced value that *is* `sentinel` (see
    /// [`Identity`]) is handed out without being cached, so every access
    /// recomputes it. The producer is expected never to return it.
    pub fn with_sentinel(sentinel: P::Output, producer: P) -> Self
    where
        P::Output: Identity + Sync,
    {
        Self {
            slots: Slots::new(),
            sentinel: Some(Box::new(move |value: &P::Output| sentinel.is_same(value))),
            producer,
        }
    }

    pub(crate) const fn initial_value() -> Slot<P::Output> {
        Slot::Unset
    }

    /// Runs `f` against this thread's value, computing it on first use.
    pub fn with<R>(&self, f: impl FnOnce(&P::Output) -> R) -> Result<R, P::Error> {
        let cell = self.slots.current(Self::initial_value)?;

        if let Some(value) = cell.borrow().cached()? {
            return f(value).pipe(Ok);
        }

        tracing::trace!("computing thread-local value");

        let guard = ComputeGuard::enter(cell);
        let value = self.producer.produce()?;

        if self.is_sentinel(&value) {
            tracing::debug!("produced value is the sentinel, not caching it");
            drop(guard);
            return f(&value).pipe(Ok);
        }

        guard.store(value);
        tracing::trace!("stored thread-local value");

        self.with(f)
    }

    /// This thread's value, computed on first use.
    pub fn get_or_compute(&self) -> Result<P::Output, P::Error>
    where
        P::Output: Clone,
    {
        self.with(Clone::clone)
    }

    pub fn is_set(&self) -> bool {
        self.slots
            .peek()
            .is_some_and(|cell| cell.borrow().is_set())
    }

    /// Empties this thread's slot, so the next access runs the producer
    /// again, and returns the value that was cached.
    ///
    /// Does nothing while the slot is being computed or lent out through
    /// [`Self::with`].
    pub fn reset(&self) -> Option<P::Output> {
        let mut slot = self.slots.peek()?.try_borrow_mut().ok()?;
        let previous = slot
            .is_set()
            .then(|| std::mem::take(&mut *slot))
            .and_then(Slot::into_value);
        drop(slot);

        if previous.is_some() {
            tracing::trace!("reset thread-local value");
        }
        previous
    }

    fn is_sentinel(&self, value: &P::Output) -> bool {
        self.sentinel.as_ref().is_some_and(|is_same| is_same(value))
    }
}

impl<F, T> LazyThreadLocal<Infallible<F>>
where
    F: Fn() -> T,
    T: Send + 'static,
{
    pub fn infallible(producer: F) -> Self {
        Self::new(Infallible(producer))
    }
}

impl<T: Default + Send + 'static> Default for LazyThreadLocal<Infallible<fn() -> T>> {
    fn default() -> Self {
        Self::infallible(T::default as fn() -> T)
    }
}

impl<P> std::fmt::Debug for LazyThreadLocal<P>
where
    P: Producer,
    P::Output: Send,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(LazyThreadLocal))
            .field("sentinel", &self.sentinel.is_some())
            .finish_non_exhaustive()
    }
}
