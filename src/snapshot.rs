use std::sync::Arc;

use arc_swap::ArcSwap;

/// The "ready to dispense" inventory of a pool.
///
/// The pending handles are held as an immutable window behind an
/// [`ArcSwap`] and every mutation replaces the whole window, so readers never
/// observe a sequence under construction and never take a lock.
///
/// New handles are appended at the tail and dequeued from the head: handles
/// are dispensed in the order they were generated.
pub(crate) struct Snapshot<H> {
    inner: ArcSwap<Window<H>>,
}

/// Pending handles are `items[start..]`. A dequeue only moves `start`, so
/// the handles left behind are shared with the previous window, not copied.
struct Window<H> {
    items: Arc<[H]>,
    start: usize,
}

impl<H> Window<H> {
    fn empty() -> Self {
        Self {
            items: Arc::from(Vec::new()),
            start: 0,
        }
    }

    fn pending(&self) -> &[H] {
        &self.items[self.start..]
    }
}

impl<H: Clone> Snapshot<H> {
    pub fn new() -> Self {
        Self {
            inner: ArcSwap::from_pointee(Window::empty()),
        }
    }

    /// A copy of the pending handles, in dispensing order.
    pub fn load(&self) -> Vec<H> {
        self.inner.load().pending().to_vec()
    }

    /// Number of handles currently pending.
    pub fn len(&self) -> usize {
        self.inner.load().pending().len()
    }

    /// Removes the first `n` handles and returns them.
    ///
    /// Returns `None` without consuming anything if fewer than `n` handles are
    /// pending; a request is never served piecemeal. Only the `n` returned
    /// handles are cloned.
    ///
    /// Concurrent dequeuers race on a compare-and-swap of the whole window.
    /// The loser retries against the window installed by the winner, so two
    /// callers never receive the same handles.
    pub fn dequeue(&self, n: usize) -> Option<Vec<H>> {
        let mut current = self.inner.load();
        loop {
            if n > current.pending().len() {
                return None;
            }
            if n == 0 {
                return Some(Vec::new());
            }
            let head = current.pending()[..n].to_vec();
            let next = Arc::new(Window {
                items: Arc::clone(&current.items),
                start: current.start + n,
            });
            let previous = self.inner.compare_and_swap(&*current, next);
            if Arc::ptr_eq(&*current, &*previous) {
                return Some(head);
            }
            current = previous;
        }
    }

    /// Appends `items` to the pending handles.
    pub fn put(&self, items: Vec<H>) {
        if items.is_empty() {
            return;
        }
        self.inner.rcu(|current| Window {
            items: current.pending().iter().chain(&items).cloned().collect(),
            start: 0,
        });
    }

    /// Discards every pending handle.
    pub fn drain(&self) {
        self.inner.store(Arc::new(Window::empty()));
    }
}
