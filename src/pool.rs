use std::num::NonZeroUsize;

use likely_stable::unlikely;
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::snapshot::Snapshot;
use crate::strategy::Strategy;

/// A bounded pool of pre-generated tokens that refills itself on demand.
///
/// Reads are served lock-free from an immutable snapshot of the pending
/// tokens. When a request cannot be served from the snapshot, the caller
/// takes the refill lock, tops the pool back up to its capacity using the
/// [`Strategy`] and tries again.
///
/// This is a lazily refilled pool, not a rate limiter: there is no notion of
/// time and a refill happens only when a request comes up short.
///
/// # Type Parameters
///
/// - `S`: the generation [`Strategy`], driven only while the refill lock is held
///
/// # Examples
///
/// ```rust
/// use std::num::NonZeroUsize;
///
/// use tokenpool::Pool;
/// use tokenpool::strategy::generator::Generator;
///
/// let mut next = 0u64;
/// let pool = Pool::new(
///     NonZeroUsize::new(8).unwrap(),
///     Generator::new(move || {
///         next += 1;
///         Ok(next)
///     }),
/// );
///
/// assert_eq!(vec![1, 2, 3], pool.take(3).unwrap());
/// assert_eq!(5, pool.remaining());
/// ```
pub struct Pool<S: Strategy> {
    snapshot: Snapshot<S::Handle>,
    strategy: Mutex<S>,
    capacity: NonZeroUsize,
}

impl<S: Strategy> Pool<S> {
    /// Creates an empty pool. The first [`take`](Self::take) fills it.
    ///
    /// # Arguments
    ///
    /// * `capacity` - The maximum number of tokens the pool holds
    /// * `strategy` - How new tokens are generated
    pub fn new(capacity: NonZeroUsize, strategy: S) -> Self {
        Self {
            snapshot: Snapshot::new(),
            strategy: Mutex::new(strategy),
            capacity,
        }
    }

    /// The maximum number of tokens the pool holds and the largest batch a
    /// single [`take`](Self::take) may request.
    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// Number of tokens ready to be dispensed without a refill.
    pub fn remaining(&self) -> usize {
        self.snapshot.len()
    }

    /// A copy of the tokens ready to be dispensed, in dispensing order.
    pub fn pending(&self) -> Vec<S::Handle> {
        self.snapshot.load()
    }

    /// Takes exactly `n` tokens from the pool.
    ///
    /// If fewer than `n` tokens are pending, nothing is consumed; the pool is
    /// refilled to capacity and the request is retried. Without refill errors
    /// a single refill is enough, although concurrent takers may drain the
    /// pool again in between and cause another round.
    ///
    /// Tokens are dispensed in the order they were generated.
    ///
    /// # Returns
    ///
    /// * `Ok(tokens)` - Exactly `n` tokens
    /// * `Err(Error::CapacityExceeded)` - `n` is larger than the capacity;
    ///   the pool is left untouched
    /// * `Err(_)` - The strategy failed while refilling; tokens generated by
    ///   the failed refill are discarded
    pub fn take(&self, n: usize) -> Result<Vec<S::Handle>> {
        if unlikely(n > self.capacity.get()) {
            return Err(Error::CapacityExceeded {
                requested: n,
                capacity: self.capacity.get(),
            });
        }
        loop {
            if let Some(batch) = self.snapshot.dequeue(n) {
                return Ok(batch);
            }
            trace!(requested = n, remaining = self.remaining(), "pool short, refilling");
            self.refill()?;
        }
    }

    /// Tops the pool up to its capacity.
    ///
    /// Refills are serialized. A caller that waited for the lock recomputes
    /// what is missing against the current snapshot, which is nothing if
    /// another refill already satisfied the demand.
    ///
    /// Generated tokens become visible all at once after the strategy has
    /// produced every missing token. If the strategy fails, the tokens of this
    /// refill are dropped and the error is returned; tokens of earlier refills
    /// stay in the pool.
    ///
    /// # Returns
    ///
    /// The number of tokens generated.
    pub fn refill(&self) -> Result<usize> {
        let mut strategy = self.strategy.lock();
        let missing = self.capacity.get().saturating_sub(self.snapshot.len());
        if missing == 0 {
            trace!("pool already full");
            return Ok(0);
        }
        let tokens = (0..missing)
            .map(|_| strategy.next_token())
            .collect::<Result<Vec<_>>>()?;
        self.snapshot.put(tokens);
        debug!(generated = missing, capacity = self.capacity.get(), "pool refilled");
        Ok(missing)
    }

    /// Discards every pending token without touching the strategy.
    pub fn drain(&self) {
        self.snapshot.drain();
    }

    /// Discards every pending token and restarts the strategy's sequence.
    pub fn reset(&self) {
        let mut strategy = self.strategy.lock();
        strategy.reset();
        self.snapshot.drain();
        debug!("pool reset");
    }

    /// Runs `f` with exclusive access to the strategy.
    ///
    /// Holds the refill lock for the duration of `f`, so no refill observes a
    /// half-applied change.
    pub fn with_strategy<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        let mut strategy = self.strategy.lock();
        f(&mut strategy)
    }
}
