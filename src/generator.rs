use std::num::NonZeroUsize;

use tracing::debug;

use crate::error::{BoxError, Result};
use crate::pool::Pool;
use crate::strategy::generator::Generator;

/// A token pool filled by a caller supplied generator function.
///
/// Generated tokens are stored as they are and handed out in generation
/// order. A failing generator aborts the refill in progress and its error is
/// returned from [`take`](Self::take) as [`Error::Generator`].
///
/// Tokens are cloned once when they are taken out of the pool; the tokens
/// left behind are shared, not copied.
///
/// [`Error::Generator`]: crate::Error::Generator
///
/// # Examples
///
/// ```rust
/// use std::num::NonZeroUsize;
///
/// use tokenpool::GeneratorPool;
///
/// let mut next = 0u32;
/// let pool = GeneratorPool::new(NonZeroUsize::new(8).unwrap(), move || {
///     next += 1;
///     Ok(next)
/// });
///
/// assert_eq!((1..=8).collect::<Vec<_>>(), pool.take(8).unwrap());
/// ```
pub struct GeneratorPool<T: Clone> {
    pool: Pool<Generator<T>>,
}

impl<T: Clone> GeneratorPool<T> {
    /// Creates an empty pool. The first [`take`](Self::take) fills it.
    ///
    /// # Arguments
    ///
    /// * `capacity` - The maximum number of tokens the pool holds
    /// * `generator` - Called once per missing token on every refill
    pub fn new<F>(capacity: NonZeroUsize, generator: F) -> Self
    where
        F: FnMut() -> std::result::Result<T, BoxError> + Send + 'static,
    {
        Self {
            pool: Pool::new(capacity, Generator::new(generator)),
        }
    }

    /// Takes exactly `n` tokens, refilling the pool if it comes up short.
    ///
    /// See [`Pool::take`].
    pub fn take(&self, n: usize) -> Result<Vec<T>> {
        self.pool.take(n)
    }

    /// Replaces the generator function.
    ///
    /// A refill already running keeps using the previous function; the new
    /// one is used from the next refill on. Tokens already in the pool are
    /// kept.
    pub fn load_strategy<F>(&self, generator: F)
    where
        F: FnMut() -> std::result::Result<T, BoxError> + Send + 'static,
    {
        self.pool.with_strategy(|strategy| {
            strategy.replace(generator);
        });
        debug!("generator replaced");
    }

    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    /// Number of tokens ready to be dispensed without a refill.
    pub fn remaining(&self) -> usize {
        self.pool.remaining()
    }

    /// Tops the pool up to its capacity ahead of demand.
    pub fn refill(&self) -> Result<usize> {
        self.pool.refill()
    }

    /// Discards every pending token.
    pub fn drain(&self) {
        self.pool.drain();
    }
}
