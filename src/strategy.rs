pub mod catalog;
pub mod generator;

use crate::error::Result;

/// Generation policy used by [`Pool`](crate::Pool) to produce new inventory.
///
/// A strategy is only ever driven while the pool's refill lock is held, so
/// implementations can keep plain mutable bookkeeping without their own
/// synchronization.
pub trait Strategy {
    /// What the pool stores in its snapshot and hands out from `take`.
    type Handle: Clone;

    /// Produces the next handle. An error aborts the refill in progress.
    fn next_token(&mut self) -> Result<Self::Handle>;

    /// Restarts the strategy's generation sequence.
    fn reset(&mut self) {}
}
