/// Boxed error returned by generators and codecs.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned by pool operations.
///
/// Errors are never retried by the pool. The only internal retry is the
/// "dequeue short, refill, dequeue again" cycle of [`Pool::take`], which is
/// abandoned on the first refill error.
///
/// [`Pool::take`]: crate::Pool::take
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request can never be served because it exceeds what the pool can
    /// hold, regardless of how many tokens are currently available.
    #[error("cannot take {requested} tokens from a pool with capacity {capacity}")]
    CapacityExceeded { requested: usize, capacity: usize },

    /// A catalog-backed pool was asked to refill before any element was added.
    #[error("catalog should have at least 1 element")]
    EmptyCatalog,

    /// The generator function failed; the refill was abandoned.
    #[error("token generation failed: {0}")]
    Generator(#[source] BoxError),

    /// The codec could not encode a catalog entry.
    #[error("failed to encode token: {0}")]
    Encode(#[source] BoxError),

    /// The codec could not decode a selected catalog entry.
    #[error("failed to decode token: {0}")]
    Decode(#[source] BoxError),
}

/// Result alias for pool operations.
pub type Result<T> = std::result::Result<T, Error>;
