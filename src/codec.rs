#[cfg(feature = "postcard")]
mod postcard;

#[cfg(feature = "postcard")]
pub use self::postcard::PostcardCodec;

use crate::error::BoxError;

/// Converts tokens of type `T` to and from the opaque bytes a catalog stores.
///
/// The byte format belongs to the implementation; the only requirement is
/// that `decode(encode(t))` yields a token equal to `t`.
pub trait Codec<T> {
    /// Serializes a token.
    fn encode(&self, token: &T) -> Result<Box<[u8]>, BoxError>;
    /// Builds a fresh token from bytes produced by [`encode`](Self::encode).
    fn decode(&self, raw: &[u8]) -> Result<T, BoxError>;
}
