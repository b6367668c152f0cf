use std::fmt::{Debug, Formatter};

use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::Codec;
use crate::error::BoxError;

/// [`Codec`] backed by `postcard`, the default for any `serde` token type.
///
/// Encoding goes through a scratch buffer owned by the codec and reused
/// across calls.
#[derive(Default)]
pub struct PostcardCodec {
    scratch: Mutex<Vec<u8>>,
}

impl PostcardCodec {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T: Serialize + DeserializeOwned> Codec<T> for PostcardCodec {
    fn encode(&self, token: &T) -> Result<Box<[u8]>, BoxError> {
        let mut scratch = self.scratch.lock();
        let mut buf = std::mem::take(&mut *scratch);
        buf.clear();
        let buf = ::postcard::to_extend(token, buf)?;
        let encoded = Box::from(buf.as_slice());
        *scratch = buf;
        Ok(encoded)
    }

    fn decode(&self, raw: &[u8]) -> Result<T, BoxError> {
        Ok(::postcard::from_bytes(raw)?)
    }
}

impl Debug for PostcardCodec {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostcardCodec").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Shipping {
        name: String,
        config_id: u32,
    }

    #[test]
    fn round_trip() {
        let codec = PostcardCodec::new();
        let token = Shipping {
            name: "A".to_owned(),
            config_id: 1,
        };
        let raw = codec.encode(&token).unwrap();
        let decoded: Shipping = codec.decode(&raw).unwrap();
        assert_eq!(token, decoded);
    }

    #[test]
    fn scratch_buffer_does_not_leak_between_tokens() {
        let codec = PostcardCodec::new();
        let long = codec.encode(&"a much longer token".to_owned()).unwrap();
        let short = codec.encode(&"b".to_owned()).unwrap();
        assert!(short.len() < long.len());
        let decoded: String = codec.decode(&short).unwrap();
        assert_eq!("b", decoded);
    }

    #[test]
    fn truncated_input_fails_to_decode() {
        let codec = PostcardCodec::new();
        let raw = codec.encode(&"token".to_owned()).unwrap();
        let decoded: Result<String, _> = codec.decode(&raw[..raw.len() - 1]);
        assert!(decoded.is_err());
    }
}
