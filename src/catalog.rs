use std::marker::PhantomData;
use std::num::NonZeroUsize;
use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::debug;

use crate::codec::Codec;
#[cfg(feature = "postcard")]
use crate::codec::PostcardCodec;
use crate::error::{Error, Result};
use crate::pool::Pool;
use crate::strategy::catalog::RoundRobin;

/// A token pool drawing from a fixed catalog of token blueprints.
///
/// Each blueprint is stored in its encoded form along with a weight. Refills
/// select blueprints round-robin in insertion order and the pool keeps the
/// selected catalog indices; tokens are decoded into fresh `T` values only
/// when they are taken.
///
/// The weight of an entry is recorded and reported but does not bias
/// selection: a catalog `[A, B, C, D]` always dispenses `A, B, C, D, A, ...`.
///
/// # Type Parameters
///
/// - `T`: the token type, fixed for the lifetime of the pool
/// - `C`: the [`Codec`] turning tokens into bytes and back
///
/// # Examples
///
/// ```rust
/// # #[cfg(feature = "postcard")]
/// # {
/// use std::num::NonZeroUsize;
///
/// use tokenpool::CatalogPool;
///
/// let pool = CatalogPool::<String, _>::new(NonZeroUsize::new(10).unwrap());
/// for name in ["A", "B", "C", "D"] {
///     pool.add_elem(&name.to_owned(), 1.0).unwrap();
/// }
///
/// assert_eq!(vec!["A"], pool.take(1).unwrap());
/// assert_eq!(vec!["B", "C", "D", "A", "B"], pool.take(5).unwrap());
/// assert!(pool.take(11).is_err());
/// # }
/// ```
pub struct CatalogPool<T, C> {
    pool: Pool<RoundRobin>,
    entries: ArcSwap<Vec<Arc<[u8]>>>,
    codec: C,
    _token: PhantomData<fn() -> T>,
}

#[cfg(feature = "postcard")]
impl<T> CatalogPool<T, PostcardCodec>
where
    T: serde::Serialize + serde::de::DeserializeOwned,
{
    /// Creates an empty catalog pool encoding tokens with [`PostcardCodec`].
    ///
    /// # Arguments
    ///
    /// * `capacity` - The maximum number of tokens the pool holds
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self::with_codec(capacity, PostcardCodec::new())
    }
}

impl<T, C: Codec<T>> CatalogPool<T, C> {
    /// Creates an empty catalog pool with a custom codec.
    ///
    /// # Arguments
    ///
    /// * `capacity` - The maximum number of tokens the pool holds
    /// * `codec` - Encodes catalog entries and decodes taken tokens
    pub fn with_codec(capacity: NonZeroUsize, codec: C) -> Self {
        Self {
            pool: Pool::new(capacity, RoundRobin::new()),
            entries: ArcSwap::from_pointee(Vec::new()),
            codec,
            _token: PhantomData,
        }
    }

    /// Adds a blueprint to the catalog.
    ///
    /// The token is encoded immediately; if the codec fails, the error is
    /// returned as [`Error::Encode`] and the catalog is unchanged. Entries can
    /// not be removed.
    ///
    /// # Arguments
    ///
    /// * `token` - The blueprint
    /// * `weight` - Recorded with the entry, see [`weights`](Self::weights)
    pub fn add_elem(&self, token: &T, weight: f64) -> Result<()> {
        let raw: Arc<[u8]> = self.codec.encode(token).map_err(Error::Encode)?.into();
        let size = raw.len();
        let index = self.pool.with_strategy(|rr| {
            // publish the bytes before the index can be selected
            let mut entries = Vec::clone(&self.entries.load());
            entries.push(raw);
            self.entries.store(Arc::new(entries));
            rr.register(weight)
        });
        debug!(index, weight, size, "catalog element added");
        Ok(())
    }

    /// Takes exactly `n` tokens, decoded in selection order.
    ///
    /// See [`take_into`](Self::take_into).
    pub fn take(&self, n: usize) -> Result<Vec<T>> {
        let mut tokens = Vec::new();
        self.take_into(&mut tokens, n)?;
        Ok(tokens)
    }

    /// Takes exactly `n` tokens and appends them to `dest` in selection order.
    ///
    /// Either all `n` tokens are appended or `dest` is left as it was. A
    /// decoding failure is returned as [`Error::Decode`]; the selected
    /// entries are consumed from the pool regardless.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - `n` tokens were appended to `dest`
    /// * `Err(Error::CapacityExceeded)` - `n` is larger than the capacity
    /// * `Err(Error::EmptyCatalog)` - a refill was needed but the catalog is empty
    /// * `Err(Error::Decode)` - the codec failed on a selected entry
    pub fn take_into(&self, dest: &mut Vec<T>, n: usize) -> Result<()> {
        let indices = self.pool.take(n)?;
        let entries = self.entries.load();
        let tokens = indices
            .into_iter()
            .map(|index| self.codec.decode(&entries[index]).map_err(Error::Decode))
            .collect::<Result<Vec<_>>>()?;
        dest.extend(tokens);
        Ok(())
    }

    /// How many times each entry has been selected by a refill, in
    /// insertion order.
    pub fn occurrence(&self) -> Vec<u64> {
        self.pool.with_strategy(|rr| rr.occurrence().to_vec())
    }

    /// The weight recorded for each entry, in insertion order.
    pub fn weights(&self) -> Vec<f64> {
        self.pool.with_strategy(|rr| rr.weights().to_vec())
    }

    pub fn total_weight(&self) -> f64 {
        self.pool.with_strategy(|rr| rr.total_weight())
    }

    /// Number of entries in the catalog.
    pub fn len(&self) -> usize {
        self.entries.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
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

    /// Discards every pending token and restarts the round-robin cycle at
    /// the first entry. Selection counts are kept.
    pub fn reset(&self) {
        self.pool.reset();
    }
}

#[cfg(all(test, feature = "postcard"))]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use nonzero_ext::nonzero;
    use serde::{Deserialize, Serialize};

    use crate::error::BoxError;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Token {
        id: u32,
        name: String,
    }

    fn token(id: u32, name: &str) -> Token {
        Token {
            id,
            name: name.to_owned(),
        }
    }

    fn a() -> Token {
        token(1, "A")
    }
    fn b() -> Token {
        token(2, "B")
    }
    fn c() -> Token {
        token(3, "C")
    }
    fn d() -> Token {
        token(4, "D")
    }

    /// Refuses to encode id 0 and fails every decode once switched on.
    #[derive(Default)]
    struct Flaky {
        inner: PostcardCodec,
        fail_decode: AtomicBool,
    }

    impl Codec<Token> for Flaky {
        fn encode(&self, token: &Token) -> std::result::Result<Box<[u8]>, BoxError> {
            if token.id == 0 {
                return Err("made up error".into());
            }
            self.inner.encode(token)
        }

        fn decode(&self, raw: &[u8]) -> std::result::Result<Token, BoxError> {
            if self.fail_decode.load(Ordering::Relaxed) {
                return Err("made up error".into());
            }
            self.inner.decode(raw)
        }
    }

    fn abcd() -> CatalogPool<Token, PostcardCodec> {
        let pool = CatalogPool::new(nonzero!(10usize));
        for t in [a(), b(), c(), d()] {
            pool.add_elem(&t, 1.0).unwrap();
        }
        pool
    }

    #[test]
    fn add_elem() {
        let pool = CatalogPool::with_codec(nonzero!(10usize), Flaky::default());
        pool.add_elem(&a(), 0.1).unwrap();
        assert_eq!(1, pool.len());
        match pool.add_elem(&token(0, "A"), 0.1) {
            Err(Error::Encode(source)) => assert_eq!("made up error", source.to_string()),
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(1, pool.len());
        assert_eq!(vec![0.1], pool.weights());
        assert_eq!(vec![0], pool.occurrence());
    }

    #[test]
    fn take_one() {
        let pool = abcd();
        assert_eq!(vec![a()], pool.take(1).unwrap());
        assert_eq!(9, pool.remaining());
    }

    #[test]
    fn takes_accumulate_into_destination() {
        let pool = abcd();
        let mut tokens = Vec::new();
        pool.take_into(&mut tokens, 2).unwrap();
        pool.take_into(&mut tokens, 2).unwrap();
        assert_eq!(vec![a(), b(), c(), d()], tokens);
    }

    #[test]
    fn takes_across_refills_keep_cycling() {
        let pool = abcd();
        let mut tokens = Vec::new();
        for n in [5, 6, 5] {
            pool.take_into(&mut tokens, n).unwrap();
        }
        let expected: Vec<Token> = [a(), b(), c(), d()].into_iter().cycle().take(16).collect();
        assert_eq!(expected, tokens);
    }

    #[test]
    fn scenario_take_beyond_capacity() {
        let pool = abcd();
        assert_eq!(vec![a()], pool.take(1).unwrap());
        assert_eq!(vec![b(), c(), d(), a(), b()], pool.take(5).unwrap());
        let mut tokens = vec![d()];
        assert!(matches!(
            pool.take_into(&mut tokens, 11),
            Err(Error::CapacityExceeded {
                requested: 11,
                capacity: 10
            })
        ));
        assert_eq!(vec![d()], tokens);
        assert_eq!(4, pool.remaining());
        assert_eq!(vec![c(), d(), a(), b()], pool.take(4).unwrap());
    }

    #[test]
    fn take_beyond_addressable_size() {
        let pool = abcd();
        assert_eq!(vec![a()], pool.take(1).unwrap());
        assert!(matches!(
            pool.take(usize::MAX),
            Err(Error::CapacityExceeded {
                requested: usize::MAX,
                capacity: 10
            })
        ));
        let mut tokens = Vec::new();
        assert!(matches!(
            pool.take_into(&mut tokens, usize::MAX / 2),
            Err(Error::CapacityExceeded { .. })
        ));
        assert!(tokens.is_empty());
        assert_eq!(9, pool.remaining());
    }

    #[test]
    fn weights_do_not_bias_selection() {
        let pool = CatalogPool::new(nonzero!(6usize));
        pool.add_elem(&a(), 100.0).unwrap();
        pool.add_elem(&b(), 0.5).unwrap();
        pool.add_elem(&c(), 0.0).unwrap();
        assert_eq!(vec![a(), b(), c(), a(), b(), c()], pool.take(6).unwrap());
        assert_eq!(vec![2, 2, 2], pool.occurrence());
        assert_eq!(100.5, pool.total_weight());
    }

    #[test]
    fn empty_catalog() {
        let pool = CatalogPool::<Token, _>::new(nonzero!(10usize));
        assert!(pool.is_empty());
        assert!(matches!(pool.take(5), Err(Error::EmptyCatalog)));
        assert_eq!(0, pool.remaining());
    }

    #[test]
    fn decoding_error_leaves_destination_untouched() {
        let pool = CatalogPool::with_codec(nonzero!(10usize), Flaky::default());
        for t in [a(), b(), c(), d()] {
            pool.add_elem(&t, 1.0).unwrap();
        }
        pool.codec.fail_decode.store(true, Ordering::Relaxed);
        let mut tokens = vec![a()];
        match pool.take_into(&mut tokens, 5) {
            Err(Error::Decode(source)) => assert_eq!("made up error", source.to_string()),
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(vec![a()], tokens);
        // the selected entries are gone all the same
        assert_eq!(5, pool.remaining());
    }

    #[test]
    fn occurrence_counts_refills() {
        let pool = abcd();
        pool.refill().unwrap();
        assert_eq!(vec![3, 3, 2, 2], pool.occurrence());
        assert_eq!(vec![a()], pool.take(1).unwrap());
        assert_eq!(1, pool.refill().unwrap());
        assert_eq!(vec![3, 3, 3, 2], pool.occurrence());
        assert_eq!(0, pool.refill().unwrap());
    }

    #[test]
    fn reset_restarts_cycle() {
        let pool = abcd();
        assert_eq!(vec![a(), b(), c()], pool.take(3).unwrap());
        pool.reset();
        assert_eq!(0, pool.remaining());
        assert_eq!(vec![a(), b()], pool.take(2).unwrap());
        assert_eq!(vec![6, 6, 4, 4], pool.occurrence());
    }

    #[test]
    fn entries_added_later_join_the_rotation() {
        let pool = CatalogPool::new(nonzero!(2usize));
        pool.add_elem(&a(), 1.0).unwrap();
        assert_eq!(vec![a(), a()], pool.take(2).unwrap());
        pool.add_elem(&b(), 1.0).unwrap();
        // 2 % 2 == 0, 3 % 2 == 1
        assert_eq!(vec![a(), b()], pool.take(2).unwrap());
    }

    #[test]
    fn concurrent_takers() {
        let pool = CatalogPool::new(nonzero!(5usize));
        for t in [a(), b(), c()] {
            pool.add_elem(&t, 1.0).unwrap();
        }
        let taken: usize = std::thread::scope(|s| {
            let handles: Vec<_> = (0..20usize)
                .map(|i| {
                    let pool = &pool;
                    s.spawn(move || {
                        let n = 5 - i % 5;
                        let tokens = pool.take(n).unwrap();
                        assert_eq!(n, tokens.len());
                        n
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).sum()
        });
        let generated: u64 = pool.occurrence().iter().sum();
        assert_eq!(generated as usize, taken + pool.remaining());
    }
}
