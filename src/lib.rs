#![doc = include_str!("../README.md")]
//!
//! # Core Components
//!
//! - [`Pool`] - The refill/dequeue/retry core, generic over a [`Strategy`]
//! - [`CatalogPool`] - A pool dispensing decoded copies of catalog entries round-robin
//! - [`GeneratorPool`] - A pool filled by a caller supplied generator function
//! - [`Codec`] trait and the default [`PostcardCodec`] for catalog entries
//!
//! # Quick Start
//!
//! ```rust
//! use std::num::NonZeroUsize;
//!
//! use tokenpool::GeneratorPool;
//!
//! let mut next = 0u64;
//! let pool = GeneratorPool::new(NonZeroUsize::new(16).unwrap(), move || {
//!     next += 1;
//!     Ok(next)
//! });
//!
//! // The first take fills the pool up to its capacity
//! let tokens = pool.take(4).unwrap();
//! assert_eq!(vec![1, 2, 3, 4], tokens);
//! assert_eq!(12, pool.remaining());
//! ```

mod catalog;
pub mod codec;
mod error;
mod generator;
mod pool;
mod snapshot;
pub mod strategy;

pub use catalog::CatalogPool;
#[cfg(feature = "postcard")]
pub use codec::PostcardCodec;
pub use codec::Codec;
pub use error::*;
pub use generator::GeneratorPool;
pub use pool::Pool;
pub use strategy::Strategy;
