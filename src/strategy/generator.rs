use std::fmt::{Debug, Formatter};

use crate::error::{BoxError, Error, Result};

use super::Strategy;

/// Boxed factory function producing a fresh token on every call.
pub type Factory<T> = Box<dyn FnMut() -> std::result::Result<T, BoxError> + Send>;

/// Strategy delegating token creation to a caller supplied function.
pub struct Generator<T> {
    factory: Factory<T>,
}

impl<T> Generator<T> {
    pub fn new<F>(factory: F) -> Self
    where
        F: FnMut() -> std::result::Result<T, BoxError> + Send + 'static,
    {
        Self {
            factory: Box::new(factory),
        }
    }

    /// Swaps the factory, returning the previous one.
    pub fn replace<F>(&mut self, factory: F) -> Factory<T>
    where
        F: FnMut() -> std::result::Result<T, BoxError> + Send + 'static,
    {
        std::mem::replace(&mut self.factory, Box::new(factory))
    }
}

impl<T: Clone> Strategy for Generator<T> {
    type Handle = T;

    fn next_token(&mut self) -> Result<T> {
        (self.factory)().map_err(Error::Generator)
    }
}

impl<T> Debug for Generator<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Generator").finish_non_exhaustive()
    }
}
