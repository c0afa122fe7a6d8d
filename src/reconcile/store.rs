/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Published list state.

use std::sync::{Arc, PoisonError, RwLock};

/// Holder of the current list state.
///
/// The lane worker is the only writer. Readers get an immutable snapshot
/// that stays valid after later updates.
#[derive(Debug)]
pub struct ListStore<T> {
    current: RwLock<Arc<[T]>>,
}

impl<T> ListStore<T> {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::from(Vec::new())),
        }
    }

    /// Returns the current state.
    #[must_use]
    pub fn snapshot(&self) -> Arc<[T]> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of items in the current state.
    #[must_use]
    pub fn len(&self) -> usize {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if the current state is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Publishes `next`. The replaced state is dropped outside the write lock.
    pub(crate) fn publish(&self, next: Arc<[T]>) {
        let replaced = {
            let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *guard, next)
        };
        drop(replaced);
    }
}

impl<T> Default for ListStore<T> {
    fn default() -> Self {
        Self::new()
    }
}
