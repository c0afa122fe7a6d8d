/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Item capabilities used by the reconciler and the diff engine.
//!
//! The core never inspects items directly. It only asks two questions:
//! do two items describe the same logical entity, and if so, would they
//! render identically. [`DiffItem`] answers both for a concrete type;
//! [`ItemCallback`] is the type-erased form the core carries around.

use std::fmt;
use std::sync::Arc;

/// Shared predicate over a pair of items.
pub type Predicate<T> = Arc<dyn Fn(&T, &T) -> bool + Send + Sync>;

/// Identity and content comparison for list items.
///
/// # Examples
///
/// ```
/// use async_list_adapter::DiffItem;
///
/// #[derive(Clone)]
/// struct Contact {
///     id: u32,
///     name: String,
/// }
///
/// impl DiffItem for Contact {
///     fn same_identity(&self, other: &Self) -> bool {
///         self.id == other.id
///     }
///
///     fn same_content(&self, other: &Self) -> bool {
///         self.name == other.name
///     }
/// }
///
/// let a = Contact { id: 1, name: "Ada".into() };
/// let b = Contact { id: 1, name: "Ada L.".into() };
/// assert!(a.same_identity(&b));
/// assert!(!a.same_content(&b));
/// ```
pub trait DiffItem {
    /// Returns `true` if both values represent the same logical entity.
    fn same_identity(&self, other: &Self) -> bool;

    /// Returns `true` if both values have equal displayable attributes.
    ///
    /// Only called for pairs that already matched on identity.
    fn same_content(&self, other: &Self) -> bool;
}

/// Type-erased identity and content predicates.
pub struct ItemCallback<T> {
    identity: Predicate<T>,
    content: Predicate<T>,
}

impl<T> ItemCallback<T> {
    /// Creates a callback from explicit identity and content predicates.
    #[must_use]
    pub fn new<I, C>(identity: I, content: C) -> Self
    where
        I: Fn(&T, &T) -> bool + Send + Sync + 'static,
        C: Fn(&T, &T) -> bool + Send + Sync + 'static,
    {
        Self {
            identity: Arc::new(identity),
            content: Arc::new(content),
        }
    }

    pub(crate) fn from_parts(identity: Predicate<T>, content: Predicate<T>) -> Self {
        Self { identity, content }
    }

    pub(crate) fn into_parts(self) -> (Predicate<T>, Predicate<T>) {
        (self.identity, self.content)
    }

    /// Returns `true` if `a` and `b` are the same logical entity.
    #[inline]
    #[must_use]
    pub fn same_identity(&self, a: &T, b: &T) -> bool {
        (self.identity)(a, b)
    }

    /// Returns `true` if `a` and `b` render identically.
    #[inline]
    #[must_use]
    pub fn same_content(&self, a: &T, b: &T) -> bool {
        (self.content)(a, b)
    }
}

impl<T: DiffItem + 'static> ItemCallback<T> {
    /// Creates a callback that delegates to the [`DiffItem`] implementation.
    #[must_use]
    pub fn from_item() -> Self {
        Self::new(T::same_identity, T::same_content)
    }
}

impl<T> Clone for ItemCallback<T> {
    fn clone(&self) -> Self {
        Self {
            identity: Arc::clone(&self.identity),
            content: Arc::clone(&self.content),
        }
    }
}

impl<T> fmt::Debug for ItemCallback<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemCallback").finish_non_exhaustive()
    }
}
