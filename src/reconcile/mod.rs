/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! List reconciliation.
//!
//! This module computes the next list state from the current one plus an
//! incoming change. The pure merge functions live here; [`Reconciler`] wires
//! them to the shared [`ListStore`] and the view dispatcher so the lane can
//! drive them one request at a time.
//!
//! # Merge rules
//!
//! - Inserting into an empty list takes the incoming items as they are.
//! - Otherwise every existing item looks for the first unconsumed incoming
//!   item with the same identity. A hit is resolved through the
//!   [`ReplacementPolicy`] and keeps the existing position.
//! - Incoming items that matched nothing are appended in their original order.
//! - Removing an item drops every existing item with the same identity.

pub mod handler;
pub mod store;

pub use handler::Reconciler;
pub use store::ListStore;

use crate::item::ItemCallback;
use crate::view::BoxFuture;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Error type returned by post-process hooks.
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

/// Ordering applied to the merged list after an insert.
pub type Comparator<T> = Arc<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

/// Async transform applied to the merged list before it is published.
pub type PostProcess<T> =
    Arc<dyn Fn(Vec<T>) -> BoxFuture<'static, Result<Vec<T>, HookError>> + Send + Sync>;

/// Selects the value kept when an incoming item matches an existing one.
pub enum ReplacementPolicy<T> {
    /// Keep the incoming value.
    PreferIncoming,
    /// Keep the value already in the list.
    PreferExisting,
    /// Build the kept value from `(existing, incoming)`.
    Custom(Arc<dyn Fn(&T, &T) -> T + Send + Sync>),
}

impl<T: Clone> ReplacementPolicy<T> {
    /// Resolves one identity match.
    #[must_use]
    pub fn resolve(&self, existing: &T, incoming: &T) -> T {
        match self {
            Self::PreferIncoming => incoming.clone(),
            Self::PreferExisting => existing.clone(),
            Self::Custom(resolve) => resolve(existing, incoming),
        }
    }
}

impl<T> Default for ReplacementPolicy<T> {
    fn default() -> Self {
        Self::PreferIncoming
    }
}

impl<T> Clone for ReplacementPolicy<T> {
    fn clone(&self) -> Self {
        match self {
            Self::PreferIncoming => Self::PreferIncoming,
            Self::PreferExisting => Self::PreferExisting,
            Self::Custom(resolve) => Self::Custom(Arc::clone(resolve)),
        }
    }
}

impl<T> fmt::Debug for ReplacementPolicy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PreferIncoming => f.write_str("PreferIncoming"),
            Self::PreferExisting => f.write_str("PreferExisting"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Merges `incoming` into `current`.
///
/// Each existing item is replaced by at most one incoming item: the first
/// unconsumed one with the same identity. Any other incoming item with that
/// identity is consumed as well and dropped. Unmatched incoming items are
/// appended in order.
///
/// # Examples
///
/// ```
/// use async_list_adapter::ItemCallback;
/// use async_list_adapter::reconcile::{ReplacementPolicy, merge_insert};
///
/// let callback = ItemCallback::<(u32, char)>::new(|a, b| a.0 == b.0, |a, b| a.1 == b.1);
/// let current = [(1, 'a'), (2, 'b')];
/// let merged = merge_insert(
///     &current,
///     vec![(3, 'c'), (1, 'z')],
///     &callback,
///     &ReplacementPolicy::PreferIncoming,
/// );
/// assert_eq!(merged, vec![(1, 'z'), (2, 'b'), (3, 'c')]);
/// ```
#[must_use]
pub fn merge_insert<T: Clone>(
    current: &[T],
    incoming: Vec<T>,
    callback: &ItemCallback<T>,
    policy: &ReplacementPolicy<T>,
) -> Vec<T> {
    if current.is_empty() {
        return incoming;
    }

    let mut consumed = vec![false; incoming.len()];
    let mut merged = Vec::with_capacity(current.len() + incoming.len());

    for existing in current {
        let mut replacement = None;
        for (index, candidate) in incoming.iter().enumerate() {
            if consumed[index] || !callback.same_identity(existing, candidate) {
                continue;
            }
            consumed[index] = true;
            if replacement.is_none() {
                replacement = Some(candidate);
            } else {
                trace!(index, "dropping duplicate incoming match");
            }
        }

        match replacement {
            Some(candidate) => {
                trace!("replacing matched item in place");
                merged.push(policy.resolve(existing, candidate));
            }
            None => merged.push(existing.clone()),
        }
    }

    merged.extend(
        incoming
            .into_iter()
            .zip(consumed)
            .filter_map(|(item, taken)| (!taken).then_some(item)),
    );
    merged
}

/// Returns `current` without any item that shares `target`'s identity.
#[must_use]
pub fn remove_matching<T: Clone>(current: &[T], target: &T, callback: &ItemCallback<T>) -> Vec<T> {
    current
        .iter()
        .filter(|item| !callback.same_identity(item, target))
        .cloned()
        .collect()
}
