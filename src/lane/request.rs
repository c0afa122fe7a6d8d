/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Lane request types.
//!
//! This module defines the requests that can be queued on a
//! [`TaskLane`](super::TaskLane) for one-at-a-time execution.

use crate::view::BoxFuture;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;

/// Deferred callback run by a [`Request::RunAfter`] barrier.
pub type Barrier = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>;

/// A mutation or barrier queued on the lane.
///
/// Each request is consumed exactly once by the worker, in enqueue order.
///
/// # Examples
///
/// ```
/// use async_list_adapter::lane::{Request, RequestKind};
///
/// let request: Request<u32> = Request::Insert(vec![1, 2, 3]);
/// assert_eq!(request.kind(), RequestKind::Insert);
/// ```
pub enum Request<T> {
    /// Merge items into the list.
    Insert(Vec<T>),

    /// Remove every item with the same identity.
    Remove(T),

    /// Remove everything.
    Clear,

    /// Run a callback once every earlier request has completed.
    RunAfter(Barrier),
}

impl<T> Request<T> {
    /// Builds a [`Request::RunAfter`] from an async closure.
    pub fn run_after<F, Fut>(callback: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::RunAfter(Box::new(move || Box::pin(callback())))
    }

    /// Returns the request's kind.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> RequestKind {
        match self {
            Self::Insert(_) => RequestKind::Insert,
            Self::Remove(_) => RequestKind::Remove,
            Self::Clear => RequestKind::Clear,
            Self::RunAfter(_) => RequestKind::RunAfter,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Request<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Insert(items) => f.debug_tuple("Insert").field(items).finish(),
            Self::Remove(item) => f.debug_tuple("Remove").field(item).finish(),
            Self::Clear => f.write_str("Clear"),
            Self::RunAfter(_) => f.write_str("RunAfter(..)"),
        }
    }
}

/// Payload-free tag of a [`Request`], carried by events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestKind {
    /// [`Request::Insert`].
    Insert,
    /// [`Request::Remove`].
    Remove,
    /// [`Request::Clear`].
    Clear,
    /// [`Request::RunAfter`].
    RunAfter,
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Insert => "insert",
            Self::Remove => "remove",
            Self::Clear => "clear",
            Self::RunAfter => "run_after",
        };
        f.write_str(name)
    }
}
