/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Public list adapter.
//!
//! [`ListAdapter`] is the facade callers use: it owns a [`TaskLane`] driving
//! a [`Reconciler`], exposes fire-and-forget and awaiting variants of every
//! mutation, and hands out snapshots of the current list.

use crate::diff::DiffConfig;
use crate::item::{DiffItem, ItemCallback, Predicate};
use crate::lane::{LaneError, LaneEvent, Receipt, Request, TaskLane};
use crate::reconcile::{Comparator, HookError, PostProcess, Reconciler, ReplacementPolicy};
use crate::view::{BoxFuture, Detached, DirectDispatcher, Dispatcher, ListView};
use std::cmp::Ordering;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::runtime::Handle;

type EventListener = Arc<dyn Fn(&LaneEvent) + Send + Sync>;

/// Errors detected while building a [`ListAdapter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// No identity predicate was configured.
    #[error("an identity predicate is required")]
    MissingIdentity,

    /// No content predicate was configured.
    #[error("a content predicate is required")]
    MissingContent,

    /// No runtime was given and none is running on the calling thread.
    #[error("no tokio runtime available: build inside a runtime or pass one explicitly")]
    NoRuntime,
}

/// Builder for [`ListAdapter`].
///
/// Identity and content predicates are required; everything else has a
/// default: incoming values win on replacement, no sorting, no post-process
/// hook, move detection on, and no view (snapshots only).
///
/// # Examples
///
/// ```no_run
/// use async_list_adapter::ListAdapter;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let adapter = ListAdapter::<(u32, String)>::builder()
///     .identity(|a, b| a.0 == b.0)
///     .content(|a, b| a.1 == b.1)
///     .comparator(|a, b| a.0.cmp(&b.0))
///     .build()?;
///
/// adapter.add(vec![(2, "b".to_string()), (1, "a".to_string())])?;
/// adapter.flush().await?;
/// assert_eq!(adapter.items()[0].0, 1);
/// # Ok(())
/// # }
/// ```
pub struct ListAdapterBuilder<T> {
    identity: Option<Predicate<T>>,
    content: Option<Predicate<T>>,
    replacement: ReplacementPolicy<T>,
    comparator: Option<Comparator<T>>,
    post_process: Option<PostProcess<T>>,
    dispatcher: Option<Arc<dyn Dispatcher<T>>>,
    runtime: Option<Handle>,
    diff: DiffConfig,
    listeners: Vec<EventListener>,
}

impl<T: Clone + Send + Sync + 'static> ListAdapterBuilder<T> {
    /// Creates a builder with no predicates configured.
    #[must_use]
    pub fn new() -> Self {
        Self {
            identity: None,
            content: None,
            replacement: ReplacementPolicy::default(),
            comparator: None,
            post_process: None,
            dispatcher: None,
            runtime: None,
            diff: DiffConfig::default(),
            listeners: Vec::new(),
        }
    }

    /// Sets the identity predicate.
    #[must_use]
    pub fn identity<F>(mut self, identity: F) -> Self
    where
        F: Fn(&T, &T) -> bool + Send + Sync + 'static,
    {
        self.identity = Some(Arc::new(identity));
        self
    }

    /// Sets the content predicate.
    #[must_use]
    pub fn content<F>(mut self, content: F) -> Self
    where
        F: Fn(&T, &T) -> bool + Send + Sync + 'static,
    {
        self.content = Some(Arc::new(content));
        self
    }

    /// Sets both predicates from an [`ItemCallback`].
    #[must_use]
    pub fn item_callback(mut self, callback: ItemCallback<T>) -> Self {
        let (identity, content) = callback.into_parts();
        self.identity = Some(identity);
        self.content = Some(content);
        self
    }

    /// Sets the replacement policy used when an insert matches an existing item.
    #[must_use]
    pub fn replacement(mut self, replacement: ReplacementPolicy<T>) -> Self {
        self.replacement = replacement;
        self
    }

    /// Keeps the incoming value on identity match (the default).
    #[must_use]
    pub fn prefer_incoming(self) -> Self {
        self.replacement(ReplacementPolicy::PreferIncoming)
    }

    /// Keeps the existing value on identity match.
    #[must_use]
    pub fn prefer_existing(self) -> Self {
        self.replacement(ReplacementPolicy::PreferExisting)
    }

    /// Builds the kept value from `(existing, incoming)` on identity match.
    #[must_use]
    pub fn replace_with<F>(self, resolve: F) -> Self
    where
        F: Fn(&T, &T) -> T + Send + Sync + 'static,
    {
        self.replacement(ReplacementPolicy::Custom(Arc::new(resolve)))
    }

    /// Stably sorts the list with `comparator` after every insert.
    #[must_use]
    pub fn comparator<F>(mut self, comparator: F) -> Self
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        self.comparator = Some(Arc::new(comparator));
        self
    }

    /// Runs `hook` on the merged, sorted list after every insert, before it
    /// is published. An error fails the insert and keeps the previous list.
    #[must_use]
    pub fn post_process<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(Vec<T>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<T>, HookError>> + Send + 'static,
    {
        let hook: PostProcess<T> =
            Arc::new(move |items: Vec<T>| -> BoxFuture<'static, Result<Vec<T>, HookError>> {
                Box::pin(hook(items))
            });
        self.post_process = Some(hook);
        self
    }

    /// Enables or disables move detection in the diff.
    #[must_use]
    pub fn detect_moves(mut self, detect_moves: bool) -> Self {
        self.diff.detect_moves = detect_moves;
        self
    }

    /// Delivers updates inline to a shared view.
    #[must_use]
    pub fn view<V>(self, view: Arc<Mutex<V>>) -> Self
    where
        V: ListView<T> + 'static,
    {
        self.dispatcher(DirectDispatcher::new(view))
    }

    /// Delivers updates through `dispatcher`.
    #[must_use]
    pub fn dispatcher<D>(mut self, dispatcher: D) -> Self
    where
        D: Dispatcher<T> + 'static,
    {
        self.dispatcher = Some(Arc::new(dispatcher));
        self
    }

    /// Spawns the lane on `runtime` instead of the current one.
    #[must_use]
    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Registers a lane event listener.
    #[must_use]
    pub fn listener<F>(mut self, listener: F) -> Self
    where
        F: Fn(&LaneEvent) + Send + Sync + 'static,
    {
        self.listeners.push(Arc::new(listener));
        self
    }

    /// Builds the adapter.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::MissingIdentity`] / [`ConfigError::MissingContent`]
    ///   if a predicate was not configured
    /// - [`ConfigError::NoRuntime`] if no runtime was given and the caller is
    ///   not inside one
    pub fn build(self) -> Result<ListAdapter<T>, ConfigError> {
        let identity = self.identity.ok_or(ConfigError::MissingIdentity)?;
        let content = self.content.ok_or(ConfigError::MissingContent)?;
        let runtime = match self.runtime {
            Some(runtime) => runtime,
            None => Handle::try_current().map_err(|_| ConfigError::NoRuntime)?,
        };
        let dispatcher: Arc<dyn Dispatcher<T>> = match self.dispatcher {
            Some(dispatcher) => dispatcher,
            None => Arc::new(Detached),
        };

        let reconciler = Reconciler::new(ItemCallback::from_parts(identity, content), dispatcher)
            .with_replacement(self.replacement)
            .with_comparator(self.comparator)
            .with_post_process(self.post_process)
            .with_diff_config(self.diff);

        let lane = TaskLane::new(reconciler, runtime);
        for listener in self.listeners {
            lane.add_listener(move |event| listener(event));
        }
        Ok(ListAdapter { lane })
    }
}

impl<T: DiffItem + Clone + Send + Sync + 'static> ListAdapterBuilder<T> {
    /// Creates a builder whose predicates come from [`DiffItem`].
    #[must_use]
    pub fn for_diff_item() -> Self {
        Self::new().item_callback(ItemCallback::from_item())
    }
}

impl<T: Clone + Send + Sync + 'static> Default for ListAdapterBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for ListAdapterBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListAdapterBuilder")
            .field("identity", &self.identity.is_some())
            .field("content", &self.content.is_some())
            .field("replacement", &self.replacement)
            .field("comparator", &self.comparator.is_some())
            .field("post_process", &self.post_process.is_some())
            .field("diff", &self.diff)
            .finish_non_exhaustive()
    }
}

/// An ordered list bound to a view, mutated through a single lane.
///
/// Mutations are queued and applied one at a time in call order, from any
/// thread. Each applied mutation publishes a new snapshot and delivers the
/// edits that lead to it before the next one starts.
///
/// `ListAdapter` is a cheap handle; clones share the same list and lane.
pub struct ListAdapter<T: Clone + Send + Sync + 'static> {
    lane: TaskLane<Reconciler<T>>,
}

impl<T: Clone + Send + Sync + 'static> Clone for ListAdapter<T> {
    fn clone(&self) -> Self {
        Self {
            lane: self.lane.clone(),
        }
    }
}

impl<T: DiffItem + Clone + Send + Sync + 'static> ListAdapter<T> {
    /// Creates a detached adapter with default settings for a [`DiffItem`] type.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoRuntime`] if called outside a tokio runtime.
    pub fn new() -> Result<Self, ConfigError> {
        ListAdapterBuilder::for_diff_item().build()
    }
}

impl<T: Clone + Send + Sync + 'static> ListAdapter<T> {
    /// Returns a builder with no predicates configured.
    #[must_use]
    pub fn builder() -> ListAdapterBuilder<T> {
        ListAdapterBuilder::new()
    }

    /// Queues a merge of `items` into the list.
    ///
    /// # Errors
    ///
    /// Returns [`LaneError::Closed`] if the adapter has been cancelled.
    pub fn add(&self, items: Vec<T>) -> Result<u64, LaneError> {
        self.lane.enqueue_insert(items)
    }

    /// Queues removal of every item with `item`'s identity.
    ///
    /// # Errors
    ///
    /// Returns [`LaneError::Closed`] if the adapter has been cancelled.
    pub fn remove(&self, item: T) -> Result<u64, LaneError> {
        self.lane.enqueue_remove(item)
    }

    /// Queues removal of everything.
    ///
    /// # Errors
    ///
    /// Returns [`LaneError::Closed`] if the adapter has been cancelled.
    pub fn clear(&self) -> Result<u64, LaneError> {
        self.lane.enqueue_clear()
    }

    /// Queues `callback` to run once every earlier mutation has been applied
    /// and delivered.
    ///
    /// # Errors
    ///
    /// Returns [`LaneError::Closed`] if the adapter has been cancelled.
    pub fn run_after<F, Fut>(&self, callback: F) -> Result<u64, LaneError>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.lane.enqueue_run_after(callback)
    }

    /// Like [`add`](Self::add), but waits for the receipt.
    ///
    /// # Errors
    ///
    /// Returns [`LaneError::Closed`] if the adapter is cancelled first.
    pub async fn add_and_wait(&self, items: Vec<T>) -> Result<Receipt, LaneError> {
        self.lane.submit(Request::Insert(items)).await
    }

    /// Like [`remove`](Self::remove), but waits for the receipt.
    ///
    /// # Errors
    ///
    /// Returns [`LaneError::Closed`] if the adapter is cancelled first.
    pub async fn remove_and_wait(&self, item: T) -> Result<Receipt, LaneError> {
        self.lane.submit(Request::Remove(item)).await
    }

    /// Like [`clear`](Self::clear), but waits for the receipt.
    ///
    /// # Errors
    ///
    /// Returns [`LaneError::Closed`] if the adapter is cancelled first.
    pub async fn clear_and_wait(&self) -> Result<Receipt, LaneError> {
        self.lane.submit(Request::Clear).await
    }

    /// Waits until every mutation queued so far has been applied and delivered.
    ///
    /// # Errors
    ///
    /// Returns [`LaneError::Closed`] if the adapter is cancelled first.
    pub async fn flush(&self) -> Result<(), LaneError> {
        self.lane.flush().await
    }

    /// Returns a snapshot of the current list.
    #[must_use]
    pub fn items(&self) -> Arc<[T]> {
        self.lane.handler().store().snapshot()
    }

    /// Returns a copy of the item at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<T> {
        self.items().get(index).cloned()
    }

    /// Number of items in the current list.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lane.handler().store().len()
    }

    /// Returns `true` if the current list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registers a lane event listener.
    pub fn add_listener<F>(&self, listener: F)
    where
        F: Fn(&LaneEvent) + Send + Sync + 'static,
    {
        self.lane.add_listener(listener);
    }

    /// Stops processing. Queued mutations are dropped; see [`TaskLane::cancel`].
    pub fn cancel(&self) {
        self.lane.cancel();
    }

    /// Returns `true` once [`cancel`](Self::cancel) has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.lane.is_cancelled()
    }

    /// Returns the underlying lane.
    #[must_use]
    pub fn lane(&self) -> &TaskLane<Reconciler<T>> {
        &self.lane
    }
}

impl<T: Clone + Send + Sync + 'static> fmt::Debug for ListAdapter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListAdapter")
            .field("len", &self.len())
            .field("lane", &self.lane)
            .finish()
    }
}
