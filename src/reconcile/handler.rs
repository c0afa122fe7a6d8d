/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Lane handler that reconciles the shared list.

use super::store::ListStore;
use super::{Comparator, PostProcess, ReplacementPolicy, merge_insert, remove_matching};
use crate::diff::{DiffConfig, calculate_diff};
use crate::item::ItemCallback;
use crate::lane::{LaneHandler, StepError, StepResult, StepSummary};
use crate::view::{Dispatcher, ListUpdate};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

/// Executes insert, remove and clear requests against a [`ListStore`].
///
/// Every step computes the next list from a snapshot, diffs it against the
/// snapshot, publishes it and then waits for the dispatcher to deliver the
/// edits. A step that fails before publishing leaves the store untouched.
pub struct Reconciler<T> {
    store: Arc<ListStore<T>>,
    callback: ItemCallback<T>,
    replacement: ReplacementPolicy<T>,
    comparator: Option<Comparator<T>>,
    post_process: Option<PostProcess<T>>,
    dispatcher: Arc<dyn Dispatcher<T>>,
    diff: DiffConfig,
}

impl<T: Clone + Send + Sync + 'static> Reconciler<T> {
    /// Creates a reconciler over an empty store.
    #[must_use]
    pub fn new(callback: ItemCallback<T>, dispatcher: Arc<dyn Dispatcher<T>>) -> Self {
        Self {
            store: Arc::new(ListStore::new()),
            callback,
            replacement: ReplacementPolicy::default(),
            comparator: None,
            post_process: None,
            dispatcher,
            diff: DiffConfig::default(),
        }
    }

    /// Sets the replacement policy.
    #[must_use]
    pub fn with_replacement(mut self, replacement: ReplacementPolicy<T>) -> Self {
        self.replacement = replacement;
        self
    }

    /// Sets the comparator applied after each insert.
    #[must_use]
    pub fn with_comparator(mut self, comparator: Option<Comparator<T>>) -> Self {
        self.comparator = comparator;
        self
    }

    /// Sets the hook applied to the merged list after each insert.
    #[must_use]
    pub fn with_post_process(mut self, post_process: Option<PostProcess<T>>) -> Self {
        self.post_process = post_process;
        self
    }

    /// Sets the diff engine settings.
    #[must_use]
    pub fn with_diff_config(mut self, diff: DiffConfig) -> Self {
        self.diff = diff;
        self
    }

    /// Returns the store holding the published list.
    #[must_use]
    pub fn store(&self) -> &Arc<ListStore<T>> {
        &self.store
    }

    /// Diffs, publishes and delivers `next`.
    async fn publish(&self, previous: Arc<[T]>, next: Vec<T>) -> StepSummary {
        let script = calculate_diff(&previous, &next, &self.callback, self.diff);
        let items: Arc<[T]> = Arc::from(next);
        self.store.publish(Arc::clone(&items));

        let edits = script.len();
        debug!(len = items.len(), edits, "submitting list");
        let update = ListUpdate {
            items: Arc::clone(&items),
            script,
        };
        let delivered = match self.dispatcher.deliver(update).await {
            Ok(()) => true,
            Err(error) => {
                warn!(%error, "list update was not delivered");
                false
            }
        };

        StepSummary {
            previous_len: previous.len(),
            len: items.len(),
            edits,
            delivered,
        }
    }
}

impl<T: Clone + Send + Sync + 'static> LaneHandler for Reconciler<T> {
    type Item = T;

    fn on_insert(&self, items: Vec<T>) -> impl Future<Output = StepResult> + Send {
        async move {
            let current = self.store.snapshot();
            let mut next = merge_insert(&current, items, &self.callback, &self.replacement);

            if let Some(comparator) = &self.comparator {
                debug!("sorting merged list with comparator");
                next.sort_by(|a, b| comparator(a, b));
            }
            if let Some(post_process) = &self.post_process {
                next = post_process(next)
                    .await
                    .map_err(|error| StepError::Hook(error.to_string()))?;
            }

            Ok(self.publish(current, next).await)
        }
    }

    fn on_remove(&self, item: T) -> impl Future<Output = StepResult> + Send {
        async move {
            let current = self.store.snapshot();
            let next = remove_matching(&current, &item, &self.callback);
            Ok(self.publish(current, next).await)
        }
    }

    fn on_clear(&self) -> impl Future<Output = StepResult> + Send {
        async move {
            let current = self.store.snapshot();
            Ok(self.publish(current, Vec::new()).await)
        }
    }
}

impl<T> fmt::Debug for Reconciler<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reconciler")
            .field("replacement", &self.replacement)
            .field("comparator", &self.comparator.is_some())
            .field("post_process", &self.post_process.is_some())
            .field("diff", &self.diff)
            .finish_non_exhaustive()
    }
}
