/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Core TaskLane implementation.
//!
//! This module provides the single-lane request queue. Producers append
//! requests from any thread; one worker task drains them strictly in order,
//! awaiting each request to completion before popping the next.

use super::event::LaneEvent;
use super::outcome::{Outcome, StepError, StepResult};
use super::receipt::Receipt;
use super::request::Request;
use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error, trace, warn};

/// Type alias for event listener functions.
type EventListener = Arc<dyn Fn(&LaneEvent) + Send + Sync>;

/// Executes the list mutations queued on a [`TaskLane`].
///
/// The lane calls at most one of these at a time and awaits the returned
/// future before moving on. [`Request::RunAfter`] barriers are run by the
/// lane itself and never reach the handler.
pub trait LaneHandler: Send + Sync + 'static {
    /// Item type carried by requests.
    type Item: Send + 'static;

    /// Handles [`Request::Insert`].
    fn on_insert(&self, items: Vec<Self::Item>) -> impl Future<Output = StepResult> + Send;

    /// Handles [`Request::Remove`].
    fn on_remove(&self, item: Self::Item) -> impl Future<Output = StepResult> + Send;

    /// Handles [`Request::Clear`].
    fn on_clear(&self) -> impl Future<Output = StepResult> + Send;
}

/// Lifecycle of the lane worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WorkerState {
    /// No worker task exists; the next enqueue spawns one.
    Idle,
    /// A worker task is draining the queue.
    Running,
    /// The lane was cancelled; enqueue is rejected.
    Cancelled,
}

struct Pending<T> {
    sequence_num: u64,
    request: Request<T>,
    reply: Option<oneshot::Sender<Receipt>>,
}

struct Queue<T> {
    pending: VecDeque<Pending<T>>,
    state: WorkerState,
    next_sequence: u64,
    /// Bumped every time a worker is spawned.
    epoch: u64,
    worker: Option<JoinHandle<()>>,
}

struct Shared<H: LaneHandler> {
    handler: Arc<H>,
    queue: Mutex<Queue<H::Item>>,
    listeners: RwLock<Vec<EventListener>>,
    runtime: Handle,
}

impl<H: LaneHandler> Shared<H> {
    fn lock_queue(&self) -> MutexGuard<'_, Queue<H::Item>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A single-lane executor for list mutation requests.
///
/// All requests go through one FIFO queue. A worker task is spawned lazily
/// on the first enqueue, drains the queue one request at a time and exits
/// once the queue is empty; the next enqueue spawns a new one. The
/// idle-check and the spawn happen under the same lock as the append, so
/// two racing producers can never start two workers.
///
/// Each request runs in its own task: a panic inside a handler or barrier
/// callback fails that request only and the lane keeps draining.
///
/// `TaskLane` is a cheap handle; clones share the same queue.
pub struct TaskLane<H: LaneHandler> {
    shared: Arc<Shared<H>>,
}

impl<H: LaneHandler> Clone for TaskLane<H> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<H: LaneHandler> TaskLane<H> {
    /// Creates a lane that spawns its worker on `runtime`.
    ///
    /// # Arguments
    ///
    /// * `handler` - Executes insert, remove and clear requests
    /// * `runtime` - Runtime the worker and step tasks are spawned on
    #[must_use]
    pub fn new(handler: H, runtime: Handle) -> Self {
        Self {
            shared: Arc::new(Shared {
                handler: Arc::new(handler),
                queue: Mutex::new(Queue {
                    pending: VecDeque::new(),
                    state: WorkerState::Idle,
                    next_sequence: 1,
                    epoch: 0,
                    worker: None,
                }),
                listeners: RwLock::new(Vec::new()),
                runtime,
            }),
        }
    }

    /// Returns the handler executing requests.
    #[must_use]
    pub fn handler(&self) -> &H {
        &self.shared.handler
    }

    /// Registers an event listener.
    ///
    /// Listeners are called on the worker, in sequence order, after each
    /// request has executed. A listener that panics is logged and skipped.
    pub fn add_listener<F>(&self, listener: F)
    where
        F: Fn(&LaneEvent) + Send + Sync + 'static,
    {
        self.shared
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(listener));
    }

    /// Appends `request` to the queue and returns its sequence number.
    ///
    /// # Errors
    ///
    /// Returns [`LaneError::Closed`] if the lane has been cancelled.
    pub fn enqueue(&self, request: Request<H::Item>) -> Result<u64, LaneError> {
        self.push(request, None)
    }

    /// Queues an insert of `items`.
    ///
    /// # Errors
    ///
    /// Returns [`LaneError::Closed`] if the lane has been cancelled.
    pub fn enqueue_insert(&self, items: Vec<H::Item>) -> Result<u64, LaneError> {
        self.enqueue(Request::Insert(items))
    }

    /// Queues a removal of `item`.
    ///
    /// # Errors
    ///
    /// Returns [`LaneError::Closed`] if the lane has been cancelled.
    pub fn enqueue_remove(&self, item: H::Item) -> Result<u64, LaneError> {
        self.enqueue(Request::Remove(item))
    }

    /// Queues a clear.
    ///
    /// # Errors
    ///
    /// Returns [`LaneError::Closed`] if the lane has been cancelled.
    pub fn enqueue_clear(&self) -> Result<u64, LaneError> {
        self.enqueue(Request::Clear)
    }

    /// Queues `callback` to run after every request enqueued before it.
    ///
    /// # Errors
    ///
    /// Returns [`LaneError::Closed`] if the lane has been cancelled.
    pub fn enqueue_run_after<F, Fut>(&self, callback: F) -> Result<u64, LaneError>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.enqueue(Request::run_after(callback))
    }

    /// Queues `request` and waits until it has executed.
    ///
    /// # Errors
    ///
    /// Returns [`LaneError::Closed`] if the lane is cancelled before the
    /// request runs to completion.
    pub async fn submit(&self, request: Request<H::Item>) -> Result<Receipt, LaneError> {
        let (tx, rx) = oneshot::channel();
        self.push(request, Some(tx))?;
        rx.await.map_err(|_| LaneError::Closed)
    }

    /// Waits until every request enqueued so far has executed.
    ///
    /// # Errors
    ///
    /// Returns [`LaneError::Closed`] if the lane is cancelled first.
    pub async fn flush(&self) -> Result<(), LaneError> {
        self.submit(Request::run_after(|| async {})).await.map(|_| ())
    }

    /// Stops the lane.
    ///
    /// Pending requests are dropped without running and their waiters get
    /// [`LaneError::Closed`]. A step already running is not rolled back.
    /// Every later enqueue is rejected.
    pub fn cancel(&self) {
        let (dropped, worker) = {
            let mut queue = self.shared.lock_queue();
            if queue.state == WorkerState::Cancelled {
                return;
            }
            queue.state = WorkerState::Cancelled;
            (std::mem::take(&mut queue.pending), queue.worker.take())
        };

        if let Some(worker) = worker {
            worker.abort();
        }
        debug!(dropped = dropped.len(), "lane cancelled");
    }

    /// Returns `true` once [`cancel`](Self::cancel) has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.shared.lock_queue().state == WorkerState::Cancelled
    }

    /// Returns `true` while a worker task is draining the queue.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.shared.lock_queue().state == WorkerState::Running
    }

    /// Number of requests waiting to run, not counting the one in flight.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.shared.lock_queue().pending.len()
    }

    fn push(
        &self,
        request: Request<H::Item>,
        reply: Option<oneshot::Sender<Receipt>>,
    ) -> Result<u64, LaneError> {
        let (sequence_num, spawn) = {
            let mut queue = self.shared.lock_queue();
            if queue.state == WorkerState::Cancelled {
                return Err(LaneError::Closed);
            }

            let sequence_num = queue.next_sequence;
            queue.next_sequence += 1;
            trace!(sequence_num, kind = %request.kind(), "request queued");
            queue.pending.push_back(Pending {
                sequence_num,
                request,
                reply,
            });

            let spawn = (queue.state == WorkerState::Idle).then(|| {
                queue.state = WorkerState::Running;
                queue.epoch += 1;
                queue.epoch
            });
            (sequence_num, spawn)
        };

        let Some(epoch) = spawn else {
            return Ok(sequence_num);
        };

        // Spawned outside the lock: on a runtime that is shutting down the
        // future is dropped inside `spawn`, and its guard needs the lock.
        let guard = WorkerGuard {
            shared: Arc::clone(&self.shared),
            epoch,
            started: false,
        };
        let worker = self.shared.runtime.spawn(run_loop(guard));

        let mut queue = self.shared.lock_queue();
        match queue.state {
            WorkerState::Running if queue.epoch == epoch => {
                queue.worker = Some(worker);
                debug!(sequence_num, "lane worker spawned");
                Ok(sequence_num)
            }
            WorkerState::Cancelled => {
                worker.abort();
                Err(LaneError::Closed)
            }
            _ => Ok(sequence_num),
        }
    }
}

impl<H: LaneHandler> fmt::Debug for TaskLane<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let queue = self.shared.lock_queue();
        f.debug_struct("TaskLane")
            .field("state", &queue.state)
            .field("pending", &queue.pending.len())
            .field("next_sequence", &queue.next_sequence)
            .finish()
    }
}

/// Owned by a worker for its whole life.
///
/// Dropping it while its worker is still the current one means the worker
/// did not exit through the empty-queue path: it unwound, or the runtime
/// dropped it. An unwound worker hands the lane back to `Idle` so the next
/// enqueue spawns a fresh one. A worker that was never polled means the
/// runtime is gone, and the lane is closed.
struct WorkerGuard<H: LaneHandler> {
    shared: Arc<Shared<H>>,
    epoch: u64,
    started: bool,
}

impl<H: LaneHandler> Drop for WorkerGuard<H> {
    fn drop(&mut self) {
        let dropped = {
            let mut queue = self.shared.lock_queue();
            if queue.epoch != self.epoch || queue.state != WorkerState::Running {
                return;
            }
            queue.worker = None;
            if self.started {
                queue.state = WorkerState::Idle;
                None
            } else {
                queue.state = WorkerState::Cancelled;
                Some(std::mem::take(&mut queue.pending))
            }
        };

        match dropped {
            Some(dropped) => {
                error!(dropped = dropped.len(), "runtime unavailable, lane closed");
            }
            None => warn!("lane worker stopped early, next enqueue respawns it"),
        }
    }
}

/// Drains the queue until it is empty (single worker).
async fn run_loop<H: LaneHandler>(mut guard: WorkerGuard<H>) {
    guard.started = true;
    let shared = Arc::clone(&guard.shared);
    loop {
        let next = {
            let mut queue = shared.lock_queue();
            match queue.pending.pop_front() {
                Some(next) => next,
                None => {
                    if queue.state == WorkerState::Running {
                        queue.state = WorkerState::Idle;
                        queue.worker = None;
                        debug!("lane drained, worker idle");
                    }
                    return;
                }
            }
        };

        let Pending {
            sequence_num,
            request,
            reply,
        } = next;
        let kind = request.kind();
        let outcome = execute(&shared, request).await;

        if let Outcome::Failed { error } = &outcome {
            match error {
                StepError::Panicked { .. } => error!(sequence_num, %kind, %error, "request panicked"),
                _ => warn!(sequence_num, %kind, %error, "request failed"),
            }
        }

        let event = LaneEvent::new(sequence_num, nanos_since_epoch(), kind, outcome);
        let listeners = shared
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for listener in &listeners {
            if panic::catch_unwind(AssertUnwindSafe(|| listener(&event))).is_err() {
                error!(sequence_num, %kind, "event listener panicked");
            }
        }

        if let Some(reply) = reply {
            let _ = reply.send(Receipt::new(sequence_num, event.outcome));
        }
    }
}

/// Runs one request in its own task so a panic stays contained.
async fn execute<H: LaneHandler>(shared: &Shared<H>, request: Request<H::Item>) -> Outcome {
    let handler = Arc::clone(&shared.handler);
    let step = shared.runtime.spawn(async move {
        match request {
            Request::Insert(items) => Outcome::from(handler.on_insert(items).await),
            Request::Remove(item) => Outcome::from(handler.on_remove(item).await),
            Request::Clear => Outcome::from(handler.on_clear().await),
            Request::RunAfter(callback) => {
                callback().await;
                Outcome::Barrier
            }
        }
    });

    match step.await {
        Ok(outcome) => outcome,
        Err(join_error) => Outcome::Failed {
            error: StepError::from(join_error),
        },
    }
}

/// Errors that can occur when interacting with a [`TaskLane`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LaneError {
    /// The lane has been cancelled.
    #[error("lane has been cancelled")]
    Closed,
}

/// Returns the current time in nanoseconds since the Unix epoch.
#[inline]
fn nanos_since_epoch() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}
