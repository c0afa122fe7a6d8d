/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! View layer delivery.
//!
//! After every completed mutation the reconciler hands a [`ListUpdate`] to a
//! [`Dispatcher`] and waits until the dispatcher reports it delivered. Three
//! dispatchers are provided:
//!
//! - [`DirectDispatcher`] applies the update on the worker itself.
//! - [`ChannelDispatcher`] forwards it to an [`UpdateReceiver`] polled by the
//!   view's own task (a UI loop, for instance) and waits for the
//!   acknowledgment.
//! - [`Detached`] drops it; useful when only snapshots are read.

use crate::diff::{DiffScript, ListUpdateCallback};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

/// Boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Consumer of list notifications.
///
/// `on_current_list` is called with the new list right before the edits
/// that lead to it, so the view can bind rows by position.
pub trait ListView<T>: ListUpdateCallback + Send {
    /// Receives the list the following edits converge to.
    fn on_current_list(&mut self, _items: &Arc<[T]>) {}
}

/// One completed mutation: the new list and the edits that lead to it.
#[derive(Debug, Clone)]
pub struct ListUpdate<T> {
    /// The list after the mutation.
    pub items: Arc<[T]>,
    /// Edits from the previous list to `items`.
    pub script: DiffScript,
}

impl<T> ListUpdate<T> {
    /// Delivers the update to `view`.
    pub fn apply_to<V>(&self, view: &mut V)
    where
        V: ListView<T> + ?Sized,
    {
        view.on_current_list(&self.items);
        self.script.dispatch_updates_to(view);
    }
}

/// Errors reported while delivering an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// The receiving side is gone.
    #[error("view receiver has been dropped")]
    Disconnected,

    /// The update was received but dropped without being applied.
    #[error("update was dropped without acknowledgment")]
    Unacknowledged,
}

/// Delivers list updates to the view layer.
///
/// The returned future resolves once the update is fully applied; the lane
/// does not start the next request before that.
pub trait Dispatcher<T>: Send + Sync {
    /// Delivers `update`.
    fn deliver(&self, update: ListUpdate<T>) -> BoxFuture<'_, Result<(), DeliveryError>>;
}

/// Dispatcher that discards updates.
#[derive(Debug, Clone, Copy, Default)]
pub struct Detached;

impl<T: Send + 'static> Dispatcher<T> for Detached {
    fn deliver(&self, _update: ListUpdate<T>) -> BoxFuture<'_, Result<(), DeliveryError>> {
        Box::pin(std::future::ready(Ok(())))
    }
}

/// Dispatcher that applies updates inline on the lane worker.
#[derive(Debug)]
pub struct DirectDispatcher<V> {
    view: Arc<Mutex<V>>,
}

impl<V> DirectDispatcher<V> {
    /// Wraps a shared view.
    #[must_use]
    pub fn new(view: Arc<Mutex<V>>) -> Self {
        Self { view }
    }

    /// Returns the shared view.
    #[must_use]
    pub fn view(&self) -> &Arc<Mutex<V>> {
        &self.view
    }
}

impl<T, V> Dispatcher<T> for DirectDispatcher<V>
where
    T: Send + Sync + 'static,
    V: ListView<T> + 'static,
{
    fn deliver(&self, update: ListUpdate<T>) -> BoxFuture<'_, Result<(), DeliveryError>> {
        let mut view = self.view.lock().unwrap_or_else(PoisonError::into_inner);
        update.apply_to(&mut *view);
        Box::pin(std::future::ready(Ok(())))
    }
}

/// An update waiting to be applied by the view's task.
///
/// Applying or acknowledging it releases the lane worker. Dropping it
/// unapplied reports [`DeliveryError::Unacknowledged`] to the worker.
#[derive(Debug)]
pub struct PendingUpdate<T> {
    update: ListUpdate<T>,
    ack: oneshot::Sender<()>,
}

impl<T> PendingUpdate<T> {
    /// The update being delivered.
    #[must_use]
    pub fn update(&self) -> &ListUpdate<T> {
        &self.update
    }

    /// Applies the update to `view` and acknowledges it.
    pub fn apply_to<V>(self, view: &mut V)
    where
        V: ListView<T> + ?Sized,
    {
        self.update.apply_to(view);
        let _ = self.ack.send(());
    }

    /// Acknowledges the update without applying it anywhere.
    pub fn acknowledge(self) -> ListUpdate<T> {
        let _ = self.ack.send(());
        self.update
    }
}

/// Sending half of an update channel.
#[derive(Debug)]
pub struct ChannelDispatcher<T> {
    tx: mpsc::UnboundedSender<PendingUpdate<T>>,
}

/// Receiving half of an update channel, owned by the view's task.
#[derive(Debug)]
pub struct UpdateReceiver<T> {
    rx: mpsc::UnboundedReceiver<PendingUpdate<T>>,
}

impl<T> UpdateReceiver<T> {
    /// Waits for the next update. Returns `None` once the dispatcher is gone.
    pub async fn recv(&mut self) -> Option<PendingUpdate<T>> {
        self.rx.recv().await
    }

    /// Returns the next update if one is ready.
    pub fn try_recv(&mut self) -> Option<PendingUpdate<T>> {
        self.rx.try_recv().ok()
    }
}

/// Creates a dispatcher whose updates are consumed from an [`UpdateReceiver`].
///
/// # Examples
///
/// ```no_run
/// use async_list_adapter::view::{ListView, update_channel};
/// use async_list_adapter::ListUpdateCallback;
///
/// struct Rows;
///
/// impl ListUpdateCallback for Rows {
///     fn on_changed(&mut self, _position: usize, _count: usize) {}
///     fn on_inserted(&mut self, _position: usize, _count: usize) {}
///     fn on_moved(&mut self, _from: usize, _to: usize) {}
///     fn on_removed(&mut self, _position: usize, _count: usize) {}
/// }
///
/// impl ListView<u32> for Rows {}
///
/// # async fn example() {
/// let (dispatcher, mut updates) = update_channel::<u32>();
/// # drop(dispatcher);
/// let mut rows = Rows;
/// while let Some(pending) = updates.recv().await {
///     pending.apply_to(&mut rows);
/// }
/// # }
/// ```
#[must_use]
pub fn update_channel<T>() -> (ChannelDispatcher<T>, UpdateReceiver<T>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ChannelDispatcher { tx }, UpdateReceiver { rx })
}

impl<T: Send + Sync + 'static> Dispatcher<T> for ChannelDispatcher<T> {
    fn deliver(&self, update: ListUpdate<T>) -> BoxFuture<'_, Result<(), DeliveryError>> {
        let (ack, acked) = oneshot::channel();
        let sent = self
            .tx
            .send(PendingUpdate { update, ack })
            .map_err(|_| DeliveryError::Disconnected);
        Box::pin(async move {
            sent?;
            acked.await.map_err(|_| DeliveryError::Unacknowledged)
        })
    }
}
