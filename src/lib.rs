/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! # async-list-adapter
//!
//! Binds an ordered, in-memory list of items to a list view. Every mutation
//! goes through one asynchronous lane, and each completed mutation is
//! delivered to the view as the minimal set of position-level edits
//! (changed, inserted, moved, removed) between the previous and the new list.
//!
//! ## Building blocks
//!
//! - [`lane`]: the single-lane FIFO queue. Any number of producers, one
//!   worker at a time, spawned lazily and retired when the queue drains.
//! - [`reconcile`]: merge rules for insert and remove, the shared list store
//!   and the lane handler that ties them to delivery.
//! - [`diff`]: the identity/content list diff and its edit script.
//! - [`view`]: how edit scripts reach the view, inline or through an
//!   acknowledged channel.
//! - [`adapter`]: [`ListAdapter`], the facade most callers want.
//!
//! ## Example
//!
//! ```no_run
//! use async_list_adapter::{DiffItem, ListAdapter};
//!
//! #[derive(Debug, Clone)]
//! struct Contact {
//!     id: u32,
//!     name: String,
//! }
//!
//! impl DiffItem for Contact {
//!     fn same_identity(&self, other: &Self) -> bool {
//!         self.id == other.id
//!     }
//!
//!     fn same_content(&self, other: &Self) -> bool {
//!         self.name == other.name
//!     }
//! }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let contacts = ListAdapter::<Contact>::new()?;
//!
//! contacts.add(vec![Contact { id: 1, name: "Ada".into() }])?;
//! contacts.add(vec![Contact { id: 1, name: "Ada Lovelace".into() }])?;
//! contacts.flush().await?;
//!
//! assert_eq!(contacts.len(), 1);
//! assert_eq!(contacts.items()[0].name, "Ada Lovelace");
//! # Ok(())
//! # }
//! ```
//!
//! ## Logging
//!
//! The crate emits `tracing` events and installs no subscriber.

pub mod adapter;
pub mod diff;
pub mod item;
pub mod lane;
pub mod reconcile;
pub mod view;

pub use adapter::{ConfigError, ListAdapter, ListAdapterBuilder};
pub use diff::{DiffConfig, DiffOp, DiffScript, ListUpdateCallback, calculate_diff};
pub use item::{DiffItem, ItemCallback};
pub use lane::{LaneError, LaneEvent, Outcome, Receipt, RequestKind, StepError, StepSummary};
pub use reconcile::{HookError, ReplacementPolicy};
pub use view::{
    ChannelDispatcher, DeliveryError, Detached, DirectDispatcher, Dispatcher, ListUpdate, ListView,
    PendingUpdate, UpdateReceiver, update_channel,
};
