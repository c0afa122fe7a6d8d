/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Single-lane request queue.
//!
//! This module provides [`TaskLane`], which serializes list mutations from
//! any number of producers into one ordered execution lane.
//!
//! # Architecture
//!
//! - Requests are appended to an unbounded FIFO queue under a mutex
//! - Each accepted request receives a monotonic sequence number
//! - A worker task is spawned lazily and exits once the queue is drained
//! - Each request runs in its own task and is awaited to completion
//! - Results are returned via oneshot channels to callers that wait
//! - Events are emitted to registered listeners in sequence order
//!
//! # Examples
//!
//! ```no_run
//! use async_list_adapter::lane::{LaneHandler, StepResult, StepSummary, TaskLane};
//! use std::future::Future;
//!
//! struct Counter;
//!
//! impl LaneHandler for Counter {
//!     type Item = u32;
//!
//!     fn on_insert(&self, items: Vec<u32>) -> impl Future<Output = StepResult> + Send {
//!         async move {
//!             Ok(StepSummary { previous_len: 0, len: items.len(), edits: 1, delivered: true })
//!         }
//!     }
//!
//!     fn on_remove(&self, _item: u32) -> impl Future<Output = StepResult> + Send {
//!         async { Ok(StepSummary { previous_len: 0, len: 0, edits: 0, delivered: true }) }
//!     }
//!
//!     fn on_clear(&self) -> impl Future<Output = StepResult> + Send {
//!         async { Ok(StepSummary { previous_len: 0, len: 0, edits: 0, delivered: true }) }
//!     }
//! }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let lane = TaskLane::new(Counter, tokio::runtime::Handle::current());
//!
//! lane.add_listener(|event| {
//!     println!("Request {} ({}): {:?}", event.sequence_num, event.kind, event.outcome);
//! });
//!
//! lane.enqueue_insert(vec![1, 2, 3])?;
//! lane.flush().await?;
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod event;
pub mod outcome;
pub mod receipt;
pub mod request;


// Re-export main types
pub use core::{LaneError, LaneHandler, TaskLane};
pub use event::LaneEvent;
pub use outcome::{Outcome, StepError, StepResult, StepSummary};
pub use receipt::Receipt;
pub use request::{Barrier, Request, RequestKind};
