/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Lane event types.
//!
//! This module defines the events emitted by the lane after executing
//! each request.

use super::outcome::Outcome;
use super::request::RequestKind;

/// Event emitted after executing a lane request.
///
/// Events are emitted in sequence order, one per executed request. Requests
/// dropped by cancellation produce no event.
///
/// # Examples
///
/// ```
/// use async_list_adapter::lane::{LaneEvent, Outcome, RequestKind};
///
/// let event = LaneEvent::new(1, 1234567890, RequestKind::Clear, Outcome::Barrier);
/// assert_eq!(event.sequence_num, 1);
/// assert!(event.outcome.is_success());
/// ```
#[derive(Debug, Clone)]
pub struct LaneEvent {
    /// Sequence number assigned at enqueue time.
    pub sequence_num: u64,

    /// Nanosecond timestamp when execution finished.
    pub timestamp_ns: u64,

    /// Kind of request that was executed.
    pub kind: RequestKind,

    /// What executing it produced.
    pub outcome: Outcome,
}

impl LaneEvent {
    /// Creates a new lane event.
    #[must_use]
    pub fn new(sequence_num: u64, timestamp_ns: u64, kind: RequestKind, outcome: Outcome) -> Self {
        Self {
            sequence_num,
            timestamp_ns,
            kind,
            outcome,
        }
    }
}
