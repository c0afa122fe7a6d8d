/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Lane receipt types.
//!
//! This module defines the receipt returned to callers that wait for their
//! request to finish.

use super::outcome::Outcome;

/// Receipt returned after a submitted request has executed.
///
/// # Examples
///
/// ```
/// use async_list_adapter::lane::{Outcome, Receipt};
///
/// let receipt = Receipt::new(42, Outcome::Barrier);
/// assert_eq!(receipt.sequence_num, 42);
/// assert!(receipt.is_success());
/// ```
#[derive(Debug, Clone)]
pub struct Receipt {
    /// Sequence number assigned at enqueue time.
    pub sequence_num: u64,

    /// What executing the request produced.
    pub outcome: Outcome,
}

impl Receipt {
    /// Creates a new receipt.
    #[must_use]
    pub fn new(sequence_num: u64, outcome: Outcome) -> Self {
        Self {
            sequence_num,
            outcome,
        }
    }

    /// Returns `true` if the request completed.
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }
}
