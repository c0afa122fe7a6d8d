/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Diff script types.
//!
//! A [`DiffScript`] is the ordered list of structural edits that turns one
//! list state into the next. Edits are index dependent: each one assumes
//! every earlier edit has already been applied.

use serde::{Deserialize, Serialize};

/// A single structural edit.
///
/// Positions refer to the list as it looks after all preceding edits of the
/// same script have been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiffOp {
    /// `count` items starting at `position` kept their identity but changed content.
    Changed {
        /// First changed position.
        position: usize,
        /// Number of consecutive changed items.
        count: usize,
    },

    /// `count` new items were inserted at `position`.
    Inserted {
        /// Insertion position.
        position: usize,
        /// Number of inserted items.
        count: usize,
    },

    /// The item at `from` was moved to `to`.
    Moved {
        /// Position before the move.
        from: usize,
        /// Position after the move.
        to: usize,
    },

    /// `count` items starting at `position` were removed.
    Removed {
        /// First removed position.
        position: usize,
        /// Number of removed items.
        count: usize,
    },
}

/// Receiver of position-level list notifications.
///
/// This is the outbound contract towards the view layer. Calls arrive in
/// script order.
pub trait ListUpdateCallback {
    /// `count` items at `position` changed content.
    fn on_changed(&mut self, position: usize, count: usize);

    /// `count` items were inserted at `position`.
    fn on_inserted(&mut self, position: usize, count: usize);

    /// The item at `from` moved to `to`.
    fn on_moved(&mut self, from: usize, to: usize);

    /// `count` items were removed starting at `position`.
    fn on_removed(&mut self, position: usize, count: usize);
}

/// Ordered sequence of [`DiffOp`]s.
///
/// # Examples
///
/// ```
/// use async_list_adapter::{DiffOp, DiffScript};
///
/// let script = DiffScript::from(vec![DiffOp::Removed { position: 0, count: 2 }]);
/// assert_eq!(script.len(), 1);
/// assert_eq!(script.removed_count(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffScript {
    ops: Vec<DiffOp>,
}

impl DiffScript {
    /// Creates an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self { ops: Vec::new() }
    }

    /// Appends an edit, merging it into the previous one when both describe
    /// one contiguous range of the same kind.
    pub fn push(&mut self, op: DiffOp) {
        if let Some(last) = self.ops.last_mut() {
            match (last, op) {
                (
                    DiffOp::Changed { position, count },
                    DiffOp::Changed {
                        position: next,
                        count: more,
                    },
                )
                | (
                    DiffOp::Inserted { position, count },
                    DiffOp::Inserted {
                        position: next,
                        count: more,
                    },
                ) if *position + *count == next => {
                    *count += more;
                    return;
                }
                (
                    DiffOp::Removed { position, count },
                    DiffOp::Removed {
                        position: next,
                        count: more,
                    },
                ) if *position == next => {
                    *count += more;
                    return;
                }
                _ => {}
            }
        }
        self.ops.push(op);
    }

    /// Returns the edits in delivery order.
    #[inline]
    #[must_use]
    pub fn ops(&self) -> &[DiffOp] {
        &self.ops
    }

    /// Returns an iterator over the edits.
    pub fn iter(&self) -> std::slice::Iter<'_, DiffOp> {
        self.ops.iter()
    }

    /// Number of edits.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Returns `true` if the two lists compared equal.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Total number of removed items.
    #[must_use]
    pub fn removed_count(&self) -> usize {
        self.ops
            .iter()
            .map(|op| match op {
                DiffOp::Removed { count, .. } => *count,
                _ => 0,
            })
            .sum()
    }

    /// Total number of inserted items.
    #[must_use]
    pub fn inserted_count(&self) -> usize {
        self.ops
            .iter()
            .map(|op| match op {
                DiffOp::Inserted { count, .. } => *count,
                _ => 0,
            })
            .sum()
    }

    /// Replays the script into `callback`, in order.
    pub fn dispatch_updates_to<C>(&self, callback: &mut C)
    where
        C: ListUpdateCallback + ?Sized,
    {
        for op in &self.ops {
            match *op {
                DiffOp::Changed { position, count } => callback.on_changed(position, count),
                DiffOp::Inserted { position, count } => callback.on_inserted(position, count),
                DiffOp::Moved { from, to } => callback.on_moved(from, to),
                DiffOp::Removed { position, count } => callback.on_removed(position, count),
            }
        }
    }
}

impl From<Vec<DiffOp>> for DiffScript {
    fn from(ops: Vec<DiffOp>) -> Self {
        Self { ops }
    }
}

impl<'a> IntoIterator for &'a DiffScript {
    type Item = &'a DiffOp;
    type IntoIter = std::slice::Iter<'a, DiffOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.iter()
    }
}
