/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! List diffing.
//!
//! [`calculate_diff`] compares two list states with an [`ItemCallback`] and
//! returns the [`DiffScript`] a view needs to animate from one to the other.
//!
//! [`ItemCallback`]: crate::ItemCallback

pub mod compute;
pub mod script;

pub use compute::{DiffConfig, calculate_diff};
pub use script::{DiffOp, DiffScript, ListUpdateCallback};
