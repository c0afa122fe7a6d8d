/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Lane outcome types.
//!
//! This module defines what executing one request produced.

use thiserror::Error;
use tokio::task::JoinError;

/// Summary of a completed list mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepSummary {
    /// Length of the list before the mutation.
    pub previous_len: usize,
    /// Length of the list after the mutation.
    pub len: usize,
    /// Number of edits in the delivered script.
    pub edits: usize,
    /// Whether the view acknowledged the update.
    pub delivered: bool,
}

/// Failure of a single request. The lane keeps draining after one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepError {
    /// The post-process hook returned an error.
    #[error("post-process hook failed: {0}")]
    Hook(String),

    /// The step panicked (handler, comparator, hook or barrier callback).
    #[error("step panicked: {message}")]
    Panicked {
        /// Panic payload, when it was a string.
        message: String,
    },

    /// The step task was cancelled before finishing.
    #[error("step was aborted before completion")]
    Aborted,
}

impl From<JoinError> for StepError {
    fn from(error: JoinError) -> Self {
        if !error.is_panic() {
            return Self::Aborted;
        }
        let payload = error.into_panic();
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        Self::Panicked { message }
    }
}

/// Result returned by a lane handler.
pub type StepResult = Result<StepSummary, StepError>;

/// Outcome of executing one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The list mutation completed.
    Applied(StepSummary),

    /// A [`RunAfter`](super::Request::RunAfter) callback ran.
    Barrier,

    /// The request failed; the list kept its previous state.
    Failed {
        /// What went wrong.
        error: StepError,
    },
}

impl Outcome {
    /// Returns `true` if the request completed.
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }

    /// Returns `true` if the request failed.
    #[inline]
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Returns the mutation summary, if this was an applied mutation.
    #[must_use]
    pub fn summary(&self) -> Option<&StepSummary> {
        match self {
            Self::Applied(summary) => Some(summary),
            _ => None,
        }
    }
}

impl From<StepResult> for Outcome {
    fn from(result: StepResult) -> Self {
        match result {
            Ok(summary) => Self::Applied(summary),
            Err(error) => Self::Failed { error },
        }
    }
}
