//! # Errors

use thiserror::Error;

/// Returned by `try_value` when a subject has no buffered element to report
///
/// Happens for a replay subject that was never sent anything, for a passthrough
/// subject, and for any subject after completion (completion clears the buffer).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[error("replay buffer is empty")]
pub struct EmptyBufferError;
