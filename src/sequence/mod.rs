//! # Sequence interfaces
//!
//! Capabilities that collaborators depend on instead of concrete channel or subject types:
//!
//! - [Sequence] produces a fresh pull-based [Stream] per consumer
//! - [ValueProviding] reports the latest value synchronously
//! - [ElementSending], [CompletionSending] and [FailableCompletionSending] publish
//! - [ElementBuffering] tells whether the next element is available without suspending
//!
//! [AnySequence] and [AnyValueSequence] erase the concrete type behind these interfaces.

use crate::completion::{Completion, FailableCompletion};
use futures::Stream;

mod any;

#[cfg(test)]
mod test;

pub use any::*;

/// Something that can be consumed as a pull-based stream
///
/// Every call to [stream](Sequence::stream) starts a new consumer. A stream is not
/// restartable: once it ends, a fresh one is required to consume again.
pub trait Sequence {
    /// Produced element type
    type Item;

    /// Stream type handed to each consumer
    type Stream: Stream<Item = Self::Item>;

    /// Starts a new consumer
    fn stream(&self) -> Self::Stream;

    /// Erases the concrete sequence type
    fn erase(self) -> AnySequence<Self::Item>
    where
        Self: Sized + Send + Sync + 'static,
        Self::Stream: Send + 'static,
    {
        AnySequence::new(self)
    }
}

/// Something that synchronously provides its latest value
pub trait ValueProviding {
    /// Provided value type
    type Value;

    /// Returns the latest value
    fn value(&self) -> Self::Value;
}

/// Something that publishes elements
pub trait ElementSending {
    /// Published element type
    type Element;

    /// Publishes an element without blocking
    fn send(&self, element: Self::Element);
}

/// Something that can be ended with a [Completion]
pub trait CompletionSending {
    /// Publishes the terminal outcome
    fn send_completion(&self, completion: Completion);
}

/// Something that can be ended with a [FailableCompletion]
pub trait FailableCompletionSending {
    /// Error type of the failure outcome
    type Failure;

    /// Publishes the terminal outcome
    fn send_completion(&self, completion: FailableCompletion<Self::Failure>);
}

/// Something that buffers elements
pub trait ElementBuffering {
    /// Returns `true` if the next element is available without suspending
    fn has_buffered_elements(&self) -> bool;
}

/// A multicast publisher: every consumer observes every element sent after it subscribed
pub trait Subject: Sequence + ElementSending + CompletionSending {}
