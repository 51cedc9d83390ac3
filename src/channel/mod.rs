//! # Buffered channels
//!
//! Point-to-point channels whose elements are spread across consumers: every
//! element is delivered to exactly one receive call, oldest waiting call first.
//! Sending never blocks; elements sent while nobody is waiting are buffered.
//!
//! Cancellation follows the usual future semantics: dropping a [Recv] that has
//! been polled removes its consumer from the channel. An element that was
//! already handed to a dropped call is never lost: it goes to the oldest call
//! still waiting, or back to the head of the channel, ahead of a completion if
//! the channel has finished in the meantime.
//!
//! Putting an element back can reorder it relative to elements sent after it.
//! A consumer that already received a later element observes the restored one
//! after it:
//!
//! ```rust
//! # use futures::{poll, StreamExt};
//! # use intercast::BufferedChannel;
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let channel = BufferedChannel::new();
//! let mut dropped = channel.recv();
//! assert!(poll!(&mut dropped).is_pending());
//! channel.send(1); // handed to `dropped`
//!
//! let mut other = channel.stream();
//! assert!(poll!(other.next()).is_pending());
//! channel.send(2); // handed to `other`
//!
//! drop(dropped);
//! channel.finish();
//! assert_eq!(other.collect::<Vec<_>>().await, [2, 1]);
//! # }
//! ```
//!
//! Each consumer observes elements in send order as long as no receive call is
//! dropped after it has been handed an element.

use self::core::{Core, Deliveries, Delivery, Next, Value};
use crate::{
    completion::Completion,
    sequence::{CompletionSending, ElementBuffering, ElementSending, Sequence},
};
use futures::{stream::FusedStream, Stream};
use std::{
    convert::Infallible,
    fmt,
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

mod core;
mod throwing;


pub use throwing::*;

/// A channel for sending buffered elements from one task to another
///
/// Handles are cheap to clone and all address the same channel.
pub struct BufferedChannel<T> {
    core: Arc<Core<T, Infallible>>,
}

impl<T> BufferedChannel<T> {
    /// Creates an empty channel
    pub fn new() -> Self {
        Self {
            core: Arc::new(Core::new()),
        }
    }

    /// Sends an element
    ///
    /// Resumes the oldest waiting receive call, or buffers the element if no call
    /// is waiting. Does nothing once the channel has finished.
    pub fn send(&self, element: T) {
        self.core.send(Value::Element(element));
    }

    /// Sends a terminal outcome
    ///
    /// Elements already buffered are still delivered before the end of the sequence.
    /// Waiting receive calls resolve to `None`. Sending a completion twice has no
    /// further effect.
    pub fn send_completion(&self, completion: Completion) {
        self.core.send(Value::Completion(completion.into()));
    }

    /// Finishes the channel, same as `send_completion(Completion::Finished)`
    pub fn finish(&self) {
        self.send_completion(Completion::Finished);
    }

    /// Receives the next element, or `None` once the channel has finished
    pub fn recv(&self) -> Recv<T> {
        Recv {
            next: Next::new(self.core.clone()),
        }
    }

    /// Returns a stream of the elements received by repeated [recv](Self::recv) calls
    pub fn stream(&self) -> ChannelStream<T> {
        ChannelStream {
            deliveries: Deliveries::new(self.core.clone()),
        }
    }

    /// Returns `true` if a receive call would complete without suspending
    pub fn has_buffered_elements(&self) -> bool {
        self.core.has_buffered_elements()
    }
}

impl<T> Default for BufferedChannel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for BufferedChannel<T> {
    fn clone(&self) -> Self {
        Self {
            core: self.core.clone(),
        }
    }
}

impl<T> fmt::Debug for BufferedChannel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferedChannel")
            .field("has_buffered_elements", &self.has_buffered_elements())
            .finish_non_exhaustive()
    }
}

/// Future returned by [BufferedChannel::recv]
#[must_use = "futures do nothing unless polled"]
pub struct Recv<T> {
    next: Next<T, Infallible>,
}

impl<T> Future for Recv<T> {
    type Output = Option<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.next).poll(cx).map(element)
    }
}

/// Stream returned by [BufferedChannel::stream]
///
/// Ends with the channel and cannot be restarted.
#[must_use = "streams do nothing unless polled"]
pub struct ChannelStream<T> {
    deliveries: Deliveries<T, Infallible>,
}

impl<T> ChannelStream<T> {
    /// Returns `true` if the next element is available without suspending
    pub fn has_buffered_elements(&self) -> bool {
        self.deliveries.core().has_buffered_elements()
    }
}

impl<T> Stream for ChannelStream<T> {
    type Item = T;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        self.deliveries
            .poll_delivery(cx)
            .map(|delivery| delivery.and_then(element))
    }
}

impl<T> FusedStream for ChannelStream<T> {
    fn is_terminated(&self) -> bool {
        self.deliveries.is_terminated()
    }
}

fn element<T>(delivery: Delivery<T, Infallible>) -> Option<T> {
    match delivery {
        Delivery::Element(element) => Some(element),
        Delivery::Finished => None,
        Delivery::Failed(never) => match never {},
    }
}

impl<T> Sequence for BufferedChannel<T> {
    type Item = T;
    type Stream = ChannelStream<T>;

    fn stream(&self) -> ChannelStream<T> {
        BufferedChannel::stream(self)
    }
}

impl<T> ElementSending for BufferedChannel<T> {
    type Element = T;

    fn send(&self, element: T) {
        BufferedChannel::send(self, element);
    }
}

impl<T> CompletionSending for BufferedChannel<T> {
    fn send_completion(&self, completion: Completion) {
        BufferedChannel::send_completion(self, completion);
    }
}

impl<T> ElementBuffering for BufferedChannel<T> {
    fn has_buffered_elements(&self) -> bool {
        BufferedChannel::has_buffered_elements(self)
    }
}

impl<T> ElementBuffering for ChannelStream<T> {
    fn has_buffered_elements(&self) -> bool {
        ChannelStream::has_buffered_elements(self)
    }
}
