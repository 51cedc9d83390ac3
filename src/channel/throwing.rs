use super::core::{Core, Deliveries, Delivery, Next, Value};
use crate::{
    completion::{Completion, FailableCompletion},
    sequence::{ElementBuffering, ElementSending, FailableCompletionSending, Sequence},
};
use futures::{stream::FusedStream, Stream};
use std::{
    fmt,
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

/// A buffered channel whose terminal outcome may be a failure
///
/// Once failed, every waiting and every later receive call resolves to the error.
/// The error is cloned for each consumer.
pub struct ThrowingBufferedChannel<T, E> {
    core: Arc<Core<T, E>>,
}

impl<T, E: Clone> ThrowingBufferedChannel<T, E> {
    /// Creates an empty channel
    pub fn new() -> Self {
        Self {
            core: Arc::new(Core::new()),
        }
    }

    /// Sends an element
    ///
    /// Does nothing once the channel has finished or failed.
    pub fn send(&self, element: T) {
        self.core.send(Value::Element(element));
    }

    /// Sends a terminal outcome
    ///
    /// Elements already buffered are still delivered before the outcome.
    /// Only the first completion takes effect.
    pub fn send_completion(&self, completion: FailableCompletion<E>) {
        self.core.send(Value::Completion(completion));
    }

    /// Finishes the channel cleanly
    pub fn finish(&self) {
        self.send_completion(Completion::Finished.into());
    }

    /// Fails the channel with `error`
    pub fn fail(&self, error: E) {
        self.send_completion(FailableCompletion::Failure(error));
    }

    /// Receives the next element
    ///
    /// Resolves to `Ok(None)` once the channel has finished and to `Err` once it has failed.
    pub fn recv(&self) -> ThrowingRecv<T, E> {
        ThrowingRecv {
            next: Next::new(self.core.clone()),
        }
    }

    /// Returns a stream of received elements
    ///
    /// A failure is yielded once as `Err`, after which the stream ends.
    pub fn stream(&self) -> ThrowingChannelStream<T, E> {
        ThrowingChannelStream {
            deliveries: Deliveries::new(self.core.clone()),
        }
    }

    /// Returns `true` if a receive call would complete without suspending
    pub fn has_buffered_elements(&self) -> bool {
        self.core.has_buffered_elements()
    }
}

impl<T, E: Clone> Default for ThrowingBufferedChannel<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> Clone for ThrowingBufferedChannel<T, E> {
    fn clone(&self) -> Self {
        Self {
            core: self.core.clone(),
        }
    }
}

impl<T, E> fmt::Debug for ThrowingBufferedChannel<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThrowingBufferedChannel")
            .field("has_buffered_elements", &self.core.has_buffered_elements())
            .finish_non_exhaustive()
    }
}

/// Future returned by [ThrowingBufferedChannel::recv]
#[must_use = "futures do nothing unless polled"]
pub struct ThrowingRecv<T, E> {
    next: Next<T, E>,
}

impl<T, E: Clone> Future for ThrowingRecv<T, E> {
    type Output = Result<Option<T>, E>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.next).poll(cx).map(|delivery| match delivery {
            Delivery::Element(element) => Ok(Some(element)),
            Delivery::Finished => Ok(None),
            Delivery::Failed(error) => Err(error),
        })
    }
}

/// Stream returned by [ThrowingBufferedChannel::stream]
#[must_use = "streams do nothing unless polled"]
pub struct ThrowingChannelStream<T, E> {
    deliveries: Deliveries<T, E>,
}

impl<T, E> ThrowingChannelStream<T, E> {
    /// Returns `true` if the next item is available without suspending
    pub fn has_buffered_elements(&self) -> bool {
        self.deliveries.core().has_buffered_elements()
    }
}

impl<T, E: Clone> Stream for ThrowingChannelStream<T, E> {
    type Item = Result<T, E>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.deliveries.poll_delivery(cx).map(|delivery| match delivery? {
            Delivery::Element(element) => Some(Ok(element)),
            Delivery::Finished => None,
            Delivery::Failed(error) => Some(Err(error)),
        })
    }
}

impl<T, E: Clone> FusedStream for ThrowingChannelStream<T, E> {
    fn is_terminated(&self) -> bool {
        self.deliveries.is_terminated()
    }
}

impl<T, E: Clone> Sequence for ThrowingBufferedChannel<T, E> {
    type Item = Result<T, E>;
    type Stream = ThrowingChannelStream<T, E>;

    fn stream(&self) -> Self::Stream {
        ThrowingBufferedChannel::stream(self)
    }
}

impl<T, E: Clone> ElementSending for ThrowingBufferedChannel<T, E> {
    type Element = T;

    fn send(&self, element: T) {
        ThrowingBufferedChannel::send(self, element);
    }
}

impl<T, E: Clone> FailableCompletionSending for ThrowingBufferedChannel<T, E> {
    type Failure = E;

    fn send_completion(&self, completion: FailableCompletion<E>) {
        ThrowingBufferedChannel::send_completion(self, completion);
    }
}

impl<T, E: Clone> ElementBuffering for ThrowingBufferedChannel<T, E> {
    fn has_buffered_elements(&self) -> bool {
        ThrowingBufferedChannel::has_buffered_elements(self)
    }
}

impl<T, E> ElementBuffering for ThrowingChannelStream<T, E> {
    fn has_buffered_elements(&self) -> bool {
        ThrowingChannelStream::has_buffered_elements(self)
    }
}
