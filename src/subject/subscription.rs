use super::Storage;
use crate::{
    channel::{BufferedChannel, ChannelStream},
    critical::Critical,
    sequence::ElementBuffering,
};
use futures::{stream::FusedStream, Stream, StreamExt};
use std::{
    pin::Pin,
    sync::{Arc, Weak},
    task::{Context, Poll},
};
use tracing::trace;

/// Subject subscription
///
/// Yields the subject's replayed elements followed by every element sent while
/// subscribed, then `None` once the subject completes. The subscription leaves
/// the subject when it is dropped, closed, or has reached its end.
pub struct Subscription<T> {
    elements: ChannelStream<T>,
    disposer: Option<Disposer<T>>,
}

impl<T> Subscription<T> {
    pub(super) fn new(channel: &BufferedChannel<T>, disposer: Option<Disposer<T>>) -> Self {
        Self {
            elements: channel.stream(),
            disposer,
        }
    }

    /// Receives the next value for this Subscription
    ///
    /// Returns `None` once the subject has completed.
    pub async fn recv(&mut self) -> Option<T> {
        self.next().await
    }

    /// Closes the subscription
    ///
    /// Dropping the subscription has the same effect.
    pub fn close(mut self) {
        self.dispose();
    }

    /// Returns `true` if the next element is available without suspending
    pub fn has_buffered_elements(&self) -> bool {
        self.elements.has_buffered_elements()
    }

    fn dispose(&mut self) {
        if let Some(disposer) = self.disposer.take() {
            disposer.dispose();
        }
    }
}

impl<T> Stream for Subscription<T> {
    type Item = T;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        let polled = self.elements.poll_next_unpin(cx);
        if let Poll::Ready(None) = polled {
            self.dispose();
        }
        polled
    }
}

impl<T> FusedStream for Subscription<T> {
    fn is_terminated(&self) -> bool {
        self.elements.is_terminated()
    }
}

impl<T> ElementBuffering for Subscription<T> {
    fn has_buffered_elements(&self) -> bool {
        Subscription::has_buffered_elements(self)
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.dispose();
    }
}

// removes a subscription's channel from the subject registry by id.
pub(super) struct Disposer<T> {
    storage: Weak<Critical<Storage<T>>>,
    id: u64,
}

impl<T> Disposer<T> {
    pub(super) fn new(storage: &Arc<Critical<Storage<T>>>, id: u64) -> Self {
        Self {
            storage: Arc::downgrade(storage),
            id,
        }
    }

    fn dispose(self) {
        let Some(storage) = self.storage.upgrade() else {
            return;
        };
        let removed = storage.with_critical_region(|store| store.channels.remove(&self.id));
        if removed.is_some() {
            trace!(subscription = self.id, "subscription disposed");
        }
    }
}
