//! # Broadcast subjects
//!
//! Multicast publishers: every [Subscription] observes every element sent while it
//! is subscribed, preceded by a replay of up to `count` recent elements.
//!
//! - [ReplaySubject] replays the last `count` elements
//! - [CurrentValueSubject] replays exactly one element and always has one
//! - [PassthroughSubject] replays nothing; elements sent with no subscription are dropped
//!
//! Each subscription owns a private [BufferedChannel] registered under an id.
//! Dropping or closing the subscription, or reaching the end of its stream,
//! removes the registry entry.

use crate::{
    channel::BufferedChannel,
    completion::Completion,
    critical::Critical,
    error::EmptyBufferError,
    sequence::{CompletionSending, ElementSending, Sequence, Subject, ValueProviding},
};
use std::{
    collections::{BTreeMap, VecDeque},
    fmt, mem,
    sync::Arc,
};
use tracing::{debug, trace};

mod current_value;
mod passthrough;
mod subscription;

#[cfg(test)]
mod test;

pub use current_value::*;
pub use passthrough::*;
pub use subscription::*;

/// A subject that replays a bounded number of recent elements to new subscriptions
///
/// Handles are cheap to clone and all address the same subject. Once the last
/// handle is dropped, every live subscription ends.
pub struct ReplaySubject<T> {
    storage: Arc<Critical<Storage<T>>>,
}

struct Storage<T> {
    ids: u64,
    channels: BTreeMap<u64, BufferedChannel<T>>,
    buffer_size: usize,
    buffer: VecDeque<T>,
    completion: Option<Completion>,
}

impl<T> Drop for Storage<T> {
    fn drop(&mut self) {
        let channels = mem::take(&mut self.channels);
        if !channels.is_empty() {
            debug!(subscriptions = channels.len(), "subject dropped, finishing subscriptions");
        }
        for channel in channels.into_values() {
            channel.finish();
        }
    }
}

impl<T: Clone> ReplaySubject<T> {
    /// Creates a subject replaying the last `count` elements
    ///
    /// A `count` of 0 gives passthrough behaviour.
    pub fn new(count: usize) -> Self {
        Self {
            storage: Arc::new(Critical::new(Storage {
                ids: 0,
                channels: BTreeMap::new(),
                buffer_size: count,
                buffer: VecDeque::new(),
                completion: None,
            })),
        }
    }

    /// Sends an element to every subscription and records it for replay
    ///
    /// Does nothing once the subject has completed.
    pub fn send(&self, element: T) {
        self.storage.with_critical_region(|store| {
            if store.completion.is_some() {
                trace!("send on completed subject ignored");
                return;
            }
            // the last destination takes the element itself
            let mut channels = store.channels.values();
            let last = channels.next_back();
            for channel in channels {
                channel.send(element.clone());
            }
            let element = match last {
                Some(last) if store.buffer_size == 0 => return last.send(element),
                Some(last) => {
                    last.send(element.clone());
                    element
                }
                None => element,
            };
            if store.buffer_size > 0 {
                store.buffer.push_back(element);
                while store.buffer.len() > store.buffer_size {
                    store.buffer.pop_front();
                }
            }
        });
    }

    /// Ends every subscription and clears the replay buffer
    ///
    /// Later sends are ignored and later subscriptions end immediately.
    /// Only the first completion takes effect.
    pub fn send_completion(&self, completion: Completion) {
        let channels = self.storage.with_critical_region(|store| {
            if store.completion.is_some() {
                return BTreeMap::new();
            }
            store.completion = Some(completion);
            store.buffer.clear();
            mem::take(&mut store.channels)
        });
        if channels.is_empty() {
            return;
        }
        debug!(subscriptions = channels.len(), "subject completed");
        for channel in channels.into_values() {
            channel.send_completion(completion);
        }
    }

    /// Completes the subject, same as `send_completion(Completion::Finished)`
    pub fn finish(&self) {
        self.send_completion(Completion::Finished);
    }

    /// Starts a new subscription
    ///
    /// The subscription first yields the replay buffer, oldest first, then every
    /// element sent afterwards.
    pub fn subscribe(&self) -> Subscription<T> {
        let channel = BufferedChannel::new();
        let id = self.storage.with_critical_region(|store| {
            if let Some(completion) = store.completion {
                channel.send_completion(completion);
                return None;
            }
            for element in &store.buffer {
                channel.send(element.clone());
            }
            store.ids += 1;
            store.channels.insert(store.ids, channel.clone());
            Some(store.ids)
        });
        match id {
            Some(id) => {
                trace!(subscription = id, "subscribed");
                Subscription::new(&channel, Some(Disposer::new(&self.storage, id)))
            }
            None => Subscription::new(&channel, None),
        }
    }

    /// Returns the most recently sent element
    ///
    /// # Panics
    ///
    /// Panics if the replay buffer is empty: nothing was sent yet, the replay
    /// count is 0, or the subject has completed. Use [try_value](Self::try_value)
    /// where that can happen.
    pub fn value(&self) -> T {
        match self.try_value() {
            Ok(value) => value,
            Err(e) => panic!("ReplaySubject::value called on a subject without a value: {}", e),
        }
    }

    /// Returns the most recently sent element, if the replay buffer holds one
    pub fn try_value(&self) -> Result<T, EmptyBufferError> {
        self.storage
            .with_critical_region(|store| store.buffer.back().cloned())
            .ok_or(EmptyBufferError)
    }

    /// Returns the number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.storage.with_critical_region(|store| store.channels.len())
    }

    /// Returns the number of elements replayed to new subscriptions
    pub fn replay_count(&self) -> usize {
        self.storage.with_critical_region(|store| store.buffer_size)
    }

    /// Returns `true` once the subject has completed
    pub fn is_completed(&self) -> bool {
        self.storage.with_critical_region(|store| store.completion.is_some())
    }
}

impl<T> Clone for ReplaySubject<T> {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
        }
    }
}

impl<T> fmt::Debug for ReplaySubject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (subscriptions, buffered) = self
            .storage
            .with_critical_region(|store| (store.channels.len(), store.buffer.len()));
        f.debug_struct("ReplaySubject")
            .field("subscriptions", &subscriptions)
            .field("buffered", &buffered)
            .finish()
    }
}

impl<T: Clone> Sequence for ReplaySubject<T> {
    type Item = T;
    type Stream = Subscription<T>;

    fn stream(&self) -> Subscription<T> {
        self.subscribe()
    }
}

impl<T: Clone> ElementSending for ReplaySubject<T> {
    type Element = T;

    fn send(&self, element: T) {
        ReplaySubject::send(self, element);
    }
}

impl<T: Clone> CompletionSending for ReplaySubject<T> {
    fn send_completion(&self, completion: Completion) {
        ReplaySubject::send_completion(self, completion);
    }
}

impl<T: Clone> ValueProviding for ReplaySubject<T> {
    type Value = T;

    fn value(&self) -> T {
        ReplaySubject::value(self)
    }
}

impl<T: Clone> Subject for ReplaySubject<T> {}
