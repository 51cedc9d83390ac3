use super::{ReplaySubject, Subscription};
use crate::{
    completion::Completion,
    sequence::{CompletionSending, ElementSending, Sequence, Subject},
};
use std::fmt;

/// A subject that only forwards live elements
///
/// Elements sent while no subscription exists are dropped.
pub struct PassthroughSubject<T> {
    subject: ReplaySubject<T>,
}

/// A passthrough subject carrying no data, only the fact that something happened
pub type SignalSubject = PassthroughSubject<()>;

impl<T: Clone> PassthroughSubject<T> {
    /// Creates a subject
    pub fn new() -> Self {
        Self {
            subject: ReplaySubject::new(0),
        }
    }

    /// Sends an element to every current subscription
    pub fn send(&self, element: T) {
        self.subject.send(element);
    }

    /// Ends every subscription; see [ReplaySubject::send_completion]
    pub fn send_completion(&self, completion: Completion) {
        self.subject.send_completion(completion);
    }

    /// Completes the subject
    pub fn finish(&self) {
        self.subject.finish();
    }

    /// Starts a new subscription observing elements sent from now on
    pub fn subscribe(&self) -> Subscription<T> {
        self.subject.subscribe()
    }

    /// Returns the number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.subject.subscriber_count()
    }
}

impl PassthroughSubject<()> {
    /// Sends a signal to every current subscription
    pub fn signal(&self) {
        self.send(());
    }
}

impl<T: Clone> Default for PassthroughSubject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for PassthroughSubject<T> {
    fn clone(&self) -> Self {
        Self {
            subject: self.subject.clone(),
        }
    }
}

impl<T> fmt::Debug for PassthroughSubject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PassthroughSubject").field(&self.subject).finish()
    }
}

impl<T: Clone> Sequence for PassthroughSubject<T> {
    type Item = T;
    type Stream = Subscription<T>;

    fn stream(&self) -> Subscription<T> {
        self.subscribe()
    }
}

impl<T: Clone> ElementSending for PassthroughSubject<T> {
    type Element = T;

    fn send(&self, element: T) {
        PassthroughSubject::send(self, element);
    }
}

impl<T: Clone> CompletionSending for PassthroughSubject<T> {
    fn send_completion(&self, completion: Completion) {
        PassthroughSubject::send_completion(self, completion);
    }
}

impl<T: Clone> Subject for PassthroughSubject<T> {}
