use super::{ReplaySubject, Subscription};
use crate::{
    completion::Completion,
    error::EmptyBufferError,
    sequence::{CompletionSending, ElementSending, Sequence, Subject, ValueProviding},
};
use std::fmt;

/// A subject holding a current value
///
/// Every new subscription first observes the latest value, then live updates.
pub struct CurrentValueSubject<T> {
    subject: ReplaySubject<T>,
}

impl<T: Clone> CurrentValueSubject<T> {
    /// Creates a subject whose current value is `initial`
    pub fn new(initial: T) -> Self {
        let subject = ReplaySubject::new(1);
        subject.send(initial);
        Self { subject }
    }

    /// Replaces the current value and sends it to every subscription
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

    /// Starts a new subscription beginning with the current value
    pub fn subscribe(&self) -> Subscription<T> {
        self.subject.subscribe()
    }

    /// Returns the current value
    ///
    /// # Panics
    ///
    /// Panics once the subject has completed, since completion clears the value.
    pub fn value(&self) -> T {
        self.subject.value()
    }

    /// Returns the current value, or an error once the subject has completed
    pub fn try_value(&self) -> Result<T, EmptyBufferError> {
        self.subject.try_value()
    }

    /// Returns the number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.subject.subscriber_count()
    }
}

impl<T> Clone for CurrentValueSubject<T> {
    fn clone(&self) -> Self {
        Self {
            subject: self.subject.clone(),
        }
    }
}

impl<T> fmt::Debug for CurrentValueSubject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CurrentValueSubject").field(&self.subject).finish()
    }
}

impl<T: Clone> Sequence for CurrentValueSubject<T> {
    type Item = T;
    type Stream = Subscription<T>;

    fn stream(&self) -> Subscription<T> {
        self.subscribe()
    }
}

impl<T: Clone> ElementSending for CurrentValueSubject<T> {
    type Element = T;

    fn send(&self, element: T) {
        CurrentValueSubject::send(self, element);
    }
}

impl<T: Clone> CompletionSending for CurrentValueSubject<T> {
    fn send_completion(&self, completion: Completion) {
        CurrentValueSubject::send_completion(self, completion);
    }
}

impl<T: Clone> ValueProviding for CurrentValueSubject<T> {
    type Value = T;

    fn value(&self) -> T {
        CurrentValueSubject::value(self)
    }
}

impl<T: Clone> Subject for CurrentValueSubject<T> {}
