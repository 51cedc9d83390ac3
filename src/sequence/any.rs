use super::{Sequence, ValueProviding};
use futures::{stream::BoxStream, StreamExt};
use std::{fmt, sync::Arc};

type MakeStream<T> = dyn Fn() -> BoxStream<'static, T> + Send + Sync;

/// A type-erased [Sequence]
pub struct AnySequence<T> {
    make: Arc<MakeStream<T>>,
}

impl<T> AnySequence<T> {
    /// Erases `sequence`
    pub fn new<S>(sequence: S) -> Self
    where
        S: Sequence<Item = T> + Send + Sync + 'static,
        S::Stream: Send + 'static,
    {
        Self {
            make: Arc::new(move || sequence.stream().boxed()),
        }
    }
}

impl<T> Sequence for AnySequence<T> {
    type Item = T;
    type Stream = BoxStream<'static, T>;

    fn stream(&self) -> Self::Stream {
        (self.make)()
    }
}

impl<T> Clone for AnySequence<T> {
    fn clone(&self) -> Self {
        Self {
            make: self.make.clone(),
        }
    }
}

impl<T> fmt::Debug for AnySequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnySequence").finish_non_exhaustive()
    }
}

/// A type-erased [Sequence] that also provides its latest value
pub struct AnyValueSequence<T> {
    make: Arc<MakeStream<T>>,
    value: Arc<dyn Fn() -> T + Send + Sync>,
}

impl<T> AnyValueSequence<T> {
    /// Erases `sequence`
    pub fn new<S>(sequence: S) -> Self
    where
        S: Sequence<Item = T> + ValueProviding<Value = T> + Send + Sync + 'static,
        S::Stream: Send + 'static,
    {
        let sequence = Arc::new(sequence);
        let provider = sequence.clone();
        Self {
            make: Arc::new(move || sequence.stream().boxed()),
            value: Arc::new(move || provider.value()),
        }
    }
}

impl<T> Sequence for AnyValueSequence<T> {
    type Item = T;
    type Stream = BoxStream<'static, T>;

    fn stream(&self) -> Self::Stream {
        (self.make)()
    }
}

impl<T> ValueProviding for AnyValueSequence<T> {
    type Value = T;

    fn value(&self) -> T {
        (self.value)()
    }
}

impl<T> Clone for AnyValueSequence<T> {
    fn clone(&self) -> Self {
        Self {
            make: self.make.clone(),
            value: self.value.clone(),
        }
    }
}

impl<T> fmt::Debug for AnyValueSequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyValueSequence").finish_non_exhaustive()
    }
}
