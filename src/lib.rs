#![warn(missing_docs)]
#![warn(clippy::missing_safety_doc)]
#![warn(clippy::missing_panics_doc)]

//! Asynchronous in-process channels and broadcast subjects
//!
//! - [channel]: point-to-point [BufferedChannel] and [ThrowingBufferedChannel],
//!   whose elements are spread across consumers
//! - [subject]: multicast [ReplaySubject], [CurrentValueSubject] and
//!   [PassthroughSubject], whose elements reach every subscription
//! - [sequence]: the capability traits collaborators program against
//!
//! Sending never blocks or suspends. Receiving suspends cooperatively on whatever
//! executor polls the future; the crate spawns nothing.
//!
//! ```rust
//! use futures::StreamExt;
//! use intercast::{BufferedChannel, ReplaySubject};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let channel = BufferedChannel::new();
//! channel.send(1);
//! channel.send(2);
//! channel.finish();
//! assert_eq!(channel.stream().collect::<Vec<_>>().await, [1, 2]);
//!
//! let subject = ReplaySubject::new(2);
//! subject.send(1);
//! subject.send(2);
//! subject.send(3);
//! let mut subscription = subject.subscribe();
//! subject.send(4);
//! subject.finish();
//! assert_eq!(subscription.recv().await, Some(2));
//! assert_eq!(subscription.recv().await, Some(3));
//! assert_eq!(subscription.recv().await, Some(4));
//! assert_eq!(subscription.recv().await, None);
//! # }
//! ```

pub mod channel;
pub mod completion;
pub mod critical;
pub mod error;
pub mod sequence;
pub mod subject;

pub use channel::{BufferedChannel, ThrowingBufferedChannel};
pub use completion::{Completion, FailableCompletion};
pub use critical::Critical;
pub use error::EmptyBufferError;
pub use sequence::{
    AnySequence, AnyValueSequence, CompletionSending, ElementBuffering, ElementSending,
    FailableCompletionSending, Sequence, Subject, ValueProviding,
};
pub use subject::{
    CurrentValueSubject, PassthroughSubject, ReplaySubject, SignalSubject, Subscription,
};
