use super::*;
use futures::{FutureExt, StreamExt};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

#[tokio::test]
async fn replay() {
    let subject = ReplaySubject::new(2);
    let early = subject.subscribe();

    subject.send(1);
    subject.send(2);
    subject.send(3);

    let late = subject.subscribe();
    assert!(late.has_buffered_elements());

    subject.send(4);
    subject.finish();

    assert_eq!(early.collect::<Vec<i32>>().await, [1, 2, 3, 4]);
    assert_eq!(late.collect::<Vec<i32>>().await, [2, 3, 4]);
}

#[tokio::test]
async fn replay_observed_before_live_elements() {
    let subject = ReplaySubject::new(2);
    subject.send(1);
    subject.send(2);
    subject.send(3);

    let mut subscription = subject.subscribe();
    assert_eq!(subscription.recv().await, Some(2));
    assert_eq!(subscription.recv().await, Some(3));
    assert_eq!(subscription.recv().now_or_never(), None);

    subject.send(4);
    subject.finish();
    assert_eq!(subscription.recv().await, Some(4));
    assert_eq!(subscription.recv().await, None);
}

#[tokio::test]
async fn replay_zero() {
    let subject = ReplaySubject::new(0);
    let early = subject.subscribe();

    subject.send(1);
    subject.send(2);
    subject.send(3);

    let late = subject.subscribe();
    assert!(!late.has_buffered_elements());

    subject.send(4);
    subject.finish();

    assert_eq!(early.collect::<Vec<i32>>().await, [1, 2, 3, 4]);
    assert_eq!(late.collect::<Vec<i32>>().await, [4]);
}

#[tokio::test]
async fn passthrough_drops_unobserved_elements() {
    let subject = PassthroughSubject::new();
    subject.send(1);

    let subscription = subject.subscribe();
    subject.send(2);
    subject.send(3);
    subject.finish();

    assert_eq!(subscription.collect::<Vec<i32>>().await, [2, 3]);
}

#[tokio::test]
async fn current_value() {
    let subject = CurrentValueSubject::new(0);
    let early = subject.subscribe();
    assert_eq!(subject.value(), 0);

    subject.send(1);
    subject.send(2);
    assert_eq!(subject.value(), 2);

    let late = subject.subscribe();
    subject.send(3);
    subject.send(4);
    subject.finish();

    assert_eq!(early.collect::<Vec<i32>>().await, [0, 1, 2, 3, 4]);
    assert_eq!(late.collect::<Vec<i32>>().await, [2, 3, 4]);
}

#[tokio::test]
async fn current_value_latest_first() {
    let subject = CurrentValueSubject::new(0);
    let mut first = subject.subscribe();
    assert_eq!(first.recv().await, Some(0));

    subject.send(1);
    let mut second = subject.subscribe();
    assert_eq!(second.recv().await, Some(1));
    assert_eq!(first.recv().await, Some(1));
}

#[tokio::test]
async fn signal() {
    let subject = SignalSubject::new();
    let subscription = subject.subscribe();
    subject.signal();
    subject.signal();
    subject.finish();
    assert_eq!(subscription.count().await, 2);
}

#[tokio::test]
async fn completion_is_idempotent() {
    let subject = ReplaySubject::new(1);
    let subscription = subject.subscribe();
    subject.send(1);
    subject.finish();
    subject.finish();
    subject.send(2);

    assert!(subject.is_completed());
    assert_eq!(subject.subscriber_count(), 0);
    assert_eq!(subscription.collect::<Vec<i32>>().await, [1]);

    let mut late = subject.subscribe();
    assert_eq!(late.recv().await, None);
    assert_eq!(subject.subscriber_count(), 0);
}

#[tokio::test]
async fn subscriptions_leave_registry() {
    let subject = PassthroughSubject::<i32>::new();
    let dropped = subject.subscribe();
    let closed = subject.subscribe();
    let kept = subject.subscribe();
    assert_eq!(subject.subscriber_count(), 3);

    drop(dropped);
    assert_eq!(subject.subscriber_count(), 2);
    closed.close();
    assert_eq!(subject.subscriber_count(), 1);

    subject.send(1);
    subject.finish();
    assert_eq!(kept.collect::<Vec<_>>().await, [1]);
}

#[tokio::test]
async fn cancelled_recv_keeps_subscription() {
    let subject = PassthroughSubject::new();
    let mut subscription = subject.subscribe();
    assert_eq!(subscription.recv().now_or_never(), None);

    subject.send(1);
    assert_eq!(subscription.recv().await, Some(1));
    assert_eq!(subject.subscriber_count(), 1);
}

#[tokio::test]
async fn dropping_subject_ends_subscriptions() {
    let subject = CurrentValueSubject::new(0);
    let subscription = subject.subscribe();
    drop(subject);
    assert_eq!(subscription.collect::<Vec<i32>>().await, [0]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn every_subscription_observes_every_element() {
    let subject = PassthroughSubject::new();
    let subscriptions: Vec<_> = (0..4)
        .map(|_| {
            let subscription = subject.subscribe();
            tokio::spawn(subscription.collect::<Vec<u32>>())
        })
        .collect();

    for i in 0..500 {
        subject.send(i);
    }
    subject.finish();

    for subscription in subscriptions {
        assert_eq!(subscription.await.unwrap(), (0..500).collect::<Vec<_>>());
    }
}

#[test]
fn value_and_try_value() {
    let subject = ReplaySubject::new(3);
    assert_eq!(subject.try_value(), Err(EmptyBufferError));
    subject.send("a");
    subject.send("b");
    assert_eq!(subject.value(), "b");
    assert_eq!(subject.replay_count(), 3);
    subject.finish();
    assert_eq!(subject.try_value(), Err(EmptyBufferError));
}

#[test]
#[should_panic]
fn value_without_element_panics() {
    let subject = ReplaySubject::<i32>::new(1);
    subject.value();
}

#[test]
#[should_panic]
fn passthrough_has_no_value() {
    let subject = ReplaySubject::new(0);
    subject.send(1);
    subject.value();
}

#[tokio::test]
async fn huge_replay_count() {
    let subject = ReplaySubject::new(usize::MAX);
    assert_eq!(subject.replay_count(), usize::MAX);
    subject.send(1u8);
    subject.send(2);
    assert_eq!(subject.value(), 2);

    let subscription = subject.subscribe();
    subject.finish();
    assert_eq!(subscription.collect::<Vec<u8>>().await, [1, 2]);
}

#[derive(Debug)]
struct Counted(Arc<AtomicUsize>);

impl Clone for Counted {
    fn clone(&self) -> Self {
        self.0.fetch_add(1, Ordering::SeqCst);
        Self(self.0.clone())
    }
}

#[test]
fn send_moves_into_last_destination() {
    let clones = Arc::new(AtomicUsize::new(0));

    let passthrough = PassthroughSubject::new();
    passthrough.send(Counted(clones.clone()));
    assert_eq!(clones.load(Ordering::SeqCst), 0);

    let _subscription = passthrough.subscribe();
    passthrough.send(Counted(clones.clone()));
    assert_eq!(clones.load(Ordering::SeqCst), 0);

    let _second = passthrough.subscribe();
    passthrough.send(Counted(clones.clone()));
    assert_eq!(clones.load(Ordering::SeqCst), 1);

    clones.store(0, Ordering::SeqCst);
    let replay = ReplaySubject::new(1);
    replay.send(Counted(clones.clone()));
    assert_eq!(clones.load(Ordering::SeqCst), 0);

    let _subscription = replay.subscribe();
    assert_eq!(clones.load(Ordering::SeqCst), 1);
    replay.send(Counted(clones.clone()));
    assert_eq!(clones.load(Ordering::SeqCst), 2);
}
