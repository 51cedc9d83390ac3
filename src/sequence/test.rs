use super::*;
use crate::{
    channel::{BufferedChannel, ThrowingBufferedChannel},
    subject::{CurrentValueSubject, PassthroughSubject, ReplaySubject},
};
use futures::StreamExt;

fn publish<S>(subject: &S, elements: impl IntoIterator<Item = S::Element>)
where
    S: ElementSending + CompletionSending,
{
    for element in elements {
        subject.send(element);
    }
    subject.send_completion(Completion::Finished);
}

async fn first<S: Sequence>(sequence: &S) -> Option<S::Item>
where
    S::Stream: Unpin,
{
    sequence.stream().next().await
}

#[tokio::test]
async fn erased_channel() {
    let channel = BufferedChannel::new();
    let erased = channel.clone().erase();
    publish(&channel, [1, 2, 3]);

    let received: Vec<i32> = erased.stream().collect().await;
    assert_eq!(received, [1, 2, 3]);
}

#[tokio::test]
async fn erased_subject_streams_are_independent() {
    let subject = ReplaySubject::new(1);
    let erased: AnySequence<i32> = subject.clone().erase();
    let left = erased.stream();
    let right = erased.clone().stream();
    publish(&subject, [1, 2]);

    assert_eq!(left.collect::<Vec<_>>().await, [1, 2]);
    assert_eq!(right.collect::<Vec<_>>().await, [1, 2]);
}

#[tokio::test]
async fn erased_value_sequence() {
    let subject = CurrentValueSubject::new(10);
    let erased = AnyValueSequence::new(subject.clone());
    assert_eq!(erased.value(), 10);

    subject.send(11);
    assert_eq!(erased.value(), 11);
    assert_eq!(first(&erased).await, Some(11));
}

#[tokio::test]
async fn subjects_through_interfaces() {
    async fn drain<S: Subject>(subject: &S, elements: Vec<S::Element>) -> Vec<S::Item> {
        let stream = subject.stream();
        publish(subject, elements);
        stream.collect().await
    }

    assert_eq!(drain(&PassthroughSubject::new(), vec![1, 2]).await, [1, 2]);
    assert_eq!(drain(&ReplaySubject::new(4), vec![1, 2]).await, [1, 2]);
    assert_eq!(drain(&CurrentValueSubject::new(0), vec![1, 2]).await, [0, 1, 2]);
}

#[tokio::test]
async fn failable_completion_through_interface() {
    fn fail<S: FailableCompletionSending<Failure = &'static str>>(sender: &S) {
        sender.send_completion(FailableCompletion::Failure("closed"));
    }

    let channel = ThrowingBufferedChannel::<i32, &'static str>::new();
    ElementSending::send(&channel, 1);
    fail(&channel);
    assert!(ElementBuffering::has_buffered_elements(&channel));

    let received: Vec<_> = channel.stream().collect().await;
    assert_eq!(received, [Ok(1), Err("closed")]);
}
