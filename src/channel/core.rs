// Shared state machine behind both buffered channel flavours.
//
// Every transition is decided while holding the critical section; resuming a
// consumer (a oneshot send) always happens after the lock is released.

use crate::{completion::FailableCompletion, critical::Critical};
use std::{
    collections::VecDeque,
    future::Future,
    mem,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};
use tokio::sync::oneshot;
use tracing::{debug, trace};

// what a receive call resolves to.
pub(crate) enum Delivery<T, E> {
    Element(T),
    Finished,
    Failed(E),
}

impl<T, E> From<FailableCompletion<E>> for Delivery<T, E> {
    fn from(completion: FailableCompletion<E>) -> Self {
        match completion {
            FailableCompletion::Finished => Delivery::Finished,
            FailableCompletion::Failure(error) => Delivery::Failed(error),
        }
    }
}

// an entry of the queue. a completion is only ever the last entry.
pub(crate) enum Value<T, E> {
    Element(T),
    Completion(FailableCompletion<E>),
}

// a suspended receive call, identified by its id.
struct Consumer<T, E> {
    id: u64,
    handle: oneshot::Sender<Delivery<T, E>>,
}

impl<T, E> Consumer<T, E> {
    // resumes the consumer. gives the element back if the receiving side is gone.
    fn resume(self, delivery: Delivery<T, E>) -> Option<T> {
        match self.handle.send(delivery) {
            Ok(()) => None,
            Err(Delivery::Element(element)) => Some(element),
            Err(_) => None,
        }
    }
}

// invariant: `Queued` is never empty while consumers are waiting and
// `Awaiting` is never empty (it falls back to `Idle`).
enum State<T, E> {
    Idle,
    Queued(VecDeque<Value<T, E>>),
    Awaiting(VecDeque<Consumer<T, E>>),
    Finished(FailableCompletion<E>),
}

struct Storage<T, E> {
    ids: u64,
    state: State<T, E>,
}

enum SendDecision<T, E> {
    Nothing,
    Resume(Consumer<T, E>, T),
    Finish(Vec<Consumer<T, E>>),
    Fail(Vec<Consumer<T, E>>, E),
}

enum Registration<T, E> {
    Ready(Delivery<T, E>),
    Suspended(Waiting<T, E>),
}

struct Waiting<T, E> {
    id: u64,
    handle: oneshot::Receiver<Delivery<T, E>>,
}

pub(crate) struct Core<T, E> {
    storage: Critical<Storage<T, E>>,
}

impl<T, E> Core<T, E> {
    pub(crate) fn new() -> Self {
        Self {
            storage: Critical::new(Storage {
                ids: 0,
                state: State::Idle,
            }),
        }
    }

    pub(crate) fn has_buffered_elements(&self) -> bool {
        self.storage.with_critical_region(|store| match &store.state {
            State::Queued(values) => !values.is_empty(),
            State::Finished(_) => true,
            State::Idle | State::Awaiting(_) => false,
        })
    }

    // removes a suspended consumer. returns false if a send already claimed it.
    fn cancel(&self, id: u64) -> bool {
        let removed = self.storage.with_critical_region(|store| {
            let State::Awaiting(consumers) = &mut store.state else {
                return None;
            };
            let position = consumers.iter().position(|consumer| consumer.id == id)?;
            let removed = consumers.remove(position);
            if consumers.is_empty() {
                store.state = State::Idle;
            }
            removed
        });
        if removed.is_some() {
            trace!(consumer = id, "receive cancelled");
        }
        removed.is_some()
    }

    // puts back an element whose consumer went away before observing it.
    // it goes to the head of the queue, or to the next waiting consumer.
    // a terminal channel queues it again ahead of its completion.
    fn restore(&self, mut element: T) {
        loop {
            let claimed = self.storage.with_critical_region(|store| {
                let (state, claimed) = match mem::replace(&mut store.state, State::Idle) {
                    State::Idle => (queued(Value::Element(element)), None),
                    State::Queued(mut values) => {
                        values.push_front(Value::Element(element));
                        (State::Queued(values), None)
                    }
                    State::Awaiting(mut consumers) => match consumers.pop_front() {
                        Some(consumer) => (awaiting(consumers), Some((consumer, element))),
                        None => (queued(Value::Element(element)), None),
                    },
                    State::Finished(completion) => {
                        trace!("element restored ahead of completion");
                        let values =
                            VecDeque::from([Value::Element(element), Value::Completion(completion)]);
                        (State::Queued(values), None)
                    }
                };
                store.state = state;
                claimed
            });
            let Some((consumer, claimed)) = claimed else {
                return;
            };
            match consumer.resume(Delivery::Element(claimed)) {
                None => return,
                Some(returned) => element = returned,
            }
        }
    }
}

impl<T, E: Clone> Core<T, E> {
    pub(crate) fn send(&self, value: Value<T, E>) {
        let decision = self.storage.with_critical_region(|store| {
            let (state, decision) = match (mem::replace(&mut store.state, State::Idle), value) {
                (State::Idle, Value::Element(element)) => {
                    (queued(Value::Element(element)), SendDecision::Nothing)
                }
                (State::Idle, Value::Completion(completion)) => {
                    (State::Finished(completion), SendDecision::Nothing)
                }
                (State::Queued(mut values), value) => {
                    if let Some(Value::Completion(_)) = values.back() {
                        trace!("send after queued completion ignored");
                    } else {
                        values.push_back(value);
                    }
                    (State::Queued(values), SendDecision::Nothing)
                }
                (State::Awaiting(mut consumers), Value::Element(element)) => {
                    debug_assert!(!consumers.is_empty(), "awaiting state without consumers");
                    match consumers.pop_front() {
                        Some(consumer) => {
                            (awaiting(consumers), SendDecision::Resume(consumer, element))
                        }
                        None => (queued(Value::Element(element)), SendDecision::Nothing),
                    }
                }
                (State::Awaiting(consumers), Value::Completion(completion)) => {
                    let consumers = Vec::from(consumers);
                    let decision = match &completion {
                        FailableCompletion::Finished => SendDecision::Finish(consumers),
                        FailableCompletion::Failure(error) => {
                            SendDecision::Fail(consumers, error.clone())
                        }
                    };
                    (State::Finished(completion), decision)
                }
                (State::Finished(completion), _) => {
                    trace!("send on terminal channel ignored");
                    (State::Finished(completion), SendDecision::Nothing)
                }
            };
            store.state = state;
            decision
        });

        match decision {
            SendDecision::Nothing => {}
            SendDecision::Resume(consumer, element) => {
                let id = consumer.id;
                if let Some(element) = consumer.resume(Delivery::Element(element)) {
                    trace!(consumer = id, "consumer gone before delivery, restoring element");
                    self.restore(element);
                }
            }
            SendDecision::Finish(consumers) => {
                debug!(consumers = consumers.len(), "channel finished");
                for consumer in consumers {
                    consumer.resume(Delivery::Finished);
                }
            }
            SendDecision::Fail(consumers, error) => {
                debug!(consumers = consumers.len(), "channel failed");
                for consumer in consumers {
                    consumer.resume(Delivery::Failed(error.clone()));
                }
            }
        }
    }

    // either answers the receive call right away or registers it as a waiting consumer.
    fn register(&self) -> Registration<T, E> {
        self.storage.with_critical_region(|store| {
            store.ids += 1;
            let id = store.ids;
            let (state, registration) = match mem::replace(&mut store.state, State::Idle) {
                State::Idle => {
                    let (consumer, waiting) = suspend(id);
                    (awaiting(VecDeque::from([consumer])), waiting)
                }
                State::Queued(mut values) => match values.pop_front() {
                    Some(Value::Element(element)) => {
                        let state = if values.is_empty() {
                            State::Idle
                        } else {
                            State::Queued(values)
                        };
                        (state, Registration::Ready(Delivery::Element(element)))
                    }
                    Some(Value::Completion(completion)) => {
                        let delivery = completion.clone().into();
                        (State::Finished(completion), Registration::Ready(delivery))
                    }
                    None => {
                        let (consumer, waiting) = suspend(id);
                        (awaiting(VecDeque::from([consumer])), waiting)
                    }
                },
                State::Awaiting(mut consumers) => {
                    let (consumer, waiting) = suspend(id);
                    consumers.push_back(consumer);
                    (State::Awaiting(consumers), waiting)
                }
                State::Finished(completion) => {
                    let delivery = completion.clone().into();
                    (State::Finished(completion), Registration::Ready(delivery))
                }
            };
            if let Registration::Suspended(_) = registration {
                trace!(consumer = id, "receive suspended");
            }
            store.state = state;
            registration
        })
    }
}

fn queued<T, E>(value: Value<T, E>) -> State<T, E> {
    State::Queued(VecDeque::from([value]))
}

fn awaiting<T, E>(consumers: VecDeque<Consumer<T, E>>) -> State<T, E> {
    if consumers.is_empty() {
        State::Idle
    } else {
        State::Awaiting(consumers)
    }
}

fn suspend<T, E>(id: u64) -> (Consumer<T, E>, Registration<T, E>) {
    let (tx, rx) = oneshot::channel();
    let consumer = Consumer { id, handle: tx };
    let waiting = Waiting { id, handle: rx };
    (consumer, Registration::Suspended(waiting))
}

// a single receive call. registers lazily on first poll; dropping it while
// suspended cancels the call.
pub(crate) struct Next<T, E> {
    core: Arc<Core<T, E>>,
    waiting: Option<Waiting<T, E>>,
}

impl<T, E> Next<T, E> {
    pub(crate) fn new(core: Arc<Core<T, E>>) -> Self {
        Self {
            core,
            waiting: None,
        }
    }
}

// no field is structurally pinned
impl<T, E> Unpin for Next<T, E> {}

impl<T, E: Clone> Future for Next<T, E> {
    type Output = Delivery<T, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        // put the waiting state back before returning pending
        let mut waiting = match this.waiting.take() {
            Some(waiting) => waiting,
            None => match this.core.register() {
                Registration::Ready(delivery) => return Poll::Ready(delivery),
                Registration::Suspended(waiting) => waiting,
            },
        };
        match Pin::new(&mut waiting.handle).poll(cx) {
            Poll::Pending => {
                this.waiting = Some(waiting);
                Poll::Pending
            }
            // the handle is only dropped unsent by our own cancellation
            Poll::Ready(delivery) => Poll::Ready(delivery.unwrap_or(Delivery::Finished)),
        }
    }
}

impl<T, E> Drop for Next<T, E> {
    fn drop(&mut self) {
        let Some(Waiting { id, mut handle }) = self.waiting.take() else {
            return;
        };
        if self.core.cancel(id) {
            return;
        }
        // a send claimed us first; keep whatever it delivered in the channel
        handle.close();
        if let Ok(Delivery::Element(element)) = handle.try_recv() {
            trace!(consumer = id, "cancelled after claim, restoring element");
            self.core.restore(element);
        }
    }
}

// repeated receive calls over one channel, ending after the first terminal delivery.
pub(crate) struct Deliveries<T, E> {
    core: Arc<Core<T, E>>,
    next: Option<Next<T, E>>,
    terminated: bool,
}

impl<T, E> Deliveries<T, E> {
    pub(crate) fn new(core: Arc<Core<T, E>>) -> Self {
        Self {
            core,
            next: None,
            terminated: false,
        }
    }

    pub(crate) fn core(&self) -> &Arc<Core<T, E>> {
        &self.core
    }

    pub(crate) fn is_terminated(&self) -> bool {
        self.terminated
    }
}

impl<T, E: Clone> Deliveries<T, E> {
    pub(crate) fn poll_delivery(&mut self, cx: &mut Context<'_>) -> Poll<Option<Delivery<T, E>>> {
        if self.terminated {
            return Poll::Ready(None);
        }
        let core = &self.core;
        let next = self.next.get_or_insert_with(|| Next::new(core.clone()));
        match Pin::new(next).poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(delivery) => {
                self.next = None;
                if !matches!(delivery, Delivery::Element(_)) {
                    self.terminated = true;
                }
                Poll::Ready(Some(delivery))
            }
        }
    }
}
