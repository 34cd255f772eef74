// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `EventBus` (E1) — a bounded, best-effort FIFO of `RunEvent`s carried
//! from the Orchestrator/Cleanup Coordinator to the UI collaborator.
//!
//! The queue itself is a `VecDeque` behind a `parking_lot::Mutex` so a
//! full queue can genuinely evict its oldest entry (a plain bounded
//! `tokio::sync::mpsc` channel only rejects new sends on overflow, which
//! would drop the *newest* event instead of the oldest). A
//! capacity-1 `tokio::sync::mpsc` channel is used purely as a doorbell
//! to wake a waiting consumer without it polling.

use std::collections::VecDeque;
use std::sync::Arc;

use campers_core::{Clock, RunEvent, RunEventPayload};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::warn;

/// Capacity of the event queue, per §4.E1.
pub const EVENT_BUS_CAPACITY: usize = 100;

struct Shared {
    queue: Mutex<VecDeque<RunEvent>>,
    capacity: usize,
    doorbell: mpsc::Sender<()>,
}

/// Producer handle. `Clone`-able: the Orchestrator, the Cleanup
/// Coordinator, and ad-hoc log emitters all hold one.
#[derive(Clone)]
pub struct EventBus<C: Clock> {
    shared: Arc<Shared>,
    clock: C,
}

/// Consumer handle, held by the UI collaborator.
pub struct EventBusReceiver {
    shared: Arc<Shared>,
    doorbell: mpsc::Receiver<()>,
}

impl<C: Clock> EventBus<C> {
    /// Construct a bus with the spec's fixed capacity.
    pub fn new(clock: C) -> (Self, EventBusReceiver) {
        Self::with_capacity(clock, EVENT_BUS_CAPACITY)
    }

    /// Construct a bus with an explicit capacity (tests use a small one
    /// to exercise the drop-oldest path without enqueueing 100 events).
    pub fn with_capacity(clock: C, capacity: usize) -> (Self, EventBusReceiver) {
        let capacity = capacity.max(1);
        let (doorbell_tx, doorbell_rx) = mpsc::channel(1);
        let shared = Arc::new(Shared {
            queue: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            doorbell: doorbell_tx,
        });
        (
            Self {
                shared: shared.clone(),
                clock,
            },
            EventBusReceiver {
                shared,
                doorbell: doorbell_rx,
            },
        )
    }

    /// Enqueue a payload, timestamped by the bus's clock. Never blocks:
    /// if the queue is full, the oldest queued event is dropped to make
    /// room (best-effort, no delivery guarantee), and a warning is
    /// logged once per drop.
    pub fn publish(&self, payload: RunEventPayload) {
        let event = RunEvent::new(self.clock.epoch_ms(), payload);
        {
            let mut queue = self.shared.queue.lock();
            if queue.len() >= self.shared.capacity {
                queue.pop_front();
                warn!("event bus full, dropped oldest queued event");
            }
            queue.push_back(event);
        }
        // Best-effort wake; if the doorbell is already rung or the
        // consumer dropped, there is nothing more to do.
        let _ = self.shared.doorbell.try_send(());
    }
}

impl EventBusReceiver {
    /// Drain up to `max` queued events, blocking until at least one is
    /// available (the spec's "consumer drains up to 10 events per tick").
    pub async fn drain(&mut self, max: usize) -> Vec<RunEvent> {
        loop {
            {
                let mut queue = self.shared.queue.lock();
                if !queue.is_empty() {
                    let take = max.min(queue.len());
                    return queue.drain(..take).collect();
                }
            }
            if self.doorbell.recv().await.is_none() {
                return Vec::new();
            }
        }
    }

    /// Non-blocking drain, used by renderers on a tick loop that must
    /// not wait when nothing is queued.
    pub fn try_drain(&mut self, max: usize) -> Vec<RunEvent> {
        let mut queue = self.shared.queue.lock();
        let take = max.min(queue.len());
        queue.drain(..take).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campers_core::FakeClock;

    #[tokio::test]
    async fn publish_then_drain_preserves_fifo_order() {
        let (bus, mut rx) = EventBus::with_capacity(FakeClock::new(), 10);
        bus.publish(RunEventPayload::Log("one".into()));
        bus.publish(RunEventPayload::Log("two".into()));
        let drained = rx.drain(10).await;
        assert_eq!(drained.len(), 2);
        match (&drained[0].payload, &drained[1].payload) {
            (RunEventPayload::Log(a), RunEventPayload::Log(b)) => {
                assert_eq!(a, "one");
                assert_eq!(b, "two");
            }
            other => panic!("unexpected payloads: {other:?}"),
        }
    }

    #[tokio::test]
    async fn drain_respects_max_events_per_tick() {
        let (bus, mut rx) = EventBus::with_capacity(FakeClock::new(), 20);
        for i in 0..15 {
            bus.publish(RunEventPayload::Log(format!("event-{i}")));
        }
        let first_batch = rx.drain(10).await;
        assert_eq!(first_batch.len(), 10);
        let second_batch = rx.try_drain(10).len();
        assert_eq!(second_batch, 5);
    }

    #[tokio::test]
    async fn full_queue_drops_the_oldest_event_not_the_newest() {
        let (bus, mut rx) = EventBus::with_capacity(FakeClock::new(), 2);
        bus.publish(RunEventPayload::Log("first".into()));
        bus.publish(RunEventPayload::Log("second".into()));
        bus.publish(RunEventPayload::Log("third".into()));

        let drained = rx.drain(10).await;
        assert_eq!(drained.len(), 2);
        match (&drained[0].payload, &drained[1].payload) {
            (RunEventPayload::Log(a), RunEventPayload::Log(b)) => {
                assert_eq!(a, "second");
                assert_eq!(b, "third");
            }
            other => panic!("unexpected payloads: {other:?}"),
        }
    }

    #[tokio::test]
    async fn publish_never_blocks_when_the_queue_is_full() {
        let (bus, _rx) = EventBus::with_capacity(FakeClock::new(), 2);
        for i in 0..10 {
            bus.publish(RunEventPayload::Log(format!("event-{i}")));
        }
        // Reaching this line at all demonstrates `publish` did not block.
    }
}
