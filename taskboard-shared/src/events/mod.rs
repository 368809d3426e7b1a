/// Per-board event fanout
///
/// A process-wide registry mapping board id to the set of currently
/// subscribed observer channels. It is constructed once at startup, injected
/// wherever publishing happens, and shut down at teardown; it is not a
/// hidden global.
///
/// Delivery is at-most-once to the channels subscribed at publish time:
/// there is no replay and no persistence, so a consumer that connects after
/// an event never sees it. Publishing never blocks or fails the triggering
/// business operation; a subscriber whose bounded queue is full simply loses
/// the event (logged as a warning).
///
/// [`BoardSubscription`] is an RAII guard: dropping it (for example when a
/// streaming response's client disconnects) unsubscribes the channel, and a
/// board whose subscriber set becomes empty is removed from the registry
/// entirely.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Bounded capacity of each subscriber's queue. A consumer this far behind
/// starts losing events rather than stalling publishers.
pub const SUBSCRIBER_QUEUE_CAPACITY: usize = 64;

/// Order-changing events delivered to board observers.
///
/// Serialized as `{"event": "...", "data": {...}}` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum BoardEvent {
    /// A task changed column and/or position
    TaskMoved {
        task_id: String,
        new_column_id: i64,
        new_position: f64,
    },
}

impl BoardEvent {
    /// Builds a `task_moved` event from the committed post-state
    pub fn task_moved(task_id: i64, new_column_id: i64, new_position: f64) -> Self {
        BoardEvent::TaskMoved {
            task_id: task_id.to_string(),
            new_column_id,
            new_position,
        }
    }
}

type SubscriberMap = HashMap<u64, mpsc::Sender<BoardEvent>>;

/// Registry of live observers per board
pub struct EventFanout {
    boards: Mutex<HashMap<i64, SubscriberMap>>,
    next_subscriber_id: AtomicU64,
    closed: AtomicBool,
}

impl EventFanout {
    /// Creates an empty registry
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            boards: Mutex::new(HashMap::new()),
            next_subscriber_id: AtomicU64::new(0),
            closed: AtomicBool::new(false),
        })
    }

    /// Registers a new observer of `board_id`.
    ///
    /// The returned guard owns the receiving end of a bounded channel and
    /// unsubscribes itself when dropped. After [`shutdown`](Self::shutdown)
    /// the returned stream is already terminated: the sender is never
    /// registered, so the subscription yields nothing.
    pub fn subscribe(self: &Arc<Self>, board_id: i64) -> BoardSubscription {
        let (tx, rx) = mpsc::channel(SUBSCRIBER_QUEUE_CAPACITY);
        let subscriber_id = self.next_subscriber_id.fetch_add(1, Ordering::Relaxed);

        // The flag is read and written under this lock, so a subscribe
        // racing a shutdown either lands before the clear or sees closed.
        let mut boards = self.boards.lock().expect("fanout registry poisoned");
        if self.closed.load(Ordering::Relaxed) {
            debug!(board_id, subscriber_id, "Subscribe after shutdown, stream closed");
            drop(tx);
        } else {
            boards.entry(board_id).or_default().insert(subscriber_id, tx);
            debug!(board_id, subscriber_id, "Subscribed to board events");
        }

        BoardSubscription {
            fanout: Arc::clone(self),
            board_id,
            subscriber_id,
            receiver: rx,
        }
    }

    /// Delivers `event` to every channel currently subscribed to `board_id`.
    ///
    /// Returns the number of subscribers the event was handed to. Slow
    /// subscribers with a full queue are skipped; the event is dropped for
    /// them only.
    pub fn publish(&self, board_id: i64, event: &BoardEvent) -> usize {
        let boards = self.boards.lock().expect("fanout registry poisoned");
        let Some(subscribers) = boards.get(&board_id) else {
            return 0;
        };

        let mut delivered = 0;
        for (subscriber_id, tx) in subscribers {
            match tx.try_send(event.clone()) {
                Ok(()) => delivered += 1,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    warn!(
                        board_id,
                        subscriber_id, "Subscriber queue full, dropping event"
                    );
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    // Guard drop removes the entry; nothing to do here.
                }
            }
        }
        delivered
    }

    /// Number of channels currently subscribed to a board
    pub fn subscriber_count(&self, board_id: i64) -> usize {
        self.boards
            .lock()
            .expect("fanout registry poisoned")
            .get(&board_id)
            .map_or(0, SubscriberMap::len)
    }

    /// Drops every subscription, closing all observer streams, and refuses
    /// new subscribers from then on.
    ///
    /// Called once at application shutdown.
    pub fn shutdown(&self) {
        let mut boards = self.boards.lock().expect("fanout registry poisoned");
        self.closed.store(true, Ordering::Relaxed);
        let dropped: usize = boards.values().map(SubscriberMap::len).sum();
        boards.clear();
        debug!(dropped, "Event fanout shut down");
    }

    fn unsubscribe(&self, board_id: i64, subscriber_id: u64) {
        let mut boards = self.boards.lock().expect("fanout registry poisoned");
        if let Some(subscribers) = boards.get_mut(&board_id) {
            subscribers.remove(&subscriber_id);
            if subscribers.is_empty() {
                boards.remove(&board_id);
            }
        }
        debug!(board_id, subscriber_id, "Unsubscribed from board events");
    }
}

/// Live subscription to one board's events.
///
/// Implements [`futures::Stream`]; dropping it unsubscribes the channel.
pub struct BoardSubscription {
    fanout: Arc<EventFanout>,
    board_id: i64,
    subscriber_id: u64,
    receiver: mpsc::Receiver<BoardEvent>,
}

impl BoardSubscription {
    /// The board this subscription observes
    pub fn board_id(&self) -> i64 {
        self.board_id
    }

    /// Receives the next event; None once the fanout has shut down
    pub async fn recv(&mut self) -> Option<BoardEvent> {
        self.receiver.recv().await
    }
}

impl futures::Stream for BoardSubscription {
    type Item = BoardEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

impl Drop for BoardSubscription {
    fn drop(&mut self) {
        self.fanout.unsubscribe(self.board_id, self.subscriber_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_moved_wire_format() {
        let event = BoardEvent::task_moved(42, 7, 1.5);
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(
            json,
            r#"{"event":"task_moved","data":{"task_id":"42","new_column_id":7,"new_position":1.5}}"#
        );

        let parsed: BoardEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
    }

    #[tokio::test]
    async fn test_publish_reaches_only_board_subscribers() {
        let fanout = EventFanout::new();
        let mut sub_a = fanout.subscribe(1);
        let mut sub_b = fanout.subscribe(2);

        let event = BoardEvent::task_moved(10, 3, 2.0);
        assert_eq!(fanout.publish(1, &event), 1);

        assert_eq!(sub_a.recv().await, Some(event));
        // Board 2's subscriber saw nothing.
        assert!(sub_b.receiver.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_noop() {
        let fanout = EventFanout::new();
        assert_eq!(fanout.publish(99, &BoardEvent::task_moved(1, 1, 1.0)), 0);
    }

    #[tokio::test]
    async fn test_drop_unsubscribes_and_prunes_board_entry() {
        let fanout = EventFanout::new();
        let sub = fanout.subscribe(1);
        assert_eq!(fanout.subscriber_count(1), 1);

        drop(sub);
        assert_eq!(fanout.subscriber_count(1), 0);

        // Nothing is delivered after unsubscribe.
        assert_eq!(fanout.publish(1, &BoardEvent::task_moved(1, 1, 1.0)), 0);
    }

    #[tokio::test]
    async fn test_multiple_subscribers_each_receive() {
        let fanout = EventFanout::new();
        let mut subs = Vec::new();
        for _ in 0..3 {
            subs.push(fanout.subscribe(5));
        }

        let event = BoardEvent::task_moved(8, 5, 4.5);
        assert_eq!(fanout.publish(5, &event), 3);
        for sub in &mut subs {
            assert_eq!(sub.recv().await, Some(event.clone()));
        }
    }

    #[tokio::test]
    async fn test_full_queue_drops_event_without_blocking() {
        let fanout = EventFanout::new();
        let mut sub = fanout.subscribe(1);

        let event = BoardEvent::task_moved(1, 1, 1.0);
        for _ in 0..SUBSCRIBER_QUEUE_CAPACITY {
            assert_eq!(fanout.publish(1, &event), 1);
        }
        // Queue is full: publish completes but delivers to no one.
        assert_eq!(fanout.publish(1, &event), 0);

        // The subscriber still drains the events that did fit.
        for _ in 0..SUBSCRIBER_QUEUE_CAPACITY {
            assert!(sub.recv().await.is_some());
        }
    }

    #[tokio::test]
    async fn test_shutdown_closes_streams() {
        let fanout = EventFanout::new();
        let mut sub = fanout.subscribe(1);

        fanout.shutdown();
        assert_eq!(sub.recv().await, None);
        assert_eq!(fanout.subscriber_count(1), 0);
    }

    #[tokio::test]
    async fn test_shutdown_terminates_stream_after_buffered_events() {
        use futures::StreamExt;

        // A streaming response body polls the subscription as a Stream; it
        // must reach its end once shutdown closes the channel, or the
        // connection never drains.
        let fanout = EventFanout::new();
        let mut sub = fanout.subscribe(1);

        let event = BoardEvent::task_moved(3, 1, 2.5);
        assert_eq!(fanout.publish(1, &event), 1);
        fanout.shutdown();

        assert_eq!(sub.next().await, Some(event));
        assert_eq!(sub.next().await, None);
    }

    #[tokio::test]
    async fn test_subscribe_after_shutdown_yields_closed_stream() {
        let fanout = EventFanout::new();
        fanout.shutdown();

        let mut sub = fanout.subscribe(1);
        assert_eq!(sub.recv().await, None);
        assert_eq!(fanout.subscriber_count(1), 0);
        assert_eq!(fanout.publish(1, &BoardEvent::task_moved(1, 1, 1.0)), 0);
    }
}
