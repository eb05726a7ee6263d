//! Best-effort duplex notification link for inventory deltas.
//!
//! Each session broadcasts a signed [`InventoryDelta`] on every successful add
//! (positive) and one per released item on reset (negative). Deltas are
//! independent signed increments, never state snapshots, so out-of-order
//! delivery across senders still converges to the correct running total.
//!
//! The channel is decoupled from any particular transport: the shop wires an
//! in-process hub behind [`DeltaTransport`], tests wire a recording fake.
//! Deltas raised while the link is not open are queued, never dropped -
//! dropped deltas would desynchronize other sessions' contention counters.

use std::collections::{HashMap, VecDeque};
use std::future::Future;

use petal_market_core::FlowerId;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;

/// Signed change in reserved quantity for one flower.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryDelta {
    pub flower_id: FlowerId,
    pub number: i64,
}

impl InventoryDelta {
    #[must_use]
    pub const fn new(flower_id: FlowerId, number: i64) -> Self {
        Self { flower_id, number }
    }
}

/// Notification link lifecycle.
///
/// `Closed` invalidates the transport; no automatic reconnection. Callers
/// treat loss of link as "notifications paused", never fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkState {
    #[default]
    Connecting,
    Open,
    Closed,
}

/// Error sending a delta over the underlying transport.
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("notification link is closed")]
    LinkClosed,

    #[error("failed to send delta: {0}")]
    Send(String),
}

/// Outbound half of the notification link.
pub trait DeltaTransport: Send + Sync {
    fn send(&self, delta: InventoryDelta) -> impl Future<Output = Result<(), ChannelError>> + Send;
}

/// Running per-flower reserved totals built from signed increments.
///
/// The tracker folds in both remote increments and this session's own sent
/// deltas, so the displayed contention `total - own` equals what other
/// sessions hold regardless of whether the hub echoes the sender's messages
/// back (it does not).
#[derive(Debug, Clone, Default)]
pub struct ContentionTracker {
    totals: HashMap<FlowerId, i64>,
}

impl ContentionTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one signed increment into the running totals.
    pub fn apply(&mut self, delta: InventoryDelta) {
        *self.totals.entry(delta.flower_id).or_insert(0) += delta.number;
    }

    /// Total reserved quantity known for `id` (all sessions, this one
    /// included).
    #[must_use]
    pub fn total(&self, id: FlowerId) -> i64 {
        self.totals.get(&id).copied().unwrap_or(0)
    }

    /// Contention to display for `id` given this session's own reserved
    /// number: `total - own`, or `None` when nothing should be shown.
    #[must_use]
    pub fn contention(&self, id: FlowerId, own: u32) -> Option<i64> {
        let elsewhere = self.total(id) - i64::from(own);
        (elsewhere > 0).then_some(elsewhere)
    }
}

/// Duplex notification link with an explicit lifecycle state machine.
///
/// Starts `Connecting`; [`InventoryChannel::open`] attaches a transport and
/// flushes queued deltas in order. On send failure the link transitions to
/// `Closed` and subsequent deltas queue again.
#[derive(Debug)]
pub struct InventoryChannel<T> {
    inner: Mutex<ChannelInner<T>>,
}

#[derive(Debug)]
struct ChannelInner<T> {
    state: LinkState,
    transport: Option<T>,
    pending: VecDeque<InventoryDelta>,
    tracker: ContentionTracker,
}

impl<T: DeltaTransport> Default for InventoryChannel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: DeltaTransport> InventoryChannel<T> {
    /// Create a channel in the `Connecting` state with no transport attached.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(ChannelInner {
                state: LinkState::Connecting,
                transport: None,
                pending: VecDeque::new(),
                tracker: ContentionTracker::new(),
            }),
        }
    }

    pub async fn state(&self) -> LinkState {
        self.inner.lock().await.state
    }

    /// Attach a transport, transition to `Open`, and flush queued deltas in
    /// send order.
    ///
    /// If a flush send fails, the unsent deltas stay queued and the link
    /// closes again.
    pub async fn open(&self, transport: T) {
        let mut inner = self.inner.lock().await;
        inner.transport = Some(transport);
        inner.state = LinkState::Open;

        while let Some(delta) = inner.pending.pop_front() {
            let Some(transport) = inner.transport.as_ref() else {
                break;
            };
            if let Err(e) = transport.send(delta).await {
                tracing::warn!(error = %e, "notification link lost while flushing, requeueing");
                inner.pending.push_front(delta);
                inner.state = LinkState::Closed;
                inner.transport = None;
                return;
            }
        }
    }

    /// Close the link and invalidate the transport.
    ///
    /// Deltas notified afterwards queue until a new transport is attached.
    pub async fn close(&self) {
        let mut inner = self.inner.lock().await;
        inner.state = LinkState::Closed;
        inner.transport = None;
    }

    /// Best-effort send of one delta.
    ///
    /// The delta is always folded into the local contention totals. While the
    /// link is not open it queues; an open link that fails to send closes and
    /// queues the delta for a later [`InventoryChannel::open`].
    pub async fn notify(&self, delta: InventoryDelta) {
        let mut inner = self.inner.lock().await;
        inner.tracker.apply(delta);

        match inner.state {
            LinkState::Open => {
                let Some(transport) = inner.transport.as_ref() else {
                    inner.pending.push_back(delta);
                    return;
                };
                if let Err(e) = transport.send(delta).await {
                    tracing::warn!(error = %e, "notification link lost, pausing notifications");
                    inner.pending.push_back(delta);
                    inner.state = LinkState::Closed;
                    inner.transport = None;
                }
            }
            LinkState::Connecting | LinkState::Closed => {
                tracing::debug!(
                    flower_id = %delta.flower_id,
                    number = delta.number,
                    "link not open, queueing delta"
                );
                inner.pending.push_back(delta);
            }
        }
    }

    /// Fold a delta received from another session into the running totals.
    pub async fn receive(&self, delta: InventoryDelta) {
        self.inner.lock().await.tracker.apply(delta);
    }

    /// Displayed contention for `id` given this session's own reserved
    /// number; `None` means hide the indicator.
    pub async fn contention(&self, id: FlowerId, own: u32) -> Option<i64> {
        self.inner.lock().await.tracker.contention(id, own)
    }

    /// Number of deltas queued while the link was not open.
    pub async fn pending_len(&self) -> usize {
        self.inner.lock().await.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::Mutex as StdMutex;

    use super::*;

    /// Transport that records sends and can be told to fail.
    #[derive(Debug, Clone, Default)]
    struct RecordingTransport {
        sent: Arc<StdMutex<Vec<InventoryDelta>>>,
        fail: Arc<StdMutex<bool>>,
    }

    impl RecordingTransport {
        fn sent(&self) -> Vec<InventoryDelta> {
            self.sent.lock().expect("lock").clone()
        }

        fn set_fail(&self, fail: bool) {
            *self.fail.lock().expect("lock") = fail;
        }
    }

    impl DeltaTransport for RecordingTransport {
        fn send(
            &self,
            delta: InventoryDelta,
        ) -> impl Future<Output = Result<(), ChannelError>> + Send {
            let result = if *self.fail.lock().expect("lock") {
                Err(ChannelError::Send("transport down".to_string()))
            } else {
                self.sent.lock().expect("lock").push(delta);
                Ok(())
            };
            async move { result }
        }
    }

    fn delta(id: i32, number: i64) -> InventoryDelta {
        InventoryDelta::new(FlowerId::new(id), number)
    }

    #[test]
    fn test_delta_wire_shape() {
        let json = serde_json::to_string(&delta(1, -2)).expect("serialize");
        assert_eq!(json, r#"{"flower_id":1,"number":-2}"#);
    }

    #[tokio::test]
    async fn test_deltas_queue_while_connecting_and_flush_in_order() {
        let channel = InventoryChannel::new();
        channel.notify(delta(1, 2)).await;
        channel.notify(delta(2, 1)).await;
        assert_eq!(channel.state().await, LinkState::Connecting);
        assert_eq!(channel.pending_len().await, 2);

        let transport = RecordingTransport::default();
        channel.open(transport.clone()).await;
        assert_eq!(channel.state().await, LinkState::Open);
        assert_eq!(transport.sent(), vec![delta(1, 2), delta(2, 1)]);
        assert_eq!(channel.pending_len().await, 0);
    }

    #[tokio::test]
    async fn test_open_link_sends_directly() {
        let channel = InventoryChannel::new();
        let transport = RecordingTransport::default();
        channel.open(transport.clone()).await;

        channel.notify(delta(3, 4)).await;
        assert_eq!(transport.sent(), vec![delta(3, 4)]);
    }

    #[tokio::test]
    async fn test_send_failure_closes_and_queues() {
        let channel = InventoryChannel::new();
        let transport = RecordingTransport::default();
        channel.open(transport.clone()).await;

        transport.set_fail(true);
        channel.notify(delta(1, 1)).await;
        assert_eq!(channel.state().await, LinkState::Closed);
        assert_eq!(channel.pending_len().await, 1);

        // Notifications stay paused, not fatal.
        channel.notify(delta(1, 2)).await;
        assert_eq!(channel.pending_len().await, 2);

        // A fresh transport drains the queue.
        let replacement = RecordingTransport::default();
        channel.open(replacement.clone()).await;
        assert_eq!(replacement.sent(), vec![delta(1, 1), delta(1, 2)]);
    }

    #[tokio::test]
    async fn test_close_invalidates_transport() {
        let channel = InventoryChannel::new();
        let transport = RecordingTransport::default();
        channel.open(transport.clone()).await;
        channel.close().await;

        channel.notify(delta(1, 1)).await;
        assert_eq!(channel.state().await, LinkState::Closed);
        assert!(transport.sent().is_empty());
        assert_eq!(channel.pending_len().await, 1);
    }

    #[tokio::test]
    async fn test_contention_subtracts_own_reservation() {
        let channel: InventoryChannel<RecordingTransport> = InventoryChannel::new();

        // Own add of 2, remote adds totalling 3: the shared total is 5.
        channel.notify(delta(1, 2)).await;
        channel.receive(delta(1, 1)).await;
        channel.receive(delta(1, 2)).await;

        assert_eq!(channel.contention(FlowerId::new(1), 2).await, Some(3));
    }

    #[tokio::test]
    async fn test_contention_hidden_when_only_own() {
        let channel: InventoryChannel<RecordingTransport> = InventoryChannel::new();
        channel.notify(delta(1, 2)).await;

        assert_eq!(channel.contention(FlowerId::new(1), 2).await, None);
    }

    #[test]
    fn test_out_of_order_increments_converge() {
        // Two interleavings of the same cross-sender deltas.
        let deltas = [delta(1, 3), delta(1, -1), delta(1, 2)];

        let mut forward = ContentionTracker::new();
        for d in deltas {
            forward.apply(d);
        }

        let mut reversed = ContentionTracker::new();
        for d in deltas.into_iter().rev() {
            reversed.apply(d);
        }

        assert_eq!(forward.total(FlowerId::new(1)), 4);
        assert_eq!(reversed.total(FlowerId::new(1)), 4);
    }

    #[test]
    fn test_tracker_negative_total_hidden() {
        let mut tracker = ContentionTracker::new();
        tracker.apply(delta(1, -2));
        assert_eq!(tracker.contention(FlowerId::new(1), 0), None);
    }
}
