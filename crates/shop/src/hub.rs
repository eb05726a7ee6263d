//! Shared inventory notification hub.
//!
//! Sessions publish signed [`InventoryDelta`] increments; the hub folds them
//! into per-flower reserved totals and fans each delta out to every other
//! subscriber. New subscribers receive one snapshot delta per flower carrying
//! the current total, which is exact when folded into a zeroed tracker.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use petal_market_cart::{ChannelError, DeltaTransport, InventoryDelta};
use petal_market_core::FlowerId;
use tokio::sync::{Mutex, broadcast};

/// Identifies one hub client, so relayed deltas can skip their sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(u64);

/// A delta stamped with its sender.
#[derive(Debug, Clone, Copy)]
pub struct HubMessage {
    pub sender: ClientId,
    pub delta: InventoryDelta,
}

/// Fan-out hub for inventory deltas across sessions.
///
/// Cheaply cloneable; clones share totals and subscribers.
#[derive(Debug, Clone)]
pub struct InventoryHub {
    inner: Arc<HubInner>,
}

#[derive(Debug)]
struct HubInner {
    totals: Mutex<HashMap<FlowerId, i64>>,
    tx: broadcast::Sender<HubMessage>,
    next_client: AtomicU64,
}

impl Default for InventoryHub {
    fn default() -> Self {
        Self::new()
    }
}

impl InventoryHub {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(64);
        Self {
            inner: Arc::new(HubInner {
                totals: Mutex::new(HashMap::new()),
                tx,
                next_client: AtomicU64::new(0),
            }),
        }
    }

    /// Allocate a fresh client id.
    #[must_use]
    pub fn client_id(&self) -> ClientId {
        ClientId(self.inner.next_client.fetch_add(1, Ordering::Relaxed))
    }

    /// Subscribe to the hub.
    ///
    /// Returns the client id, a snapshot (one delta per flower with the
    /// current reserved total), and the live message stream. Callers must
    /// filter out messages whose sender matches their own id.
    pub async fn join(
        &self,
    ) -> (ClientId, Vec<InventoryDelta>, broadcast::Receiver<HubMessage>) {
        let client = self.client_id();
        // Take the totals lock before subscribing. Publishers send while
        // holding it, so every delta lands either in the snapshot or on the
        // stream, never both.
        let totals = self.inner.totals.lock().await;
        let rx = self.inner.tx.subscribe();
        let snapshot = totals
            .iter()
            .map(|(&flower_id, &number)| InventoryDelta::new(flower_id, number))
            .collect();
        (client, snapshot, rx)
    }

    /// Fold one delta into the totals and fan it out to other subscribers.
    pub async fn publish(&self, sender: ClientId, delta: InventoryDelta) {
        let mut totals = self.inner.totals.lock().await;
        *totals.entry(delta.flower_id).or_insert(0) += delta.number;
        // Send while still holding the lock, keeping the fold and the fan-out
        // one atomic step relative to `join`. A send error just means nobody
        // is listening right now.
        let _ = self.inner.tx.send(HubMessage { sender, delta });
        drop(totals);
        tracing::debug!(
            flower_id = %delta.flower_id,
            number = delta.number,
            "inventory delta published"
        );
    }

    /// Current reserved total for one flower.
    pub async fn total(&self, id: FlowerId) -> i64 {
        self.inner.totals.lock().await.get(&id).copied().unwrap_or(0)
    }
}

/// [`DeltaTransport`] publishing into the in-process hub.
///
/// Each HTTP request's cart store gets its own client id, so its deltas reach
/// every live subscriber.
#[derive(Debug, Clone)]
pub struct HubTransport {
    hub: InventoryHub,
    client: ClientId,
}

impl HubTransport {
    #[must_use]
    pub fn new(hub: InventoryHub) -> Self {
        let client = hub.client_id();
        Self { hub, client }
    }
}

impl DeltaTransport for HubTransport {
    fn send(
        &self,
        delta: InventoryDelta,
    ) -> impl std::future::Future<Output = Result<(), ChannelError>> + Send {
        async move {
            self.hub.publish(self.client, delta).await;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delta(id: i32, number: i64) -> InventoryDelta {
        InventoryDelta::new(FlowerId::new(id), number)
    }

    #[tokio::test]
    async fn test_publish_folds_totals() {
        let hub = InventoryHub::new();
        let client = hub.client_id();

        hub.publish(client, delta(1, 2)).await;
        hub.publish(client, delta(1, 3)).await;
        hub.publish(client, delta(1, -1)).await;

        assert_eq!(hub.total(FlowerId::new(1)).await, 4);
    }

    #[tokio::test]
    async fn test_snapshot_on_join() {
        let hub = InventoryHub::new();
        let publisher = hub.client_id();
        hub.publish(publisher, delta(1, 2)).await;
        hub.publish(publisher, delta(3, 5)).await;

        let (_, mut snapshot, _) = hub.join().await;
        snapshot.sort_by_key(|d| d.flower_id);
        assert_eq!(snapshot, vec![delta(1, 2), delta(3, 5)]);
    }

    #[tokio::test]
    async fn test_subscribers_see_sender_id() {
        let hub = InventoryHub::new();
        let (me, _, mut rx) = hub.join().await;
        let other = hub.client_id();

        hub.publish(other, delta(2, 1)).await;
        hub.publish(me, delta(2, 4)).await;

        let first = rx.recv().await.expect("first");
        assert_eq!(first.sender, other);
        assert_eq!(first.delta, delta(2, 1));

        // The receiving side filters its own messages out.
        let second = rx.recv().await.expect("second");
        assert_eq!(second.sender, me);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_join_snapshot_and_stream_are_a_consistent_cut() {
        // A delta published concurrently with a join must land either in the
        // snapshot or on the stream, never both: folding both double-counts.
        for _ in 0..200 {
            let hub = InventoryHub::new();
            let publisher = hub.client_id();

            let mut publishes = Vec::new();
            for _ in 0..16 {
                let hub = hub.clone();
                publishes.push(tokio::spawn(async move {
                    hub.publish(publisher, delta(1, 1)).await;
                }));
            }

            let (_, snapshot, mut rx) = hub.join().await;
            for publish in publishes {
                publish.await.expect("publish");
            }

            let mut folded: i64 = snapshot.iter().map(|d| d.number).sum();
            while let Ok(message) = rx.try_recv() {
                folded += message.delta.number;
            }
            assert_eq!(folded, hub.total(FlowerId::new(1)).await);
        }
    }

    #[tokio::test]
    async fn test_hub_transport_publishes() {
        let hub = InventoryHub::new();
        let transport = HubTransport::new(hub.clone());

        transport.send(delta(1, 2)).await.expect("send");
        assert_eq!(hub.total(FlowerId::new(1)).await, 2);
    }
}
