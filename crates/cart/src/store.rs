//! The cart store: line items, persistence, merge logic.

use std::sync::Arc;

use petal_market_core::FlowerId;
use tokio::sync::Mutex;

use crate::catalog::CatalogClient;
use crate::channel::{DeltaTransport, InventoryChannel, InventoryDelta};
use crate::error::CartError;
use crate::indicator::StockIndicator;
use crate::item::{CartState, LineItem};
use crate::persistence::CartPersistence;

/// Result of an add-to-cart attempt, telling the caller how to update the
/// input field and stock display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// The requested number was merged into the cart. Reset the input field
    /// and show `remaining` as the available quantity.
    Added { remaining: u32 },
    /// Not enough stock; the cart was not touched and no delta was emitted.
    /// Clamp the input field to `available`; the stock indicator has been
    /// triggered.
    InsufficientStock { available: u32 },
    /// The requested number parsed to zero or less; silent no-op.
    Ignored,
}

/// Owns one session's cart line items.
///
/// All mutations are write-through: the full state is persisted immediately
/// after mutation, before any notification side effect, so a crash
/// mid-notification never loses local cart state. Mutations are serialized
/// per store instance; overlapping adds for the same flower cannot lose
/// updates.
pub struct CartStore<P, C, T> {
    persistence: P,
    catalog: C,
    channel: Arc<InventoryChannel<T>>,
    indicator: StockIndicator,
    state: Mutex<CartState>,
}

impl<P, C, T> CartStore<P, C, T>
where
    P: CartPersistence,
    C: CatalogClient,
    T: DeltaTransport,
{
    /// Load the persisted cart state and build a store around it.
    ///
    /// A missing or malformed persisted entry loads as the empty cart.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Persistence`] when the backend cannot be read.
    pub async fn load(
        persistence: P,
        catalog: C,
        channel: Arc<InventoryChannel<T>>,
    ) -> Result<Self, CartError> {
        let state = persistence.load().await?;
        Ok(Self {
            persistence,
            catalog,
            channel,
            indicator: StockIndicator::new(),
            state: Mutex::new(state),
        })
    }

    /// An owned, independent copy of the current line items.
    pub async fn items(&self) -> Vec<LineItem> {
        self.state.lock().await.items()
    }

    /// This session's reserved number for `id` (0 when not held).
    pub async fn number_of(&self, id: FlowerId) -> u32 {
        self.state.lock().await.number_of(id)
    }

    /// The notification channel this store emits deltas on.
    #[must_use]
    pub fn channel(&self) -> &Arc<InventoryChannel<T>> {
        &self.channel
    }

    /// The transient out-of-stock indicator.
    #[must_use]
    pub fn indicator(&self) -> &StockIndicator {
        &self.indicator
    }

    /// Try to add `requested` flowers of `flower_id` to the cart.
    ///
    /// A request of zero or less is a silent no-op. Otherwise the flower's
    /// live quantity is fetched; with enough stock the request merges into
    /// the cart, persists, and emits a positive delta. With too little stock
    /// nothing mutates and the indicator is triggered.
    ///
    /// # Errors
    ///
    /// A catalog fetch failure propagates and blocks the add: the cart never
    /// mutates without successful stock confirmation.
    pub async fn add_to_cart(
        &self,
        flower_id: FlowerId,
        requested: i64,
    ) -> Result<AddOutcome, CartError> {
        let Ok(requested) = u32::try_from(requested) else {
            return Ok(AddOutcome::Ignored);
        };
        if requested == 0 {
            return Ok(AddOutcome::Ignored);
        }

        // Single-flight: hold the state lock across validation and merge.
        let mut state = self.state.lock().await;

        let flower = self.catalog.flower(flower_id).await?;
        if flower.quantity < requested {
            tracing::debug!(
                %flower_id,
                requested,
                available = flower.quantity,
                "add rejected, not enough stock"
            );
            self.indicator.trigger();
            return Ok(AddOutcome::InsufficientStock {
                available: flower.quantity,
            });
        }

        state.merge(flower_id, requested);
        self.persistence.save(&state).await?;
        drop(state);

        self.channel
            .notify(InventoryDelta::new(flower_id, i64::from(requested)))
            .await;

        Ok(AddOutcome::Added {
            remaining: flower.quantity - requested,
        })
    }

    /// Clear the cart and release every reservation.
    ///
    /// Emits one negated delta per previously held line item, after the empty
    /// state has been persisted. Deltas raised while the link is not open are
    /// queued by the channel, not dropped.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Persistence`] when the empty state cannot be
    /// written; the in-memory items are restored in that case.
    pub async fn reset(&self) -> Result<(), CartError> {
        let mut state = self.state.lock().await;
        let released = state.take_items();

        if let Err(e) = self.persistence.save(&state).await {
            *state = released.into_iter().collect();
            return Err(e.into());
        }
        drop(state);

        for item in released {
            self.channel
                .notify(InventoryDelta::new(item.id, -i64::from(item.number)))
                .await;
        }
        Ok(())
    }
}
