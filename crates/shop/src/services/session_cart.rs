//! Session-backed cart persistence.
//!
//! Stores the cart state in the tower-sessions session under the
//! [`STORE_KEY`] key, as a JSON array of `{id, number}` objects. One cart per
//! session; carts are ephemeral and die with the session.

use std::future::Future;

use tower_sessions::Session;

use petal_market_cart::{CartPersistence, CartState, PersistenceError, STORE_KEY};

/// [`CartPersistence`] over the request's session.
#[derive(Debug, Clone)]
pub struct SessionCart {
    session: Session,
}

impl SessionCart {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }
}

impl CartPersistence for SessionCart {
    fn load(&self) -> impl Future<Output = Result<CartState, PersistenceError>> + Send {
        async move {
            // A missing, unreadable or malformed entry is an empty cart,
            // never a fatal error.
            Ok(self
                .session
                .get::<CartState>(STORE_KEY)
                .await
                .ok()
                .flatten()
                .unwrap_or_default())
        }
    }

    fn save(
        &self,
        state: &CartState,
    ) -> impl Future<Output = Result<(), PersistenceError>> + Send {
        let state = state.clone();
        async move {
            self.session
                .insert(STORE_KEY, state)
                .await
                .map_err(|e| PersistenceError::Backend(e.to_string()))
        }
    }
}
