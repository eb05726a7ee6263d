//! Cart state persistence.
//!
//! Every mutating cart operation writes the full state through to its backing
//! store before any notification side effect, so a crash mid-notification
//! never loses local cart state. A corrupt or missing stored entry is treated
//! as an empty cart, never a fatal error.

use std::future::Future;
use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::item::CartState;

/// Session-scoped key the cart state is persisted under.
pub const STORE_KEY: &str = "store";

/// Error talking to the persistence backend.
///
/// Deliberately opaque: malformed *data* never surfaces here (it decodes as
/// the empty cart); this error only covers a backend that cannot be reached
/// or written.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("cart storage backend: {0}")]
    Backend(String),
}

/// Load/save of a serializable cart state.
///
/// Implementations own the encoding; the stored representation is a JSON
/// array of `{id, number}` objects under [`STORE_KEY`].
pub trait CartPersistence: Send + Sync {
    /// Load the persisted cart state, or the empty cart when nothing valid is
    /// stored.
    fn load(&self) -> impl Future<Output = Result<CartState, PersistenceError>> + Send;

    /// Persist the full cart state, replacing whatever was stored.
    fn save(&self, state: &CartState)
    -> impl Future<Output = Result<(), PersistenceError>> + Send;
}

/// Decode a raw persisted JSON document, falling back to the empty cart on
/// malformed or missing content.
#[must_use]
pub fn decode_stored(raw: Option<&str>) -> CartState {
    raw.and_then(|raw| serde_json::from_str(raw).ok())
        .unwrap_or_default()
}

/// In-memory persistence keeping the raw JSON document.
///
/// Used by tests and embedded callers without a session store. Storing the
/// encoded document rather than the typed state keeps the malformed-input
/// path honest.
#[derive(Debug, Clone, Default)]
pub struct MemoryPersistence {
    raw: Arc<Mutex<Option<String>>>,
}

impl MemoryPersistence {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the stored document directly, bypassing encoding.
    #[must_use]
    pub fn with_raw(raw: &str) -> Self {
        Self {
            raw: Arc::new(Mutex::new(Some(raw.to_string()))),
        }
    }

    /// The raw stored document, if any.
    #[must_use]
    pub fn raw(&self) -> Option<String> {
        self.raw.lock().map(|guard| guard.clone()).unwrap_or(None)
    }
}

impl CartPersistence for MemoryPersistence {
    fn load(&self) -> impl Future<Output = Result<CartState, PersistenceError>> + Send {
        let state = self
            .raw
            .lock()
            .map(|guard| decode_stored(guard.as_deref()))
            .map_err(|_| PersistenceError::Backend("poisoned lock".to_string()));
        async move { state }
    }

    fn save(
        &self,
        state: &CartState,
    ) -> impl Future<Output = Result<(), PersistenceError>> + Send {
        let encoded = serde_json::to_string(state)
            .map_err(|e| PersistenceError::Backend(e.to_string()));
        let result = encoded.and_then(|encoded| {
            self.raw
                .lock()
                .map(|mut guard| *guard = Some(encoded))
                .map_err(|_| PersistenceError::Backend("poisoned lock".to_string()))
        });
        async move { result }
    }
}
