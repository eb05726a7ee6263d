//! Application state shared across handlers.

use std::sync::Arc;

use crate::catalog::FlowerRepository;
use crate::config::ShopConfig;
use crate::hub::InventoryHub;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// configuration, the flower catalog, and the inventory notification hub.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ShopConfig,
    catalog: FlowerRepository,
    hub: InventoryHub,
}

impl AppState {
    /// Create a new application state with a seeded catalog.
    #[must_use]
    pub fn new(config: ShopConfig) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog: FlowerRepository::seeded(),
                hub: InventoryHub::new(),
            }),
        }
    }

    /// Get a reference to the shop configuration.
    #[must_use]
    pub fn config(&self) -> &ShopConfig {
        &self.inner.config
    }

    /// Get a reference to the flower catalog repository.
    #[must_use]
    pub fn catalog(&self) -> &FlowerRepository {
        &self.inner.catalog
    }

    /// Get a reference to the inventory notification hub.
    #[must_use]
    pub fn hub(&self) -> &InventoryHub {
        &self.inner.hub
    }
}
