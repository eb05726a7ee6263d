//! Petal Market cart domain library.
//!
//! Owns the shopping-cart bookkeeping for one session: line items, quantity
//! merging, write-through persistence, stock validation against the live
//! catalog, and best-effort inventory delta notification so other sessions can
//! display "N flowers in other carts".
//!
//! # Components
//!
//! - [`store::CartStore`] - cart line items, persistence, merge logic
//! - [`channel::InventoryChannel`] - duplex notification link for cart deltas
//! - [`catalog::CatalogClient`] - read-only flower metadata and live stock
//! - [`render::CartTable`] - projection of cart + catalog into display rows
//!
//! The library is transport- and presentation-agnostic: persistence, catalog
//! access and delta transport are traits, wired up by the embedding
//! application (the `shop` crate, or in-memory fakes in tests).

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod channel;
pub mod error;
pub mod indicator;
pub mod item;
pub mod persistence;
pub mod render;
pub mod store;

pub use catalog::{CatalogClient, CatalogEntry, CatalogError, HttpCatalogClient};
pub use channel::{
    ChannelError, ContentionTracker, DeltaTransport, InventoryChannel, InventoryDelta, LinkState,
};
pub use error::CartError;
pub use indicator::StockIndicator;
pub use item::{CartState, FormDecodeError, LineItem};
pub use persistence::{CartPersistence, MemoryPersistence, PersistenceError, STORE_KEY};
pub use render::{CartRow, CartTable};
pub use store::{AddOutcome, CartStore};
