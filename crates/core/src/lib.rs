//! Petal Market Core - Shared types library.
//!
//! This crate provides common types used across all Petal Market components:
//! - `cart` - Cart domain library (store, inventory channel, catalog client)
//! - `shop` - Public flower shop web server
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no async.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and prices

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
