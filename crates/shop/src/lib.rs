//! Petal Market shop library.
//!
//! Provides the shop as a library so the router can be driven directly from
//! integration tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod error;
pub mod hub;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
