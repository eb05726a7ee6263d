//! HTTP middleware stack for the shop.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (capture errors, trace transactions)
//! 2. `TraceLayer` (request tracing)
//! 3. Session layer (tower-sessions with in-memory store)

pub mod session;

pub use session::create_session_layer;
