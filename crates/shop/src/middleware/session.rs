//! Session middleware configuration.
//!
//! Sets up in-memory sessions using tower-sessions. Carts are deliberately
//! ephemeral and session-scoped, so nothing is persisted across restarts.

use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::ShopConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "pm_session";

/// Create the session layer with an in-memory store.
#[must_use]
pub fn create_session_layer(config: &ShopConfig) -> SessionManagerLayer<MemoryStore> {
    let store = MemoryStore::default();

    // Determine if we're in production (HTTPS)
    let is_secure = config.base_url.starts_with("https://");

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        // Session-of-the-browser-tab semantics: the cookie dies with the
        // browsing session, like the cart it scopes.
        .with_expiry(Expiry::OnSessionEnd)
        .with_secure(is_secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
