//! Route handlers for the shop.
//!
//! # Route Table
//!
//! | Method | Path                 | Handler             | Description                      |
//! |--------|----------------------|---------------------|----------------------------------|
//! | GET    | `/`                  | `home::show`        | Landing page, flowers by category |
//! | GET    | `/market`            | `market::show`      | Market page with add-to-cart      |
//! | GET    | `/cart`              | `cart::show`        | Cart contents table               |
//! | POST   | `/cart/add`          | `cart::add`         | Add a line to the session cart    |
//! | POST   | `/cart/checkout`     | `cart::checkout`    | Check out and clear the cart      |
//! | GET    | `/api/flowers`       | `api::list_flowers` | Full catalog as JSON              |
//! | GET    | `/api/flower/{id}`   | `api::get_flower`   | Single flower as JSON             |
//! | GET    | `/ws/inventory`      | `ws::inventory`     | Live inventory delta stream       |
//! | GET    | `/health`            | `health`            | Liveness probe                    |

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use petal_market_cart::{CartStore, InventoryChannel};

use crate::{
    catalog::RepositoryCatalog,
    error::Result,
    hub::HubTransport,
    middleware::create_session_layer,
    services::SessionCart,
    state::AppState,
};

pub mod api;
pub mod cart;
pub mod home;
pub mod market;
pub mod ws;

/// Session-scoped cart store wired to the shared inventory hub.
pub type SessionCartStore = CartStore<SessionCart, RepositoryCatalog, HubTransport>;

/// Load the caller's cart and attach it to the inventory hub.
///
/// The channel is opened before the store loads, so stock notifications go
/// out immediately rather than queueing.
pub(crate) async fn cart_store(
    state: &AppState,
    session: tower_sessions::Session,
) -> Result<SessionCartStore> {
    let channel = Arc::new(InventoryChannel::new());
    channel.open(HubTransport::new(state.hub().clone())).await;

    let store = CartStore::load(
        SessionCart::new(session),
        RepositoryCatalog::new(state.catalog().clone()),
        channel,
    )
    .await?;
    Ok(store)
}

async fn health() -> &'static str {
    "OK"
}

/// Assemble the full application router, middleware included.
pub fn app(state: AppState) -> Router {
    let session_layer = create_session_layer(state.config());

    Router::new()
        .route("/", get(home::show))
        .route("/market", get(market::show))
        .route("/cart", get(cart::show))
        .route("/cart/add", post(cart::add))
        .route("/cart/checkout", post(cart::checkout))
        .route("/api/flowers", get(api::list_flowers))
        .route("/api/flower/{id}", get(api::get_flower))
        .route("/ws/inventory", get(ws::inventory))
        .route("/health", get(health))
        .nest_service("/static", ServeDir::new("crates/shop/static"))
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
