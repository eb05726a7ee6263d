//! Market page with add-to-cart controls.
//!
//! Each flower row shows the remaining stock (catalog quantity minus what is
//! already in this session's cart) and how many units other sessions have
//! reserved. The reservation counts are kept live by the inventory stream;
//! the page embeds this session's own numbers so the script can subtract them
//! from the shared totals.

use std::collections::HashMap;

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use axum::response::IntoResponse;
use tower_sessions::Session;
use tracing::instrument;

use crate::catalog::Flower;
use crate::error::Result;
use crate::routes::cart_store;
use crate::state::AppState;

/// One market row.
pub struct MarketRow {
    pub flower: Flower,
    /// Units of this flower in the session's own cart.
    pub in_cart: u32,
    /// Catalog stock minus the session's own cart.
    pub available: u32,
    /// Units reserved by other sessions; hidden when zero or negative.
    pub elsewhere: i64,
}

/// Market page template.
#[derive(Template, WebTemplate)]
#[template(path = "market.html")]
pub struct MarketTemplate {
    pub rows: Vec<MarketRow>,
    /// JSON object mapping flower id to this session's cart number, consumed
    /// by the inventory stream script.
    pub own_numbers: String,
}

/// Display the market page.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
) -> Result<impl IntoResponse> {
    let store = cart_store(&state, session).await?;

    let mut rows = Vec::new();
    let mut own = HashMap::new();
    for flower in state.catalog().get_all().await {
        let in_cart = store.number_of(flower.id).await;
        let total = state.hub().total(flower.id).await;
        let elsewhere = total - i64::from(in_cart);
        if in_cart > 0 {
            own.insert(flower.id, in_cart);
        }
        let available = flower.quantity.saturating_sub(in_cart);
        rows.push(MarketRow {
            flower,
            in_cart,
            available,
            elsewhere,
        });
    }

    let own_numbers = serde_json::to_string(&own)
        .map_err(|e| crate::error::AppError::Internal(e.to_string()))?;

    Ok(MarketTemplate { rows, own_numbers })
}
