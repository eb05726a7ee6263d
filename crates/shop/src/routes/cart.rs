//! Cart route handlers.
//!
//! Adds go through HTMX: the add form swaps in a fresh stock cell carrying
//! the remaining quantity, the reset-or-clamped input value, and the
//! out-of-stock indicator when the add was rejected.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use petal_market_cart::{AddOutcome, CartState, CartTable};
use petal_market_core::FlowerId;

use crate::catalog::Flower;
use crate::error::{AppError, Result};
use crate::routes::cart_store;
use crate::state::AppState;

/// Add to cart form data.
///
/// `number` arrives as raw text; anything that does not parse as an integer
/// counts as zero, matching how the market input behaves when left blank.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub flower_id: i32,
    pub number: String,
}

/// Checkout form data: the encoded cart as submitted by the hidden field.
#[derive(Debug, Deserialize)]
pub struct CheckoutForm {
    pub cart: String,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub table: CartTable,
}

/// Stock cell fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/stock_cell.html")]
pub struct StockCellTemplate {
    pub flower_id: FlowerId,
    /// Quantity to display as still available.
    pub available: u32,
    /// Value the number input is reset or clamped to.
    pub value: u32,
    /// Render the transient out-of-stock indicator.
    pub show_error: bool,
    /// Number just merged into the cart; the fragment folds it into the
    /// page's own-reservation counts so relayed deltas for this session's own
    /// add are not displayed as other carts' contention.
    pub added: u32,
}

/// Display the cart page.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
) -> Result<impl IntoResponse> {
    let store = cart_store(&state, session).await?;

    let items: CartState = store.items().await.into_iter().collect();
    let entries: Vec<_> = state
        .catalog()
        .get_all()
        .await
        .iter()
        .map(Flower::entry)
        .collect();
    let table = CartTable::project(&items, &entries)?;

    Ok(CartShowTemplate { table })
}

/// Add an item to the session cart (HTMX).
///
/// Returns the stock cell fragment for the touched flower, plus an HTMX
/// trigger so the cart badge refreshes.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let flower_id = FlowerId::new(form.flower_id);
    let requested = form.number.trim().parse::<i64>().unwrap_or(0);

    let store = cart_store(&state, session).await?;
    let outcome = store.add_to_cart(flower_id, requested).await?;

    let cell = match outcome {
        AddOutcome::Added { remaining } => StockCellTemplate {
            flower_id,
            available: remaining,
            value: 0,
            show_error: false,
            added: u32::try_from(requested).unwrap_or(0),
        },
        AddOutcome::InsufficientStock { available } => StockCellTemplate {
            flower_id,
            available,
            value: available,
            show_error: true,
            added: 0,
        },
        AddOutcome::Ignored => {
            let flower = state
                .catalog()
                .get_one(flower_id)
                .await
                .ok_or_else(|| AppError::NotFound(format!("flower {flower_id}")))?;
            let in_cart = store.number_of(flower_id).await;
            StockCellTemplate {
                flower_id,
                available: flower.quantity.saturating_sub(in_cart),
                value: 0,
                show_error: false,
                added: 0,
            }
        }
    };

    Ok((AppendHeaders([("HX-Trigger", "cart-updated")]), cell).into_response())
}

/// Check out: validate the submitted cart, then clear it and release every
/// reservation.
#[instrument(skip(state, session, form))]
pub async fn checkout(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    let submitted = CartState::decode_form_value(&form.cart)?;

    let store = cart_store(&state, session).await?;
    tracing::info!(lines = submitted.len(), "checkout received");

    store.reset().await?;
    Ok(Redirect::to("/cart").into_response())
}
