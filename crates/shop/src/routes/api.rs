//! JSON catalog API.
//!
//! Serves the same records the pages render, for remote cart embedders using
//! [`petal_market_cart::HttpCatalogClient`].

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use petal_market_core::FlowerId;

use crate::catalog::Flower;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// `GET /api/flowers` — the full catalog.
#[instrument(skip(state))]
pub async fn list_flowers(State(state): State<AppState>) -> Json<Vec<Flower>> {
    Json(state.catalog().get_all().await)
}

/// `GET /api/flower/{id}` — a single flower, 404 when unknown.
#[instrument(skip(state))]
pub async fn get_flower(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Flower>> {
    let id = FlowerId::new(id);
    state
        .catalog()
        .get_one(id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("flower {id}")))
}
