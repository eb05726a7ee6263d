//! Landing page.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use axum::response::IntoResponse;
use tracing::instrument;

use crate::catalog::{Category, Flower};
use crate::state::AppState;

/// Home page template, flowers grouped by category.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub categories: Vec<(Category, Vec<Flower>)>,
}

/// Display the landing page.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> impl IntoResponse {
    HomeTemplate {
        categories: state.catalog().get_by_categories().await,
    }
}
