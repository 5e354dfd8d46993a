//! API route definitions

mod health;
mod news;

use axum::Router;

use crate::AppState;

/// Create all API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(news::routes())
        .merge(health::routes())
}
