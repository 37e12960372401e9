//! Route table.

use super::AppState;
use axum::{Router, routing::get};

pub mod capture_pages;
pub mod categories;
pub mod click_trackers;
pub mod organizations;
pub mod system;

/// Every route, still waiting for its [`AppState`].
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(system::health))
        .nest("/organizations", organizations::router())
        .nest("/categories", categories::router())
        .nest("/click-trackers", click_trackers::router())
        .nest("/capture-pages", capture_pages::router())
}
