use crate::db::extract_runnable;
use crate::error::DbResult;
use crate::http::AppState;
use axum::{Json, extract::State};
use serde_json::{Value, json};

/// Liveness: one round trip through an auto-commit connection.
pub async fn health(State(state): State<AppState>) -> DbResult<Json<Value>> {
    let mut conn = state.controller.as_connection();
    extract_runnable(&mut conn)?
        .execute("SELECT 1", &[], state.paginator.query_timeout())
        .await?;
    Ok(Json(json!({
        "status": "ok",
        "database": state.controller.db_type().display_name(),
    })))
}
