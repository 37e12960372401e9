use crate::error::DbResult;
use crate::http::{AppState, PageQuery};
use crate::models::{Category, CategoryFilter, CategoryUpdate, NewCategory};
use crate::pagination::Page;
use crate::store::{self, categories};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route(
            "/{id}",
            get(get_category).put(update_category).delete(delete_category),
        )
}

pub async fn list_categories(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
    Query(filter): Query<CategoryFilter>,
) -> DbResult<Json<Page<Category>>> {
    let mut conn = state.controller.as_connection();
    let page = categories::list(
        &mut conn,
        &state.paginator,
        &filter,
        state.defaults.request(page),
    )
    .await?;
    Ok(Json(page))
}

pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> DbResult<Json<Category>> {
    let mut conn = state.controller.as_connection();
    Ok(Json(categories::get(&mut conn, &state.paginator, &id).await?))
}

/// The organization check and the insert share one transaction.
pub async fn create_category(
    State(state): State<AppState>,
    Json(body): Json<NewCategory>,
) -> DbResult<(StatusCode, Json<Category>)> {
    let mut tx = state.controller.as_transaction().await?;
    let result = categories::create(&mut tx, &state.paginator, body).await;
    let category = store::finish(tx, result).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<CategoryUpdate>,
) -> DbResult<Json<Category>> {
    let mut conn = state.controller.as_connection();
    Ok(Json(
        categories::update(&mut conn, &state.paginator, &id, body).await?,
    ))
}

pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> DbResult<StatusCode> {
    let mut tx = state.controller.as_transaction().await?;
    let result = categories::delete(&mut tx, &state.paginator, &id).await;
    store::finish(tx, result).await?;
    Ok(StatusCode::NO_CONTENT)
}
