use crate::error::DbResult;
use crate::http::{AppState, PageQuery};
use crate::models::{CapturePage, CapturePageFilter, CapturePageUpdate, NewCapturePage};
use crate::pagination::Page;
use crate::store::{self, capture_pages};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_capture_pages).post(create_capture_page))
        .route(
            "/{id}",
            get(get_capture_page)
                .put(update_capture_page)
                .delete(delete_capture_page),
        )
        .route("/by-slug/{slug}", get(get_capture_page_by_slug))
}

pub async fn list_capture_pages(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
    Query(filter): Query<CapturePageFilter>,
) -> DbResult<Json<Page<CapturePage>>> {
    let mut conn = state.controller.as_connection();
    let page = capture_pages::list(
        &mut conn,
        &state.paginator,
        &filter,
        state.defaults.request(page),
    )
    .await?;
    Ok(Json(page))
}

pub async fn get_capture_page(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> DbResult<Json<CapturePage>> {
    let mut conn = state.controller.as_connection();
    Ok(Json(
        capture_pages::get(&mut conn, &state.paginator, &id).await?,
    ))
}

pub async fn get_capture_page_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> DbResult<Json<CapturePage>> {
    let mut conn = state.controller.as_connection();
    Ok(Json(
        capture_pages::get_by_slug(&mut conn, &state.paginator, &slug).await?,
    ))
}

/// Parent checks, the slug check and the insert share one transaction.
pub async fn create_capture_page(
    State(state): State<AppState>,
    Json(body): Json<NewCapturePage>,
) -> DbResult<(StatusCode, Json<CapturePage>)> {
    let mut tx = state.controller.as_transaction().await?;
    let result = capture_pages::create(&mut tx, &state.paginator, body).await;
    let page = store::finish(tx, result).await?;
    Ok((StatusCode::CREATED, Json(page)))
}

pub async fn update_capture_page(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<CapturePageUpdate>,
) -> DbResult<Json<CapturePage>> {
    let mut conn = state.controller.as_connection();
    Ok(Json(
        capture_pages::update(&mut conn, &state.paginator, &id, body).await?,
    ))
}

pub async fn delete_capture_page(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> DbResult<StatusCode> {
    let mut conn = state.controller.as_connection();
    capture_pages::delete(&mut conn, &state.paginator, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
