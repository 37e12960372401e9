use crate::error::DbResult;
use crate::http::{AppState, PageQuery};
use crate::models::{ClickTracker, ClickTrackerFilter, ClickTrackerUpdate, NewClickTracker};
use crate::pagination::Page;
use crate::store::{self, click_trackers};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_click_trackers).post(create_click_tracker))
        .route(
            "/{id}",
            get(get_click_tracker)
                .put(update_click_tracker)
                .delete(delete_click_tracker),
        )
        .route("/{id}/clicks", post(record_click))
}

pub async fn list_click_trackers(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
    Query(filter): Query<ClickTrackerFilter>,
) -> DbResult<Json<Page<ClickTracker>>> {
    let mut conn = state.controller.as_connection();
    let page = click_trackers::list(
        &mut conn,
        &state.paginator,
        &filter,
        state.defaults.request(page),
    )
    .await?;
    Ok(Json(page))
}

pub async fn get_click_tracker(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> DbResult<Json<ClickTracker>> {
    let mut conn = state.controller.as_connection();
    Ok(Json(
        click_trackers::get(&mut conn, &state.paginator, &id).await?,
    ))
}

pub async fn create_click_tracker(
    State(state): State<AppState>,
    Json(body): Json<NewClickTracker>,
) -> DbResult<(StatusCode, Json<ClickTracker>)> {
    let mut tx = state.controller.as_transaction().await?;
    let result = click_trackers::create(&mut tx, &state.paginator, body).await;
    let tracker = store::finish(tx, result).await?;
    Ok((StatusCode::CREATED, Json(tracker)))
}

pub async fn update_click_tracker(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<ClickTrackerUpdate>,
) -> DbResult<Json<ClickTracker>> {
    let mut conn = state.controller.as_connection();
    Ok(Json(
        click_trackers::update(&mut conn, &state.paginator, &id, body).await?,
    ))
}

pub async fn record_click(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> DbResult<Json<ClickTracker>> {
    let mut conn = state.controller.as_connection();
    Ok(Json(
        click_trackers::record_click(&mut conn, &state.paginator, &id).await?,
    ))
}

pub async fn delete_click_tracker(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> DbResult<StatusCode> {
    let mut conn = state.controller.as_connection();
    click_trackers::delete(&mut conn, &state.paginator, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
