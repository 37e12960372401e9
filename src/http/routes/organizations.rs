use crate::error::DbResult;
use crate::http::{AppState, PageQuery};
use crate::models::{NewOrganization, Organization, OrganizationFilter, OrganizationUpdate};
use crate::pagination::Page;
use crate::store::{self, organizations};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_organizations).post(create_organization))
        .route(
            "/{id}",
            get(get_organization)
                .put(update_organization)
                .delete(delete_organization),
        )
}

pub async fn list_organizations(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
    Query(filter): Query<OrganizationFilter>,
) -> DbResult<Json<Page<Organization>>> {
    let mut conn = state.controller.as_connection();
    let page = organizations::list(
        &mut conn,
        &state.paginator,
        &filter,
        state.defaults.request(page),
    )
    .await?;
    Ok(Json(page))
}

pub async fn get_organization(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> DbResult<Json<Organization>> {
    let mut conn = state.controller.as_connection();
    Ok(Json(organizations::get(&mut conn, &state.paginator, &id).await?))
}

pub async fn create_organization(
    State(state): State<AppState>,
    Json(body): Json<NewOrganization>,
) -> DbResult<(StatusCode, Json<Organization>)> {
    let mut conn = state.controller.as_connection();
    let organization = organizations::create(&mut conn, &state.paginator, body).await?;
    Ok((StatusCode::CREATED, Json(organization)))
}

pub async fn update_organization(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<OrganizationUpdate>,
) -> DbResult<Json<Organization>> {
    let mut conn = state.controller.as_connection();
    Ok(Json(
        organizations::update(&mut conn, &state.paginator, &id, body).await?,
    ))
}

/// Removes the organization and everything under it in one transaction.
pub async fn delete_organization(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> DbResult<StatusCode> {
    let mut tx = state.controller.as_transaction().await?;
    let result = organizations::delete(&mut tx, &state.paginator, &id).await;
    store::finish(tx, result).await?;
    Ok(StatusCode::NO_CONTENT)
}
