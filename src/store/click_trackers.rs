//! Click-tracker repository.

use super::{
    SqlBuilder, delete_by_id, get_by_id, new_id, now, require_category_in, require_exists,
    update_columns, validated,
};
use crate::db::{Executor, QueryParam, extract_runnable};
use crate::error::{DbError, DbResult};
use crate::models::{ClickTracker, ClickTrackerFilter, ClickTrackerUpdate, NewClickTracker};
use crate::pagination::{Page, PaginationRequest, Paginator};
use tracing::{debug, info};

const SELECT: &str = "SELECT id, organization_id, category_id, name, target_url, clicks, created_at FROM click_trackers";
const ENTITY: &str = "click tracker";

pub async fn list<E: Executor>(
    executor: &mut E,
    paginator: &Paginator,
    filter: &ClickTrackerFilter,
    request: PaginationRequest,
) -> DbResult<Page<ClickTracker>> {
    let mut runnable = extract_runnable(executor)?;
    let mut sql = SqlBuilder::new(runnable.db_type(), SELECT);
    if let Some(org) = filter.organization_id.as_deref() {
        sql.and_where("organization_id = ", org);
    }
    if let Some(category) = filter.category_id.as_deref() {
        sql.and_where("category_id = ", category);
    }
    if let Some(name) = filter.name.as_deref().filter(|n| !n.trim().is_empty()) {
        sql.and_contains("name", name);
    }
    sql.push(" ORDER BY created_at DESC, id");
    let (sql, args) = sql.finish();
    paginator
        .fetch_page(&mut runnable, &sql, &args, request)
        .await
}

pub async fn get<E: Executor>(
    executor: &mut E,
    paginator: &Paginator,
    id: &str,
) -> DbResult<ClickTracker> {
    let mut runnable = extract_runnable(executor)?;
    get_by_id(&mut runnable, SELECT, ENTITY, id, paginator.query_timeout()).await
}

/// Create a tracker after checking its organization and, when given, that the
/// category belongs to that organization.
pub async fn create<E: Executor>(
    executor: &mut E,
    paginator: &Paginator,
    input: NewClickTracker,
) -> DbResult<ClickTracker> {
    validated(input.validate())?;
    let mut runnable = extract_runnable(executor)?;
    let query_timeout = paginator.query_timeout();
    require_exists(
        &mut runnable,
        "organizations",
        "organization",
        &input.organization_id,
        query_timeout,
    )
    .await?;
    if let Some(category_id) = input.category_id.as_deref() {
        require_category_in(
            &mut runnable,
            &input.organization_id,
            category_id,
            query_timeout,
        )
        .await?;
    }

    let tracker = ClickTracker {
        id: new_id(),
        organization_id: input.organization_id,
        category_id: input.category_id,
        name: input.name.trim().to_string(),
        target_url: input.target_url,
        clicks: 0,
        created_at: now(),
    };

    let mut sql = SqlBuilder::new(
        runnable.db_type(),
        "INSERT INTO click_trackers (id, organization_id, category_id, name, target_url, clicks, created_at) VALUES (",
    );
    sql.bind(tracker.id.as_str())
        .push(", ")
        .bind(tracker.organization_id.as_str())
        .push(", ")
        .bind(tracker.category_id.as_deref())
        .push(", ")
        .bind(tracker.name.as_str())
        .push(", ")
        .bind(tracker.target_url.as_str())
        .push(", ")
        .bind(tracker.clicks)
        .push(", ")
        .bind(tracker.created_at)
        .push(")");
    let (sql, args) = sql.finish();
    runnable.execute(&sql, &args, query_timeout).await?;

    info!(click_tracker_id = %tracker.id, "Click tracker created");
    Ok(tracker)
}

pub async fn update<E: Executor>(
    executor: &mut E,
    paginator: &Paginator,
    id: &str,
    input: ClickTrackerUpdate,
) -> DbResult<ClickTracker> {
    validated(input.validate())?;
    let mut runnable = extract_runnable(executor)?;
    let mut sets: Vec<(&str, QueryParam)> = Vec::new();
    if let Some(name) = input.name {
        sets.push(("name", name.trim().into()));
    }
    if let Some(target_url) = input.target_url {
        sets.push(("target_url", target_url.into()));
    }
    update_columns(
        &mut runnable,
        "click_trackers",
        ENTITY,
        id,
        sets,
        paginator.query_timeout(),
    )
    .await?;
    get_by_id(&mut runnable, SELECT, ENTITY, id, paginator.query_timeout()).await
}

/// Count one click and return the tracker with its new total.
///
/// The increment is a single atomic statement, so this is safe on an
/// auto-commit connection under concurrent clicks.
pub async fn record_click<E: Executor>(
    executor: &mut E,
    paginator: &Paginator,
    id: &str,
) -> DbResult<ClickTracker> {
    let mut runnable = extract_runnable(executor)?;
    let mut sql = SqlBuilder::new(
        runnable.db_type(),
        "UPDATE click_trackers SET clicks = clicks + 1",
    );
    sql.and_where("id = ", id);
    let (sql, args) = sql.finish();
    if runnable
        .execute(&sql, &args, paginator.query_timeout())
        .await?
        == 0
    {
        return Err(DbError::not_found(ENTITY, id));
    }
    debug!(click_tracker_id = %id, "Click recorded");
    get_by_id(&mut runnable, SELECT, ENTITY, id, paginator.query_timeout()).await
}

pub async fn delete<E: Executor>(executor: &mut E, paginator: &Paginator, id: &str) -> DbResult<()> {
    let mut runnable = extract_runnable(executor)?;
    delete_by_id(
        &mut runnable,
        "click_trackers",
        ENTITY,
        id,
        paginator.query_timeout(),
    )
    .await?;
    info!(click_tracker_id = %id, "Click tracker deleted");
    Ok(())
}
