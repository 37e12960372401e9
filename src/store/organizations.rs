//! Organization repository.

use super::{SqlBuilder, delete_by_id, get_by_id, new_id, now, update_columns, validated};
use crate::db::{Executor, QueryParam, extract_runnable};
use crate::error::DbResult;
use crate::models::{NewOrganization, Organization, OrganizationFilter, OrganizationUpdate};
use crate::pagination::{Page, PaginationRequest, Paginator};
use tracing::info;

const SELECT: &str = "SELECT id, name, created_at FROM organizations";
const ENTITY: &str = "organization";

pub async fn list<E: Executor>(
    executor: &mut E,
    paginator: &Paginator,
    filter: &OrganizationFilter,
    request: PaginationRequest,
) -> DbResult<Page<Organization>> {
    let mut runnable = extract_runnable(executor)?;
    let mut sql = SqlBuilder::new(runnable.db_type(), SELECT);
    if let Some(name) = filter.name.as_deref().filter(|n| !n.trim().is_empty()) {
        sql.and_contains("name", name);
    }
    sql.push(" ORDER BY name, id");
    let (sql, args) = sql.finish();
    paginator
        .fetch_page(&mut runnable, &sql, &args, request)
        .await
}

pub async fn get<E: Executor>(
    executor: &mut E,
    paginator: &Paginator,
    id: &str,
) -> DbResult<Organization> {
    let mut runnable = extract_runnable(executor)?;
    get_by_id(&mut runnable, SELECT, ENTITY, id, paginator.query_timeout()).await
}

pub async fn create<E: Executor>(
    executor: &mut E,
    paginator: &Paginator,
    input: NewOrganization,
) -> DbResult<Organization> {
    validated(input.validate())?;
    let mut runnable = extract_runnable(executor)?;
    let organization = Organization {
        id: new_id(),
        name: input.name.trim().to_string(),
        created_at: now(),
    };

    let mut sql = SqlBuilder::new(
        runnable.db_type(),
        "INSERT INTO organizations (id, name, created_at) VALUES (",
    );
    sql.bind(organization.id.as_str())
        .push(", ")
        .bind(organization.name.as_str())
        .push(", ")
        .bind(organization.created_at)
        .push(")");
    let (sql, args) = sql.finish();
    runnable
        .execute(&sql, &args, paginator.query_timeout())
        .await?;

    info!(organization_id = %organization.id, "Organization created");
    Ok(organization)
}

pub async fn update<E: Executor>(
    executor: &mut E,
    paginator: &Paginator,
    id: &str,
    input: OrganizationUpdate,
) -> DbResult<Organization> {
    validated(input.validate())?;
    let mut runnable = extract_runnable(executor)?;
    let mut sets: Vec<(&str, QueryParam)> = Vec::new();
    if let Some(name) = input.name {
        sets.push(("name", name.trim().into()));
    }
    update_columns(
        &mut runnable,
        "organizations",
        ENTITY,
        id,
        sets,
        paginator.query_timeout(),
    )
    .await?;
    get_by_id(&mut runnable, SELECT, ENTITY, id, paginator.query_timeout()).await
}

/// Delete an organization together with everything it owns.
///
/// Issues several statements; run it on a transaction so a failure part way
/// leaves nothing half-deleted.
pub async fn delete<E: Executor>(executor: &mut E, paginator: &Paginator, id: &str) -> DbResult<()> {
    let mut runnable = extract_runnable(executor)?;
    let query_timeout = paginator.query_timeout();
    for table in ["capture_pages", "click_trackers", "categories"] {
        let mut sql = SqlBuilder::new(runnable.db_type(), &format!("DELETE FROM {}", table));
        sql.and_where("organization_id = ", id);
        let (sql, args) = sql.finish();
        runnable.execute(&sql, &args, query_timeout).await?;
    }
    delete_by_id(&mut runnable, "organizations", ENTITY, id, query_timeout).await?;
    info!(organization_id = %id, "Organization deleted");
    Ok(())
}
