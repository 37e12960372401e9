//! Category repository.

use super::{
    SqlBuilder, delete_by_id, get_by_id, new_id, now, require_exists, update_columns, validated,
};
use crate::db::{Executor, QueryParam, extract_runnable};
use crate::error::DbResult;
use crate::models::{Category, CategoryFilter, CategoryUpdate, NewCategory};
use crate::pagination::{Page, PaginationRequest, Paginator};
use tracing::info;

const SELECT: &str =
    "SELECT id, organization_id, name, description, created_at FROM categories";
const ENTITY: &str = "category";

pub async fn list<E: Executor>(
    executor: &mut E,
    paginator: &Paginator,
    filter: &CategoryFilter,
    request: PaginationRequest,
) -> DbResult<Page<Category>> {
    let mut runnable = extract_runnable(executor)?;
    let mut sql = SqlBuilder::new(runnable.db_type(), SELECT);
    if let Some(org) = filter.organization_id.as_deref() {
        sql.and_where("organization_id = ", org);
    }
    if let Some(name) = filter.name.as_deref().filter(|n| !n.trim().is_empty()) {
        sql.and_contains("name", name);
    }
    sql.push(" ORDER BY name, id");
    let (sql, args) = sql.finish();
    paginator
        .fetch_page(&mut runnable, &sql, &args, request)
        .await
}

pub async fn get<E: Executor>(executor: &mut E, paginator: &Paginator, id: &str) -> DbResult<Category> {
    let mut runnable = extract_runnable(executor)?;
    get_by_id(&mut runnable, SELECT, ENTITY, id, paginator.query_timeout()).await
}

/// Create a category after checking its organization exists.
pub async fn create<E: Executor>(
    executor: &mut E,
    paginator: &Paginator,
    input: NewCategory,
) -> DbResult<Category> {
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

    let category = Category {
        id: new_id(),
        organization_id: input.organization_id,
        name: input.name.trim().to_string(),
        description: input.description,
        created_at: now(),
    };

    let mut sql = SqlBuilder::new(
        runnable.db_type(),
        "INSERT INTO categories (id, organization_id, name, description, created_at) VALUES (",
    );
    sql.bind(category.id.as_str())
        .push(", ")
        .bind(category.organization_id.as_str())
        .push(", ")
        .bind(category.name.as_str())
        .push(", ")
        .bind(category.description.as_deref())
        .push(", ")
        .bind(category.created_at)
        .push(")");
    let (sql, args) = sql.finish();
    runnable.execute(&sql, &args, query_timeout).await?;

    info!(
        category_id = %category.id,
        organization_id = %category.organization_id,
        "Category created"
    );
    Ok(category)
}

pub async fn update<E: Executor>(
    executor: &mut E,
    paginator: &Paginator,
    id: &str,
    input: CategoryUpdate,
) -> DbResult<Category> {
    validated(input.validate())?;
    let mut runnable = extract_runnable(executor)?;
    let mut sets: Vec<(&str, QueryParam)> = Vec::new();
    if let Some(name) = input.name {
        sets.push(("name", name.trim().into()));
    }
    if let Some(description) = input.description {
        sets.push(("description", description.into()));
    }
    update_columns(
        &mut runnable,
        "categories",
        ENTITY,
        id,
        sets,
        paginator.query_timeout(),
    )
    .await?;
    get_by_id(&mut runnable, SELECT, ENTITY, id, paginator.query_timeout()).await
}

/// Delete a category, detaching the trackers and pages filed under it.
pub async fn delete<E: Executor>(executor: &mut E, paginator: &Paginator, id: &str) -> DbResult<()> {
    let mut runnable = extract_runnable(executor)?;
    let query_timeout = paginator.query_timeout();
    for table in ["click_trackers", "capture_pages"] {
        let mut sql = SqlBuilder::new(
            runnable.db_type(),
            &format!("UPDATE {} SET category_id = NULL", table),
        );
        sql.and_where("category_id = ", id);
        let (sql, args) = sql.finish();
        runnable.execute(&sql, &args, query_timeout).await?;
    }
    delete_by_id(&mut runnable, "categories", ENTITY, id, query_timeout).await?;
    info!(category_id = %id, "Category deleted");
    Ok(())
}
