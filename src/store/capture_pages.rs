//! Capture page repository.

use super::{
    SqlBuilder, delete_by_id, get_by_id, new_id, now, require_category_in, require_exists,
    update_columns, validated,
};
use crate::db::{Executor, QueryParam, Runnable, extract_runnable};
use crate::error::{DbError, DbResult};
use crate::models::{CapturePage, CapturePageFilter, CapturePageUpdate, NewCapturePage};
use crate::pagination::{Page, PaginationRequest, Paginator};
use std::time::Duration;
use tracing::info;

const SELECT: &str = "SELECT id, organization_id, category_id, name, slug, headline, published, created_at FROM capture_pages";
const ENTITY: &str = "capture page";

pub async fn list<E: Executor>(
    executor: &mut E,
    paginator: &Paginator,
    filter: &CapturePageFilter,
    request: PaginationRequest,
) -> DbResult<Page<CapturePage>> {
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
    if let Some(published) = filter.published {
        sql.and_where("published = ", published);
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
) -> DbResult<CapturePage> {
    let mut runnable = extract_runnable(executor)?;
    get_by_id(&mut runnable, SELECT, ENTITY, id, paginator.query_timeout()).await
}

/// Look up a page by its slug.
pub async fn get_by_slug<E: Executor>(
    executor: &mut E,
    paginator: &Paginator,
    slug: &str,
) -> DbResult<CapturePage> {
    let mut runnable = extract_runnable(executor)?;
    let mut sql = SqlBuilder::new(runnable.db_type(), SELECT);
    sql.and_where("slug = ", slug);
    let (sql, args) = sql.finish();
    runnable
        .fetch_optional(&sql, &args, paginator.query_timeout())
        .await?
        .ok_or_else(|| DbError::not_found(ENTITY, slug))
}

async fn require_free_slug(
    runnable: &mut Runnable<'_>,
    slug: &str,
    query_timeout: Duration,
) -> DbResult<()> {
    let mut sql = SqlBuilder::new(runnable.db_type(), "SELECT COUNT(*) FROM capture_pages");
    sql.and_where("slug = ", slug);
    let (sql, args) = sql.finish();
    if runnable.fetch_count(&sql, &args, query_timeout).await? > 0 {
        return Err(DbError::invalid_input(format!(
            "slug '{}' is already taken",
            slug
        )));
    }
    Ok(())
}

/// Create a page after checking its organization, its category when given,
/// and that the slug is unused.
pub async fn create<E: Executor>(
    executor: &mut E,
    paginator: &Paginator,
    input: NewCapturePage,
) -> DbResult<CapturePage> {
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
    require_free_slug(&mut runnable, &input.slug, query_timeout).await?;

    let page = CapturePage {
        id: new_id(),
        organization_id: input.organization_id,
        category_id: input.category_id,
        name: input.name.trim().to_string(),
        slug: input.slug,
        headline: input.headline,
        published: input.published,
        created_at: now(),
    };

    let mut sql = SqlBuilder::new(
        runnable.db_type(),
        "INSERT INTO capture_pages (id, organization_id, category_id, name, slug, headline, published, created_at) VALUES (",
    );
    sql.bind(page.id.as_str())
        .push(", ")
        .bind(page.organization_id.as_str())
        .push(", ")
        .bind(page.category_id.as_deref())
        .push(", ")
        .bind(page.name.as_str())
        .push(", ")
        .bind(page.slug.as_str())
        .push(", ")
        .bind(page.headline.as_deref())
        .push(", ")
        .bind(page.published)
        .push(", ")
        .bind(page.created_at)
        .push(")");
    let (sql, args) = sql.finish();
    runnable.execute(&sql, &args, query_timeout).await?;

    info!(capture_page_id = %page.id, slug = %page.slug, "Capture page created");
    Ok(page)
}

pub async fn update<E: Executor>(
    executor: &mut E,
    paginator: &Paginator,
    id: &str,
    input: CapturePageUpdate,
) -> DbResult<CapturePage> {
    validated(input.validate())?;
    let mut runnable = extract_runnable(executor)?;
    let mut sets: Vec<(&str, QueryParam)> = Vec::new();
    if let Some(name) = input.name {
        sets.push(("name", name.trim().into()));
    }
    if let Some(headline) = input.headline {
        sets.push(("headline", headline.into()));
    }
    if let Some(published) = input.published {
        sets.push(("published", published.into()));
    }
    update_columns(
        &mut runnable,
        "capture_pages",
        ENTITY,
        id,
        sets,
        paginator.query_timeout(),
    )
    .await?;
    get_by_id(&mut runnable, SELECT, ENTITY, id, paginator.query_timeout()).await
}

pub async fn delete<E: Executor>(executor: &mut E, paginator: &Paginator, id: &str) -> DbResult<()> {
    let mut runnable = extract_runnable(executor)?;
    delete_by_id(
        &mut runnable,
        "capture_pages",
        ENTITY,
        id,
        paginator.query_timeout(),
    )
    .await?;
    info!(capture_page_id = %id, "Capture page deleted");
    Ok(())
}
