//! Data models for the capture service.
//!
//! Each entity has a row type (decoded straight from the store), a `New*`
//! payload for creation, an `*Update` payload for partial updates and a
//! `*Filter` accepted as list query parameters.

pub mod capture_page;
pub mod category;
pub mod click_tracker;
pub mod organization;

pub use capture_page::{CapturePage, CapturePageFilter, CapturePageUpdate, NewCapturePage};
pub use category::{Category, CategoryFilter, CategoryUpdate, NewCategory};
pub use click_tracker::{ClickTracker, ClickTrackerFilter, ClickTrackerUpdate, NewClickTracker};
pub use organization::{NewOrganization, Organization, OrganizationFilter, OrganizationUpdate};

/// Deserialize a field that may be absent, `null` or a value.
///
/// Paired with `#[serde(default)]`: absent stays `None`, `null` becomes
/// `Some(None)` (clear the column) and a value becomes `Some(Some(v))`.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::Deserialize<'de>,
{
    <Option<T> as serde::Deserialize>::deserialize(deserializer).map(Some)
}

/// Longest accepted display name.
pub const MAX_NAME_LEN: usize = 200;

/// Longest accepted slug.
pub const MAX_SLUG_LEN: usize = 100;

fn require_name(name: &str) -> Result<(), String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("name must not be empty".to_string());
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(format!("name must be at most {} characters", MAX_NAME_LEN));
    }
    Ok(())
}

fn require_id(field: &str, id: &str) -> Result<(), String> {
    if id.trim().is_empty() {
        return Err(format!("{} must not be empty", field));
    }
    Ok(())
}

fn require_url(value: &str) -> Result<(), String> {
    match url::Url::parse(value) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Ok(()),
        Ok(url) => Err(format!("target_url scheme '{}' is not http(s)", url.scheme())),
        Err(e) => Err(format!("target_url is not a valid URL: {}", e)),
    }
}

fn require_slug(slug: &str) -> Result<(), String> {
    if slug.is_empty() || slug.len() > MAX_SLUG_LEN {
        return Err(format!(
            "slug must be between 1 and {} characters",
            MAX_SLUG_LEN
        ));
    }
    if !slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err("slug may only contain lowercase letters, digits and '-'".to_string());
    }
    if slug.starts_with('-') || slug.ends_with('-') {
        return Err("slug must not start or end with '-'".to_string());
    }
    Ok(())
}
