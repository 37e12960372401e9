//! Capture page models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A lead-capture landing page addressed by its slug.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CapturePage {
    pub id: String,
    pub organization_id: String,
    pub category_id: Option<String>,
    pub name: String,
    pub slug: String,
    pub headline: Option<String>,
    pub published: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCapturePage {
    pub organization_id: String,
    #[serde(default)]
    pub category_id: Option<String>,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub published: bool,
}

impl NewCapturePage {
    pub fn validate(&self) -> Result<(), String> {
        super::require_id("organization_id", &self.organization_id)?;
        super::require_name(&self.name)?;
        super::require_slug(&self.slug)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CapturePageUpdate {
    #[serde(default)]
    pub name: Option<String>,
    /// `null` clears the stored value; leaving the field out keeps it.
    #[serde(default, deserialize_with = "super::nullable")]
    pub headline: Option<Option<String>>,
    #[serde(default)]
    pub published: Option<bool>,
}

impl CapturePageUpdate {
    pub fn validate(&self) -> Result<(), String> {
        match &self.name {
            Some(name) => super::require_name(name),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CapturePageFilter {
    #[serde(default)]
    pub organization_id: Option<String>,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub published: Option<bool>,
}
