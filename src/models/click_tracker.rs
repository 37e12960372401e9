//! Click-tracker models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A tracked redirect link and its click counter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ClickTracker {
    pub id: String,
    pub organization_id: String,
    pub category_id: Option<String>,
    pub name: String,
    pub target_url: String,
    pub clicks: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewClickTracker {
    pub organization_id: String,
    #[serde(default)]
    pub category_id: Option<String>,
    pub name: String,
    pub target_url: String,
}

impl NewClickTracker {
    pub fn validate(&self) -> Result<(), String> {
        super::require_id("organization_id", &self.organization_id)?;
        super::require_name(&self.name)?;
        super::require_url(&self.target_url)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClickTrackerUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub target_url: Option<String>,
}

impl ClickTrackerUpdate {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(name) = &self.name {
            super::require_name(name)?;
        }
        if let Some(url) = &self.target_url {
            super::require_url(url)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClickTrackerFilter {
    #[serde(default)]
    pub organization_id: Option<String>,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}
