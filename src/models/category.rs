//! Category models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Grouping for click-trackers and capture pages within one organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: String,
    pub organization_id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCategory {
    pub organization_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewCategory {
    pub fn validate(&self) -> Result<(), String> {
        super::require_id("organization_id", &self.organization_id)?;
        super::require_name(&self.name)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryUpdate {
    #[serde(default)]
    pub name: Option<String>,
    /// `null` clears the stored value; leaving the field out keeps it.
    #[serde(default, deserialize_with = "super::nullable")]
    pub description: Option<Option<String>>,
}

impl CategoryUpdate {
    pub fn validate(&self) -> Result<(), String> {
        match &self.name {
            Some(name) => super::require_name(name),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryFilter {
    #[serde(default)]
    pub organization_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}
