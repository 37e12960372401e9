//! Organization models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Top-level owner of categories, click-trackers and capture pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Organization {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewOrganization {
    pub name: String,
}

impl NewOrganization {
    pub fn validate(&self) -> Result<(), String> {
        super::require_name(&self.name)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrganizationUpdate {
    #[serde(default)]
    pub name: Option<String>,
}

impl OrganizationUpdate {
    pub fn validate(&self) -> Result<(), String> {
        match &self.name {
            Some(name) => super::require_name(name),
            None => Ok(()),
        }
    }
}

/// List filters accepted on `GET /organizations`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrganizationFilter {
    /// Case-insensitive substring match on the name
    #[serde(default)]
    pub name: Option<String>,
}
