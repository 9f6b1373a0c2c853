//! Role update builder.

use desk_core::errors::CoreError;
use desk_core::inputs::{require, validate_permissions};
use serde::{Deserialize, Serialize};

use super::double_option;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoleUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,
}

impl RoleUpdate {
    /// # Errors
    ///
    /// Returns `CoreError::Validation` for a blank name or unknown permission.
    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(name) = &self.name {
            require("name", name)?;
        }
        if let Some(permissions) = &self.permissions {
            validate_permissions(permissions)?;
        }
        Ok(())
    }
}

pub struct RoleUpdateBuilder(RoleUpdate);

impl RoleUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(RoleUpdate::default())
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.0.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: Option<String>) -> Self {
        self.0.description = Some(description);
        self
    }

    #[must_use]
    pub fn permissions(mut self, permissions: Vec<String>) -> Self {
        self.0.permissions = Some(permissions);
        self
    }

    #[must_use]
    pub fn build(self) -> RoleUpdate {
        self.0
    }
}

impl Default for RoleUpdateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
