use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A walk-in or website enquiry left for the shop to follow up.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Enquiry {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub message: String,
    /// Free-form topic, e.g. `"custom frame"`.
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
