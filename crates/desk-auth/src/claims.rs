use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// JWT payload issued at login.
///
/// `role` is a snapshot taken at issue time. Servers resolve the role's
/// current permissions on every request, so editing a role takes effect
/// without re-login.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub email: String,
    pub name: String,
    pub role: String,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

impl Claims {
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Check if the token is expired or expires within `buffer_secs`.
    #[must_use]
    pub fn is_near_expiry(&self, buffer_secs: i64) -> bool {
        self.exp <= Utc::now().timestamp() + buffer_secs
    }
}
