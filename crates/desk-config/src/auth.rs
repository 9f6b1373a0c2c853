//! Token signing configuration.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Default token lifetime: one day.
const fn default_token_ttl_secs() -> u64 {
    86_400
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// HS256 signing secret. Written by `desk init`.
    #[serde(default)]
    pub jwt_secret: String,

    /// Lifetime of issued tokens, in seconds.
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_ttl_secs: default_token_ttl_secs(),
        }
    }
}

impl AuthConfig {
    pub const fn is_configured(&self) -> bool {
        !self.jwt_secret.is_empty()
    }

    /// The signing secret, or an error when none is configured.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotConfigured` for an empty secret and
    /// `ConfigError::InvalidValue` for a zero token lifetime.
    pub fn require_jwt_secret(&self) -> Result<&str, ConfigError> {
        if !self.is_configured() {
            return Err(ConfigError::NotConfigured {
                section: "auth".into(),
            });
        }
        if self.token_ttl_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "auth.token_ttl_secs".into(),
                reason: "must be greater than zero".into(),
            });
        }
        Ok(&self.jwt_secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_not_configured() {
        let config = AuthConfig::default();
        assert!(!config.is_configured());
        assert_eq!(config.token_ttl_secs, 86_400);
        assert!(matches!(
            config.require_jwt_secret(),
            Err(ConfigError::NotConfigured { .. })
        ));
    }

    #[test]
    fn zero_ttl_rejected() {
        let config = AuthConfig {
            jwt_secret: "s3cret".into(),
            token_ttl_secs: 0,
        };
        assert!(matches!(
            config.require_jwt_secret(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
