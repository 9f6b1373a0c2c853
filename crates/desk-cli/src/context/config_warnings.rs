use desk_config::DeskConfig;

/// Emit warnings for a missing signing secret and for env keys that look
/// mistyped and silently fell back to defaults.
pub fn warn_unconfigured(config: &DeskConfig) {
    for warning in collect_unconfigured_warnings(config, std::env::vars()) {
        tracing::warn!("{warning}");
    }
}

fn collect_unconfigured_warnings<I>(config: &DeskConfig, env: I) -> Vec<String>
where
    I: IntoIterator<Item = (String, String)>,
{
    let env_keys = env.into_iter().map(|(key, _)| key).collect::<Vec<_>>();
    let mut warnings = Vec::new();

    if !config.auth.is_configured() {
        if has_single_underscore_key(&env_keys, "SHOPDESK_AUTH") {
            warnings.push(
                "auth config appears default while SHOPDESK_AUTH* env vars exist. Use double underscores (example: SHOPDESK_AUTH__JWT_SECRET)."
                    .to_string(),
            );
        } else {
            warnings.push(
                "no signing secret configured; run `desk init` or set SHOPDESK_AUTH__JWT_SECRET"
                    .to_string(),
            );
        }
    }

    for section in ["SHOPDESK_SERVER", "SHOPDESK_DATABASE", "SHOPDESK_BUSINESS"] {
        if has_single_underscore_key(&env_keys, section) {
            warnings.push(format!(
                "{section}_* env vars are ignored; nested keys need a double underscore ({section}__...)"
            ));
        }
    }

    warnings
}

fn has_single_underscore_key(keys: &[String], section: &str) -> bool {
    let nested = format!("{section}__");
    keys.iter()
        .any(|key| key.starts_with(section) && !key.starts_with(&nested) && key != section)
}

#[cfg(test)]
mod tests {
    use desk_config::DeskConfig;

    use super::collect_unconfigured_warnings;

    fn env(keys: &[&str]) -> Vec<(String, String)> {
        keys.iter()
            .map(|key| ((*key).to_string(), "x".to_string()))
            .collect()
    }

    #[test]
    fn missing_secret_suggests_init() {
        let warnings = collect_unconfigured_warnings(&DeskConfig::default(), env(&[]));
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("desk init"));
    }

    #[test]
    fn single_underscore_auth_key_is_flagged() {
        let warnings =
            collect_unconfigured_warnings(&DeskConfig::default(), env(&["SHOPDESK_AUTH_JWT_SECRET"]));
        assert!(warnings[0].contains("double underscores"));
    }

    #[test]
    fn configured_project_is_quiet() {
        let mut config = DeskConfig::default();
        config.auth.jwt_secret = "s3cret".into();
        let warnings =
            collect_unconfigured_warnings(&config, env(&["SHOPDESK_SERVER__LISTEN", "PATH"]));
        assert!(warnings.is_empty());
    }

    #[test]
    fn mistyped_section_key_is_flagged() {
        let mut config = DeskConfig::default();
        config.auth.jwt_secret = "s3cret".into();
        let warnings =
            collect_unconfigured_warnings(&config, env(&["SHOPDESK_BUSINESS_NAME"]));
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("SHOPDESK_BUSINESS__"));
    }
}
