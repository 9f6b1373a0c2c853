//! Integration tests for layered configuration loading.
//!
//! Uses figment::Jail for safe, sandboxed env var and file manipulation.

use desk_config::{ConfigError, DeskConfig};
use figment::{
    Figment, Jail,
    providers::{Format, Serialized, Toml},
};
use pretty_assertions::assert_eq;
use std::path::Path;

#[test]
fn loads_full_config_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[server]
listen = "127.0.0.1:9000"

[database]
path = "data/shop.db"

[auth]
jwt_secret = "toml-secret"
token_ttl_secs = 3600

[business]
name = "Frame House"
currency_symbol = "$"
default_min_stock = 3

[general]
default_limit = 50
"#,
        )?;

        let config: DeskConfig = Figment::from(Serialized::defaults(DeskConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.server.listen, "127.0.0.1:9000");
        assert_eq!(config.database.path, "data/shop.db");
        assert_eq!(config.auth.jwt_secret, "toml-secret");
        assert_eq!(config.auth.token_ttl_secs, 3600);
        assert_eq!(config.business.name, "Frame House");
        assert_eq!(config.business.currency_symbol, "$");
        assert_eq!(config.business.default_min_stock, 3);
        assert_eq!(config.general.default_limit, 50);
        Ok(())
    });
}

#[test]
fn partial_toml_keeps_defaults() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[business]
name = "Frame House"
"#,
        )?;

        let config: DeskConfig = Figment::from(Serialized::defaults(DeskConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.business.name, "Frame House");
        assert_eq!(config.business.currency_symbol, "₹");
        assert_eq!(config.auth.token_ttl_secs, 86_400);
        assert_eq!(config.general.default_limit, 20);
        Ok(())
    });
}

#[test]
fn project_config_file_is_picked_up() {
    Jail::expect_with(|jail| {
        jail.create_dir(".shopdesk")?;
        jail.create_file(
            ".shopdesk/config.toml",
            r#"
[auth]
jwt_secret = "from-project"
"#,
        )?;

        let config = DeskConfig::load().expect("config loads");
        assert_eq!(config.auth.jwt_secret, "from-project");
        Ok(())
    });
}

#[test]
fn load_from_uses_given_project_dir() {
    Jail::expect_with(|jail| {
        jail.create_dir("shop/.shopdesk")?;
        jail.create_file(
            "shop/.shopdesk/config.toml",
            r#"
[server]
listen = "127.0.0.1:7070"
"#,
        )?;

        let config = DeskConfig::load_from(Path::new("shop")).expect("config loads");
        assert_eq!(config.server.listen, "127.0.0.1:7070");
        Ok(())
    });
}

#[test]
fn env_beats_project_file() {
    Jail::expect_with(|jail| {
        jail.create_dir(".shopdesk")?;
        jail.create_file(
            ".shopdesk/config.toml",
            r#"
[auth]
jwt_secret = "from-project"
"#,
        )?;
        jail.set_env("SHOPDESK_AUTH__JWT_SECRET", "from-env");
        jail.set_env("SHOPDESK_GENERAL__DEFAULT_LIMIT", "7");

        let config = DeskConfig::load().expect("config loads");
        assert_eq!(config.auth.jwt_secret, "from-env");
        assert_eq!(config.general.default_limit, 7);
        Ok(())
    });
}

#[test]
fn wrong_type_is_figment_error() {
    Jail::expect_with(|jail| {
        jail.set_env("SHOPDESK_GENERAL__DEFAULT_LIMIT", "lots");

        let result = DeskConfig::load();
        assert!(matches!(result, Err(ConfigError::Figment(_))));
        Ok(())
    });
}

#[test]
fn missing_secret_blocks_serving() {
    Jail::expect_with(|_jail| {
        let config = DeskConfig::load().expect("config loads");
        assert!(matches!(
            config.auth.require_jwt_secret(),
            Err(ConfigError::NotConfigured { section }) if section == "auth"
        ));
        Ok(())
    });
}
