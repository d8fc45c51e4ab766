//! Integration tests for TOML and environment layering.
//!
//! Uses `figment::Jail` for sandboxed env var and working-directory manipulation.

use figment::{
    Figment, Jail,
    providers::{Format, Serialized, Toml},
};
use muster_config::{ConfigError, MusterConfig};
use std::path::PathBuf;

#[test]
fn loads_sections_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[general]
runtime_dir = "/var/lib/muster"
utc_offset = "-05:00"
environment = "production"

[notify]
default_timeout_secs = 4

[retention]
days = 7
"#,
        )?;

        let config: MusterConfig = Figment::from(Serialized::defaults(MusterConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.general.runtime_dir, PathBuf::from("/var/lib/muster"));
        assert_eq!(config.general.offset().unwrap().local_minus_utc(), -5 * 3600);
        assert!(config.general.is_production());
        assert_eq!(config.notify.default_timeout_secs, 4);
        assert_eq!(config.notify.user_agent, "muster/0.1");
        assert_eq!(config.retention.days, 7);
        Ok(())
    });
}

#[test]
fn project_config_is_picked_up() {
    Jail::expect_with(|jail| {
        jail.create_dir(".muster")?;
        jail.create_file(".muster/config.toml", "[retention]\ndays = 90\n")?;

        let config = MusterConfig::load().expect("config loads");
        assert_eq!(config.retention.days, 90);
        Ok(())
    });
}

#[test]
fn env_beats_toml() {
    Jail::expect_with(|jail| {
        jail.create_dir(".muster")?;
        jail.create_file(".muster/config.toml", "[general]\nutc_offset = \"+01:00\"\n")?;
        jail.set_env("MUSTER_GENERAL__UTC_OFFSET", "+02:00");
        jail.set_env("MUSTER_NOTIFY__DEFAULT_TIMEOUT_SECS", "3");

        let config = MusterConfig::load().expect("config loads");
        assert_eq!(config.general.offset().unwrap().local_minus_utc(), 2 * 3600);
        assert_eq!(config.notify.default_timeout_secs, 3);
        Ok(())
    });
}

#[test]
fn invalid_offset_fails_load() {
    Jail::expect_with(|jail| {
        jail.set_env("MUSTER_GENERAL__UTC_OFFSET", "America/Chicago");

        let err = MusterConfig::load().expect_err("offset should be rejected");
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        Ok(())
    });
}
