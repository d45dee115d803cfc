//! Integration tests for TOML configuration loading.
//!
//! Uses figment::Jail for safe, sandboxed env var and cwd manipulation.

use figment::{
    Figment, Jail,
    providers::{Format, Serialized, Toml},
};
use keel_config::{ConfigError, KeelConfig};

#[test]
fn loads_storage_config_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[storage]
dir = "docs/decisions"
journal_file = "journal.jsonl"
index_file = "cache.db"
"#,
        )?;

        let config: KeelConfig = Figment::from(Serialized::defaults(KeelConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.storage.dir, "docs/decisions");
        assert_eq!(config.storage.journal_file, "journal.jsonl");
        assert_eq!(config.storage.index_file, "cache.db");
        Ok(())
    });
}

#[test]
fn partial_toml_keeps_defaults() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r"
[general]
default_limit = 5
",
        )?;

        let config: KeelConfig = Figment::from(Serialized::defaults(KeelConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.general.default_limit, 5);
        assert!(config.general.identity_from_git);
        assert_eq!(config.storage.dir, ".keel");
        Ok(())
    });
}

#[test]
fn project_config_is_read_from_keel_dir() {
    Jail::expect_with(|jail| {
        std::fs::create_dir_all(jail.directory().join(".keel")).unwrap();
        jail.create_file(
            ".keel/config.toml",
            r"
[general]
identity_from_git = false
",
        )?;

        let config = KeelConfig::load(jail.directory()).expect("config loads");
        assert!(!config.general.identity_from_git);
        Ok(())
    });
}

#[test]
fn invalid_values_are_rejected_after_merge() {
    Jail::expect_with(|jail| {
        std::fs::create_dir_all(jail.directory().join(".keel")).unwrap();
        jail.create_file(
            ".keel/config.toml",
            r"
[general]
default_limit = 0
",
        )?;

        let err = KeelConfig::load(jail.directory()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        Ok(())
    });
}

#[test]
fn malformed_toml_is_a_figment_error() {
    Jail::expect_with(|jail| {
        std::fs::create_dir_all(jail.directory().join(".keel")).unwrap();
        jail.create_file(".keel/config.toml", "[general\ndefault_limit = ")?;

        let err = KeelConfig::load(jail.directory()).unwrap_err();
        assert!(matches!(err, ConfigError::Figment(_)));
        Ok(())
    });
}
