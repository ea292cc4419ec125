//! Configuration Tests
//!
//! Stores built from TOML configs behave like builder-configured ones.

use crate::*;
use serialstore::{ConfigError, StoreConfig};
use std::io::Write;
use std::sync::Arc;

#[tokio::test]
async fn test_store_from_toml_config() {
    let config = StoreConfig::from_toml_str(
        r#"
        name = "settings-db"
        version = 3
        store_name = "prefs"
        probe_before_reuse = false
        "#,
    )
    .unwrap();

    let engine = MemoryEngine::new();
    let store = Store::with_config(Arc::new(engine.clone()), config.clone()).unwrap();
    store.set("theme", "dark").await.unwrap();

    assert_eq!(store.config(), &config);
    assert_eq!(engine.database_version("settings-db"), Some(3));
    assert_eq!(store.get("theme").await.unwrap(), Some(Value::from("dark")));
}

#[test]
fn test_config_from_file() {
    let path = std::env::temp_dir().join(format!("serialstore-{}.toml", std::process::id()));
    {
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "name = \"from-file\"").unwrap();
        writeln!(file, "settle_delay_ms = 3").unwrap();
    }

    let config = StoreConfig::from_path(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(config.name, "from-file");
    assert_eq!(config.settle_delay_ms, 3);
    assert_eq!(config.version, 1);
}

#[test]
fn test_empty_store_name_is_rejected() {
    let err = StoreConfig::from_toml_str("store_name = \"\"").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[tokio::test]
async fn test_builder_overrides_loaded_config() {
    let config = StoreConfig::from_toml_str("name = \"base\"").unwrap();
    let engine = MemoryEngine::new();
    let store = builder(&engine).config(config).version(2).open().unwrap();

    assert_eq!(store.config().name, "base");
    assert_eq!(store.config().version, 2);
    store.ready().await.unwrap();
    assert_eq!(engine.database_version("base"), Some(2));
}
