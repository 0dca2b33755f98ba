// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use map_reduce_core::config::Config;
use map_reduce_core::error::ConfigError;
use std::fs;

#[test]
fn test_default_config_is_valid() {
    let config = Config::default();
    assert!(config.validate().is_ok());
    assert!(config.combine);
    assert!(config.intermediate_dir.is_none());
}

#[test]
fn test_partial_config_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{ "num_mappers": 3, "combine": false }"#).unwrap();

    let config = Config::load(&path).unwrap();

    assert_eq!(config.num_mappers, 3);
    assert!(!config.combine);
    assert_eq!(config.num_reducers, Config::default().num_reducers);
}

#[test]
fn test_invalid_values_are_rejected() {
    let config = Config {
        num_partitions: 0,
        ..Config::default()
    };
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

    let config = Config {
        mapper_failure_probability: 101,
        ..Config::default()
    };
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

    let config = Config {
        max_task_attempts: 0,
        ..Config::default()
    };
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
}

#[test]
fn test_unreadable_and_unparseable_files() {
    let dir = tempfile::tempdir().unwrap();

    let missing = dir.path().join("missing.json");
    assert!(matches!(Config::load(&missing), Err(ConfigError::Io { .. })));

    let broken = dir.path().join("broken.json");
    fs::write(&broken, "{ not json").unwrap();
    assert!(matches!(Config::load(&broken), Err(ConfigError::Parse { .. })));
}
