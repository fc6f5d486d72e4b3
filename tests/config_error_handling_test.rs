// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-temporal-filter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

use anyhow::Result;
use rust_temporal_filter::config::Config;
use std::fs;
use std::path::Path;
use std::sync::Once;
use tempfile::tempdir;

static INIT: Once = Once::new();

// Setup logger for tests
fn setup() {
    INIT.call_once(|| {
        env_logger::builder()
            .filter_level(log::LevelFilter::Debug)
            .is_test(true)
            .init();
    });
}

#[test]
fn test_config_deserialization_error_creates_sample_file() -> Result<()> {
    setup();
    let temp_dir = tempdir()?;
    let config_path = temp_dir.path().join("config.yaml");

    // Valid YAML with the wrong types
    let invalid_yaml = r#"
filter:
  family: 12
  order: "two"
  high_cutoff: [0.1]
"#;
    fs::write(&config_path, invalid_yaml)?;

    let result = Config::from_file(&config_path);
    assert!(result.is_err(), "Config loading should have failed");

    let sample_path = config_path.with_extension("sample.yaml");
    assert!(Path::new(&sample_path).exists(), "Sample config file was not created");

    // The sample file is a valid default configuration
    let sample_config = Config::from_file(&sample_path)?;
    assert_eq!(sample_config, Config::default());

    Ok(())
}

#[test]
fn test_config_rule_error_creates_sample_file() -> Result<()> {
    setup();
    let temp_dir = tempdir()?;
    let config_path = temp_dir.path().join("config.yaml");

    // Passes the schema but sets both sampling sources
    let invalid_config = r#"
filter:
  family: butterworth
  repetition_time: 2.0
  sampling_rate: 0.5
"#;
    fs::write(&config_path, invalid_config)?;

    let error = Config::from_file(&config_path).unwrap_err();
    assert!(format!("{:#}", error).contains("repetition_time"));
    assert!(config_path.with_extension("sample.yaml").exists());

    Ok(())
}

#[test]
fn test_invalid_yaml_syntax() -> Result<()> {
    setup();
    let temp_dir = tempdir()?;
    let config_path = temp_dir.path().join("config.yaml");

    fs::write(&config_path, "filter: [unclosed")?;

    assert!(Config::from_file(&config_path).is_err());
    Ok(())
}
