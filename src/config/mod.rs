// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-temporal-filter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Configuration management for temporal filtering runs
//!
//! This module provides functionality for loading, validating, and applying
//! configuration settings. The configuration is backed by a YAML file and
//! validated against a JSON schema for robustness.
//!
//! ## Configuration Structure
//!
//! - `filter`: filter family, order, cutoffs, ripples, sampling and the
//!   placeholder strategy for missing samples
//!
//! ## Usage
//!
//! ```no_run
//! use rust_temporal_filter::config::Config;
//! use std::path::Path;
//!
//! // Load config from file, creates a default if not found
//! let config = Config::from_file(Path::new("config.yaml")).unwrap();
//!
//! let filter = config.to_temporal_filter().unwrap();
//! println!("{} sections", filter.coefficients().sections().len());
//! ```

pub mod filter;
pub mod utils;

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, error};
use serde::{Deserialize, Serialize};

use crate::preprocessing::passband::Cutoff;
use crate::preprocessing::temporal::TemporalFilter;

pub use filter::TemporalFilterConfig;
pub use utils::{output_config_schema, validate_specific_rules};

/// Root configuration structure.
///
/// The configuration is deserialized from and serialized to YAML using serde.
/// It is validated against a JSON schema to ensure all fields have valid
/// types and values, then against [`validate_specific_rules`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Temporal filter settings.
    ///
    /// If not specified in the configuration file, default values are used.
    #[serde(default)]
    pub filter: TemporalFilterConfig,
}

impl Config {
    /// Helper method to create a sample config file when validation fails
    fn create_sample_config<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        let sample_path = path.with_extension("sample.yaml");
        debug!("Original path: {:?}, Sample path: {:?}", path, sample_path);

        if let Some(parent) = sample_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                debug!("Creating parent directory: {:?}", parent);
                fs::create_dir_all(parent).with_context(|| {
                    format!(
                        "Failed to create parent directory for sample config at {:?}",
                        parent
                    )
                })?;
            }
        }

        Self::default()
            .save_to_file(&sample_path)
            .with_context(|| format!("Failed to save sample config to {:?}", sample_path))?;

        error!(
            "Sample configuration file created at {:?}\nPlease edit and rename it",
            sample_path
        );
        Ok(())
    }

    /// Parse and validate a configuration from YAML text
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        // First step: convert YAML to a generic Value
        let yaml_value: serde_yml::Value =
            serde_yml::from_str(contents).context("Failed to parse YAML configuration")?;

        // Convert to JSON Value for validation
        let json_value = serde_json::to_value(&yaml_value)
            .context("Failed to convert YAML to JSON for validation")?;

        let schema: serde_json::Value =
            serde_json::from_str(utils::CONFIG_SCHEMA).context("Failed to parse JSON schema")?;

        let validator = jsonschema::draft202012::options()
            .should_validate_formats(true)
            .build(&schema)?;

        if let Err(error) = validator.validate(&json_value) {
            anyhow::bail!("Configuration validation failed: {}", error);
        }

        // Now that YAML has been validated, deserialize to Config
        debug!("Schema validation passed, deserializing into Config structure");
        let config: Config = serde_json::from_value(json_value)
            .context("Failed to deserialize configuration")?;

        utils::validate_specific_rules(&config)?;

        Ok(config)
    }

    /// Load configuration from a file
    ///
    /// A missing file is created with the default configuration. When the
    /// file is invalid, a `.sample.yaml` file with default values is written
    /// next to it and the validation error is returned.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(
                "Configuration file not found at {:?}, creating default",
                path
            );
            let default_config = Self::default();
            default_config.save_to_file(path)?;
            return Ok(default_config);
        }

        debug!("Loading configuration from {:?}", path);
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file at {:?}", path))?;

        match Self::from_yaml_str(&contents) {
            Ok(config) => Ok(config),
            Err(err) => {
                error!("Configuration error in {}: {:#}", path.display(), err);
                Self::create_sample_config(path)?;
                Err(err.context(format!("Invalid configuration file {}", path.display())))
            }
        }
    }

    /// Save the configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml =
            serde_yml::to_string(self).context("Failed to serialize configuration to YAML")?;

        let mut file = File::create(path.as_ref())
            .with_context(|| format!("Failed to create config file at {:?}", path.as_ref()))?;

        file.write_all(yaml.as_bytes())
            .with_context(|| format!("Failed to write configuration to {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Apply command line arguments to override configuration values.
    ///
    /// Only values that are explicitly provided override the existing
    /// configuration. Setting a repetition time clears the sampling rate and
    /// the other way round.
    pub fn apply_args(
        &mut self,
        family: Option<String>,
        order: Option<usize>,
        low_cutoff: Option<f64>,
        high_cutoff: Option<Cutoff>,
        repetition_time: Option<f64>,
        sampling_rate: Option<f64>,
    ) {
        if let Some(family) = family {
            debug!("Overriding filter family from command line: {}", family);
            self.filter.family = family;
        }
        if let Some(order) = order {
            debug!("Overriding filter order from command line: {}", order);
            self.filter.order = order;
        }
        if let Some(low) = low_cutoff {
            debug!("Overriding low cutoff from command line: {}", low);
            self.filter.low_cutoff = low;
        }
        if let Some(high) = high_cutoff {
            debug!("Overriding high cutoff from command line: {}", high);
            self.filter.high_cutoff = high;
        }
        if let Some(tr) = repetition_time {
            debug!("Overriding repetition time from command line: {}", tr);
            self.filter.repetition_time = Some(tr);
            self.filter.sampling_rate = None;
        }
        if let Some(rate) = sampling_rate {
            debug!("Overriding sampling rate from command line: {}", rate);
            self.filter.sampling_rate = Some(rate);
            self.filter.repetition_time = None;
        }
    }

    /// Design the temporal filter described by this configuration
    pub fn to_temporal_filter(&self) -> Result<TemporalFilter> {
        self.filter
            .to_temporal_filter()
            .context("Failed to build the temporal filter from configuration")
    }
}
