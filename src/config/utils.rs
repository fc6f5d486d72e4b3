// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-temporal-filter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Configuration utilities
//!
//! This module provides utility functions for working with configuration
//! settings, including validation and schema management.

use anyhow::{Context, Result};
use log::debug;

use super::Config;
use crate::preprocessing::passband;

/// JSON schema the configuration file is validated against
pub(crate) const CONFIG_SCHEMA: &str = include_str!("../../resources/config.schema.json");

/// Output the embedded JSON schema to the console.
///
/// This function is called when the `--show-config-schema` flag is provided
/// on the command line. It outputs the full JSON schema for the configuration
/// to stdout, formatted for readability.
///
/// # Example
///
/// ```bash
/// ./filter_design --show-config-schema > config_schema.json
/// ```
pub fn output_config_schema() -> Result<()> {
    let schema: serde_json::Value =
        serde_json::from_str(CONFIG_SCHEMA).context("Failed to parse JSON schema")?;

    let formatted_schema =
        serde_json::to_string_pretty(&schema).context("Failed to format JSON schema")?;

    println!("{}", formatted_schema);

    Ok(())
}

/// Validates the configuration against additional rules that aren't covered by the JSON schema.
///
/// Checks that exactly one of `sampling_rate` and `repetition_time` is set,
/// that the filter family comes with the ripples it requires and that the
/// cutoffs are ordered.
///
/// # Returns
///
/// * `Ok(())` if all validations pass
/// * `Err(anyhow::Error)` with descriptive message if any validation fails
pub fn validate_specific_rules(config: &Config) -> Result<()> {
    let filter = &config.filter;

    filter
        .sampling_rate()
        .context("Invalid sampling settings in the filter section")?;

    let spec = filter
        .spec()
        .with_context(|| format!("Invalid filter family '{}'", filter.family))?;
    debug!("Configured filter: {} of order {}", spec.family, spec.order);

    passband::validate(spec.family.name(), &filter.passband())
        .context("Invalid passband in the filter section")?;

    Ok(())
}
