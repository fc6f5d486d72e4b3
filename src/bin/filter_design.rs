// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-temporal-filter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

// Inspect the temporal filter described by a configuration file
use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use rust_temporal_filter::config::{self, Config};
use rust_temporal_filter::preprocessing::passband::{fsl_passband, Cutoff};
use std::path::PathBuf;

/// Print the design of a zero-phase temporal filter
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (YAML format)
    ///
    /// Default settings are used when omitted.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Filter family (butterworth, chebyshev1, chebyshev2, elliptic)
    #[arg(long)]
    family: Option<String>,

    /// Filter order
    #[arg(long)]
    order: Option<usize>,

    /// High-pass edge in Hz
    #[arg(long)]
    low_cutoff: Option<f64>,

    /// Low-pass edge in Hz, or "nyquist"
    #[arg(long, value_parser = parse_cutoff)]
    high_cutoff: Option<Cutoff>,

    /// Interval between volumes in seconds
    #[arg(long, conflicts_with = "sampling_rate")]
    repetition_time: Option<f64>,

    /// Sampling rate in Hz
    #[arg(long)]
    sampling_rate: Option<f64>,

    /// Number of frequencies at which the magnitude response is printed
    #[arg(long, default_value_t = 11)]
    points: usize,

    /// Output the configuration schema as JSON and exit
    #[arg(long)]
    show_config_schema: bool,

    /// Enable verbose logging (debug level)
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// Disable all logging output
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,
}

fn parse_cutoff(value: &str) -> Result<Cutoff, String> {
    if value.eq_ignore_ascii_case("nyquist") {
        return Ok(Cutoff::Nyquist);
    }
    value
        .parse::<f64>()
        .map(Cutoff::Hz)
        .map_err(|e| format!("expected a frequency in Hz or 'nyquist': {}", e))
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.quiet {
        log::LevelFilter::Off
    } else if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if args.show_config_schema {
        return config::output_config_schema();
    }

    let mut config = match &args.config {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            Config::from_file(path)?
        }
        None => Config::default(),
    };

    config.apply_args(
        args.family,
        args.order,
        args.low_cutoff,
        args.high_cutoff,
        args.repetition_time,
        args.sampling_rate,
    );
    config::validate_specific_rules(&config).context("Invalid filter settings")?;

    let filter = config.to_temporal_filter()?;
    let rate = filter.sampling_rate();
    let band = filter.band();
    let coefficients = filter.coefficients();

    println!(
        "Filter: {} of order {} (effective order {})",
        filter.spec().family,
        filter.spec().order,
        filter.spec().effective_order()
    );
    println!(
        "Sampling rate: {} Hz (repetition time {} s, Nyquist {} Hz)",
        rate.as_hz(),
        rate.repetition_time(),
        rate.nyquist()
    );
    println!(
        "Passband: {} Hz to {} Hz -> {} {:?} (fraction of Nyquist)",
        filter.passband().low,
        filter.passband().high,
        band.classification(),
        band.critical_frequencies()
    );
    println!("Minimum series length: {} samples", filter.min_samples());

    println!("Second-order sections [b0 b1 b2 | a0 a1 a2]:");
    for section in coefficients.sections() {
        println!(
            "  [{:+.6e} {:+.6e} {:+.6e} | {:+.6e} {:+.6e} {:+.6e}]",
            section.b[0], section.b[1], section.b[2], section.a[0], section.a[1], section.a[2]
        );
    }

    if args.points > 1 {
        println!("Zero-phase magnitude response:");
        for i in 0..args.points {
            let w = i as f64 / (args.points - 1) as f64;
            let gain = coefficients.magnitude(w).powi(2);
            println!(
                "  {:>10.5} Hz  {:>12.6}  ({:>8.2} dB)",
                w * rate.nyquist(),
                gain,
                20.0 * gain.max(f64::MIN_POSITIVE).log10()
            );
        }
    }

    let fsl = fsl_passband(filter.passband(), rate);
    println!(
        "FSL -bptf sigmas (volumes): high-pass {} low-pass {}",
        fsl.highpass_sigma, fsl.lowpass_sigma
    );

    Ok(())
}
