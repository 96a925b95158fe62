//! Command-line parsing for the housing price forecast tool.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! lookup code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::DEFAULT_LABEL_COLUMN;
use crate::domain::HousingCategory;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "hf",
    version,
    about = "Housing price forecasts for Finnish postal codes (next four quarters)"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Predict the price per square meter for a postal code and housing type.
    Predict(PredictArgs),
    /// Load every configured forecast file and report what was found.
    Check(DataArgs),
}

/// Where the forecast data lives.
#[derive(Debug, Args, Clone)]
pub struct DataArgs {
    /// Forecast data directory (default: $HF_DATA_DIR, then `json_prediction`).
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// JSON file mapping each housing type to its forecast files.
    #[arg(long, value_name = "JSON")]
    pub layout: Option<PathBuf>,

    /// Membership CSV column holding the cluster label.
    #[arg(long, default_value = DEFAULT_LABEL_COLUMN)]
    pub label_column: String,
}

/// Options for `hf predict`.
#[derive(Debug, Args, Clone)]
pub struct PredictArgs {
    /// Finnish postal code, e.g. 00100.
    pub postal_code: String,

    /// Housing type.
    #[arg(short = 't', long = "type", value_enum, default_value_t = HousingCategory::OneRoom)]
    pub category: HousingCategory,

    #[command(flatten)]
    pub data: DataArgs,

    /// GeoNames postal code file (default: $HF_GEONAMES_FILE, then <data-dir>/FI.txt).
    #[arg(long, value_name = "FILE")]
    pub geo: Option<PathBuf>,

    /// Disable the terminal chart.
    #[arg(long)]
    pub no_plot: bool,

    /// Chart width (columns).
    #[arg(long, default_value_t = 60)]
    pub width: usize,

    /// Chart height (rows).
    #[arg(long, default_value_t = 15)]
    pub height: usize,

    /// Export the forecast series to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Export the full resolution to JSON.
    #[arg(long, value_name = "JSON")]
    pub json: Option<PathBuf>,
}
