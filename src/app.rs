//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - resolves where the forecast data lives
//! - runs the tiered lookup
//! - prints results/plots
//! - writes optional exports

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, DataArgs, PredictArgs};
use crate::config::{ArtifactLayout, StoreConfig, resolve_data_dir, resolve_geonames_file};
use crate::error::{AppError, ResolveError};
use crate::geo::GeoNamesTable;
use crate::resolve::ForecastResolver;
use crate::store::ForecastStore;

/// Entry point for the `hf` binary.
pub fn run() -> Result<(), AppError> {
    init_logging();
    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Predict(args) => handle_predict(args),
        Command::Check(args) => handle_check(args),
    }
}

/// Logs go to stderr so stdout stays clean for results. `RUST_LOG` overrides
/// the default `warn` level.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    // A second init (e.g. tests calling `run`) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_predict(args: PredictArgs) -> Result<(), AppError> {
    let config = store_config_from_args(&args.data)?;
    let geo_path = resolve_geonames_file(args.geo.as_deref(), &config.data_dir);
    let geo = GeoNamesTable::from_file(&geo_path)?;

    let store = ForecastStore::new(config);
    let resolver = ForecastResolver::new(&store, &geo);
    let resolution = resolver
        .resolve(args.postal_code.trim(), args.category)
        .map_err(report_resolve_error)?;

    let place_name = geo.place_name(&resolution.postal_code);
    println!("{}", crate::report::format_resolution(&resolution, place_name));

    if !args.no_plot {
        let plot = crate::plot::render_series_plot(&resolution.series, args.width, args.height);
        println!("{plot}");
    }

    // Optional exports.
    if let Some(path) = &args.export {
        crate::io::export::write_series_csv(path, &resolution)?;
    }
    if let Some(path) = &args.json {
        crate::io::export::write_resolution_json(path, &resolution)?;
    }

    Ok(())
}

fn handle_check(args: DataArgs) -> Result<(), AppError> {
    let config = store_config_from_args(&args)?;
    let store = ForecastStore::new(config);

    let summaries = store.preload_all().map_err(report_resolve_error)?;
    println!(
        "{}",
        crate::report::format_check_summary(&summaries, &store.config().data_dir)
    );
    Ok(())
}

pub fn store_config_from_args(args: &DataArgs) -> Result<StoreConfig, AppError> {
    let layout = match &args.layout {
        Some(path) => ArtifactLayout::from_json_file(path)?,
        None => ArtifactLayout::default(),
    };
    Ok(StoreConfig {
        data_dir: resolve_data_dir(args.data_dir.as_deref()),
        layout,
        label_column: args.label_column.clone(),
    })
}

/// Missing files are an operator problem: the user sees a generic message,
/// the log gets the path.
fn report_resolve_error(err: ResolveError) -> AppError {
    if let ResolveError::ArtifactNotFound { path, reason } = &err {
        error!(path = %path.display(), %reason, "forecast artifact unavailable");
    }
    err.into()
}
