//! Export a resolved forecast to CSV or JSON.
//!
//! The CSV is meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::Resolution;
use crate::error::AppError;

/// Write the series as `date,quarter,price` rows.
pub fn write_series_csv(path: &Path, resolution: &Resolution) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_series_csv_to(&mut file, resolution)
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV '{}': {e}", path.display())))
}

fn write_series_csv_to(out: &mut impl Write, resolution: &Resolution) -> std::io::Result<()> {
    writeln!(out, "date,quarter,price,postal_code,model_postal_code,tier")?;

    let model_code = resolution.substituted.as_ref().unwrap_or(&resolution.postal_code);
    for p in resolution.series.iter() {
        let date = p.quarter.start_date().map(|d| d.to_string()).unwrap_or_default();
        writeln!(
            out,
            "{date},{},{:.4},{},{},{}",
            p.quarter, p.price, resolution.postal_code, model_code, resolution.tier,
        )?;
    }
    Ok(())
}

/// Write the full resolution as pretty JSON.
pub fn write_resolution_json(path: &Path, resolution: &Resolution) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, resolution)
        .map_err(|e| AppError::new(2, format!("Failed to write export JSON: {e}")))?;
    Ok(())
}
