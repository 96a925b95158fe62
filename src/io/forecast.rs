//! Forecast artifact JSON ingest.
//!
//! An artifact is a JSON object of column mappings as written by the training
//! pipeline:
//!
//! ```json
//! {
//!   "pred_0": { "00100": 5123.4, ... },
//!   "pred_1": { ... }, "pred_2": { ... }, "pred_3": { ... },
//!   "latitude": { "00100": 60.17, ... },
//!   "longitude": { "00100": 24.93, ... }
//! }
//! ```
//!
//! `latitude`/`longitude` are required for direct artifacts and ignored for
//! clustered ones. Values may be numbers or numeric strings.
//!
//! Validation is strict: a key missing from any `pred_i`, or a price that is
//! negative or non-finite, makes the whole artifact unusable.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::domain::{Coordinate, FORECAST_LEN, ForecastSeries, PostalCode, Tier};
use crate::error::ResolveError;
use crate::store::ForecastArtifact;

#[derive(Debug, Deserialize)]
struct RawArtifact {
    pred_0: Map<String, Value>,
    pred_1: Map<String, Value>,
    pred_2: Map<String, Value>,
    pred_3: Map<String, Value>,
    #[serde(default)]
    latitude: Option<Map<String, Value>>,
    #[serde(default)]
    longitude: Option<Map<String, Value>>,
}

/// Read and validate a forecast artifact.
pub fn read_forecast_artifact(path: &Path, tier: Tier) -> Result<ForecastArtifact, ResolveError> {
    let file = File::open(path).map_err(|e| ResolveError::artifact(path, format!("failed to open: {e}")))?;
    let raw: RawArtifact = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| ResolveError::artifact(path, format!("invalid forecast JSON: {e}")))?;

    build_artifact(path, tier, raw).map_err(|reason| ResolveError::artifact(path, reason))
}

fn build_artifact(path: &Path, tier: Tier, raw: RawArtifact) -> Result<ForecastArtifact, String> {
    let columns: [&Map<String, Value>; FORECAST_LEN] = [&raw.pred_0, &raw.pred_1, &raw.pred_2, &raw.pred_3];

    let mut series = HashMap::with_capacity(raw.pred_0.len());
    for key in raw.pred_0.keys() {
        let mut prices = [0.0; FORECAST_LEN];
        for (i, column) in columns.iter().enumerate() {
            let value = column
                .get(key)
                .ok_or_else(|| format!("key '{key}' is missing from pred_{i}"))?;
            prices[i] = parse_number(value).ok_or_else(|| format!("key '{key}' has a non-numeric pred_{i}"))?;
        }
        let s = ForecastSeries::from_prices(prices).map_err(|e| format!("key '{key}': {e}"))?;
        series.insert(key.clone(), s);
    }

    for (i, column) in columns.iter().enumerate().skip(1) {
        if let Some(extra) = column.keys().find(|k| !raw.pred_0.contains_key(*k)) {
            return Err(format!("key '{extra}' appears in pred_{i} but not in pred_0"));
        }
    }

    let coordinates = match tier {
        Tier::Direct => {
            let latitude = raw.latitude.as_ref().ok_or("direct artifact has no `latitude` mapping")?;
            let longitude = raw.longitude.as_ref().ok_or("direct artifact has no `longitude` mapping")?;
            collect_coordinates(path, latitude, longitude, &series)
        }
        Tier::Clustered => Vec::new(),
    };

    debug!(
        path = %path.display(),
        ?tier,
        keys = series.len(),
        coordinates = coordinates.len(),
        "loaded forecast artifact"
    );

    Ok(ForecastArtifact::new(path, tier, series, coordinates))
}

fn collect_coordinates(
    path: &Path,
    latitude: &Map<String, Value>,
    longitude: &Map<String, Value>,
    series: &HashMap<String, ForecastSeries>,
) -> Vec<(PostalCode, Coordinate)> {
    let mut out = Vec::with_capacity(latitude.len());
    let mut skipped = 0usize;

    for (code, lat) in latitude {
        let coord = longitude
            .get(code)
            .and_then(|lon| Coordinate::new(parse_number(lat)?, parse_number(lon)?));
        match coord {
            Some(coord) if series.contains_key(code) => out.push((PostalCode::new(code.clone()), coord)),
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        warn!(
            path = %path.display(),
            skipped,
            "skipped coordinate entries without a usable location or forecast"
        );
    }
    out
}

fn parse_number(value: &Value) -> Option<f64> {
    let v = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if v.is_finite() { Some(v) } else { None }
}
